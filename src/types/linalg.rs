//! Linear algebra type aliases for the trajectory pipeline
//!
//! Everything runs in f64; the aliases keep stage signatures short.

use nalgebra::{Matrix3, Quaternion, Vector3};

// ===== Dimensions =====
pub const SPATIAL_DIM: usize = 3;

// ===== Per-sample types =====
pub type Vec3 = Vector3<f64>;
pub type Quat = Quaternion<f64>;

/// Orthonormal body → world rotation
pub type RotationMatrix = Matrix3<f64>;
