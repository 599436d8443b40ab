/// Tilt compensation and gravity removal
///
/// Rotates body-frame accelerometer readings into the world frame, then
/// subtracts the static gravity reference and converts g to m/s².
use crate::error::{TrajResult, TrajectoryError};
use crate::types::{RotationMatrix, Vec3, VectorSeries};

pub const STANDARD_GRAVITY: f64 = 9.81; // m/s² per g

/// Gravity as seen by an upright, stationary sensor in g-units
pub fn default_gravity_ref() -> Vec3 {
    Vec3::new(0.0, 0.0, 1.0)
}

/// `a_world[i] = R[i] · a_body[i]`
pub fn tilt_compensate(
    rotations: &[RotationMatrix],
    body_accel: &VectorSeries,
) -> TrajResult<VectorSeries> {
    if rotations.len() != body_accel.len() {
        return Err(TrajectoryError::LengthMismatch {
            expected: body_accel.len(),
            actual: rotations.len(),
        });
    }

    Ok(rotations
        .iter()
        .zip(body_accel.iter())
        .map(|(r, a)| r * a)
        .collect())
}

/// `a_lin = (a_world - gravity_ref) * g_to_ms2`
pub fn remove_gravity(world_accel: &VectorSeries, gravity_ref: &Vec3, g_to_ms2: f64) -> VectorSeries {
    world_accel
        .iter()
        .map(|a| (a - gravity_ref) * g_to_ms2)
        .collect()
}
