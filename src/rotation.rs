/// Quaternion → rotation matrix conversion
///
/// Orientation samples arrive as (w, x, y, z) quaternions that are only
/// approximately unit length. Each one is normalised and expanded into the
/// Hamilton-convention matrix that maps body-frame vectors into the world frame.
use serde::{Deserialize, Serialize};

use crate::error::{TrajResult, TrajectoryError};
use crate::types::{Quat, RotationMatrix, Series};

/// What to do with a sample whose quaternion cannot be normalised
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegeneratePolicy {
    /// Stop and report the offending sample index
    #[default]
    Abort,
    /// Use the identity rotation for that sample and keep going
    SubstituteIdentity,
}

/// Convert one quaternion to a body → world rotation matrix.
///
/// Fails when the norm is zero or not finite. `index` only labels the error.
pub fn quaternion_to_rotation(q: &Quat, index: usize) -> TrajResult<RotationMatrix> {
    let norm = q.norm();
    if !norm.is_finite() || norm == 0.0 {
        return Err(TrajectoryError::DegenerateOrientation { index });
    }

    let w = q.w / norm;
    let x = q.i / norm;
    let y = q.j / norm;
    let z = q.k / norm;

    Ok(RotationMatrix::new(
        1.0 - 2.0 * y * y - 2.0 * z * z,
        2.0 * x * y - 2.0 * z * w,
        2.0 * x * z + 2.0 * y * w,
        2.0 * x * y + 2.0 * z * w,
        1.0 - 2.0 * x * x - 2.0 * z * z,
        2.0 * y * z - 2.0 * x * w,
        2.0 * x * z - 2.0 * y * w,
        2.0 * y * z + 2.0 * x * w,
        1.0 - 2.0 * x * x - 2.0 * y * y,
    ))
}

/// Rotation matrix for every sample of a series, applying `policy` to
/// degenerate orientations.
pub fn rotations_for_series(
    series: &Series,
    policy: DegeneratePolicy,
) -> TrajResult<Vec<RotationMatrix>> {
    series
        .iter()
        .enumerate()
        .map(|(index, sample)| {
            match (quaternion_to_rotation(&sample.orientation, index), policy) {
                (Ok(r), _) => Ok(r),
                (Err(_), DegeneratePolicy::SubstituteIdentity) => {
                    log::warn!(
                        "Degenerate orientation at sample {} (t={:.6}), substituting identity",
                        index,
                        sample.timestamp
                    );
                    Ok(RotationMatrix::identity())
                }
                (Err(e), DegeneratePolicy::Abort) => Err(e),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Sample, Vec3};
    use approx::assert_relative_eq;

    fn assert_orthonormal(r: &RotationMatrix) {
        let should_be_identity = r.transpose() * r;
        assert_relative_eq!(should_be_identity, RotationMatrix::identity(), epsilon = 1e-12);
        assert_relative_eq!(r.determinant(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_identity_quaternion() {
        let r = quaternion_to_rotation(&Quat::new(1.0, 0.0, 0.0, 0.0), 0).unwrap();
        assert_eq!(r, RotationMatrix::identity());
    }

    #[test]
    fn test_orthonormal_for_unit_quaternions() {
        let cases = [
            Quat::new(0.5, 0.5, 0.5, 0.5),
            Quat::new(0.0, 1.0, 0.0, 0.0),
            Quat::new(0.7071067811865476, 0.0, 0.7071067811865476, 0.0),
            Quat::new(0.9238795, 0.0, 0.0, 0.3826834).normalize(),
            Quat::new(0.1, -0.7, 0.3, 0.64).normalize(),
        ];
        for q in &cases {
            assert_orthonormal(&quaternion_to_rotation(q, 0).unwrap());
        }
    }

    #[test]
    fn test_non_unit_input_is_normalised() {
        let unit = quaternion_to_rotation(&Quat::new(0.5, 0.5, 0.5, 0.5), 0).unwrap();
        let scaled = quaternion_to_rotation(&Quat::new(2.0, 2.0, 2.0, 2.0), 0).unwrap();
        assert_relative_eq!(unit, scaled, epsilon = 1e-12);
        assert_orthonormal(&scaled);
    }

    #[test]
    fn test_yaw_90_maps_x_to_y() {
        let half = std::f64::consts::FRAC_1_SQRT_2;
        let r = quaternion_to_rotation(&Quat::new(half, 0.0, 0.0, half), 0).unwrap();
        let rotated = r * Vec3::new(1.0, 0.0, 0.0);
        assert_relative_eq!(rotated, Vec3::new(0.0, 1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_zero_quaternion_is_degenerate() {
        let err = quaternion_to_rotation(&Quat::new(0.0, 0.0, 0.0, 0.0), 7).unwrap_err();
        assert_eq!(err, TrajectoryError::DegenerateOrientation { index: 7 });
    }

    #[test]
    fn test_nan_quaternion_is_degenerate() {
        assert!(quaternion_to_rotation(&Quat::new(f64::NAN, 0.0, 0.0, 0.0), 0).is_err());
        assert!(quaternion_to_rotation(&Quat::new(f64::INFINITY, 0.0, 0.0, 0.0), 0).is_err());
    }

    #[test]
    fn test_policy_abort_and_substitute() {
        let series = Series::new(vec![
            Sample::from_components(0.0, [1.0, 0.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
            Sample::from_components(0.01, [0.0, 0.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        ])
        .unwrap();

        let err = rotations_for_series(&series, DegeneratePolicy::Abort).unwrap_err();
        assert_eq!(err, TrajectoryError::DegenerateOrientation { index: 1 });

        let rotations =
            rotations_for_series(&series, DegeneratePolicy::SubstituteIdentity).unwrap();
        assert_eq!(rotations.len(), 2);
        assert_eq!(rotations[1], RotationMatrix::identity());
    }
}
