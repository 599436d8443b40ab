pub mod linalg;

pub use linalg::*;

use std::ops::Index;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::error::{TrajResult, TrajectoryError};

/// One captured IMU record: orientation plus body-frame acceleration in g
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Seconds
    pub timestamp: f64,
    /// Stored as (w, x, y, z); not required to be exactly unit length
    pub orientation: Quat,
    /// Body frame, g-units
    pub acceleration: Vec3,
}

impl Sample {
    pub fn new(timestamp: f64, orientation: Quat, acceleration: Vec3) -> Self {
        Self {
            timestamp,
            orientation,
            acceleration,
        }
    }

    /// Build from raw record fields: `w, x, y, z, ax, ay, az`
    pub fn from_components(timestamp: f64, q: [f64; 4], a: [f64; 3]) -> Self {
        Self::new(
            timestamp,
            Quat::new(q[0], q[1], q[2], q[3]),
            Vec3::new(a[0], a[1], a[2]),
        )
    }
}

/// A closed recording session. Timestamps are finite and non-decreasing.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Series {
    samples: Vec<Sample>,
}

impl Series {
    pub fn new(samples: Vec<Sample>) -> TrajResult<Self> {
        for (index, sample) in samples.iter().enumerate() {
            if !sample.timestamp.is_finite() {
                return Err(TrajectoryError::NonMonotonicTimestamps { index });
            }
            if index > 0 && sample.timestamp < samples[index - 1].timestamp {
                return Err(TrajectoryError::NonMonotonicTimestamps { index });
            }
        }
        Ok(Self { samples })
    }

    pub fn empty() -> Self {
        Self {
            samples: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.samples.iter()
    }

    pub fn timestamps(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.timestamp).collect()
    }

    /// Body-frame accelerations in g
    pub fn accelerations(&self) -> VectorSeries {
        self.samples.iter().map(|s| s.acceleration).collect()
    }

    /// Seconds between first and last sample (0 for fewer than two samples)
    pub fn duration(&self) -> f64 {
        match (self.samples.first(), self.samples.last()) {
            (Some(first), Some(last)) => last.timestamp - first.timestamp,
            _ => 0.0,
        }
    }

    pub fn into_samples(self) -> Vec<Sample> {
        self.samples
    }
}

impl<'a> IntoIterator for &'a Series {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

/// Ordered sequence of 3-vectors (acceleration, velocity or position)
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VectorSeries(Vec<Vec3>);

impl VectorSeries {
    pub fn new(values: Vec<Vec3>) -> Self {
        Self(values)
    }

    pub fn zeros(len: usize) -> Self {
        Self(vec![Vec3::zeros(); len])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Vec3> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Vec3] {
        &self.0
    }

    pub fn last(&self) -> Option<&Vec3> {
        self.0.last()
    }

    pub fn into_inner(self) -> Vec<Vec3> {
        self.0
    }

    /// Copy one spatial axis out as a signal (0 = x, 1 = y, 2 = z)
    pub fn axis(&self, axis: usize) -> Array1<f64> {
        self.0.iter().map(|v| v[axis]).collect()
    }

    /// Reassemble from per-axis signals of equal length
    pub fn from_axes(axes: [Array1<f64>; SPATIAL_DIM]) -> TrajResult<Self> {
        let len = axes[0].len();
        for axis in &axes[1..] {
            if axis.len() != len {
                return Err(TrajectoryError::LengthMismatch {
                    expected: len,
                    actual: axis.len(),
                });
            }
        }
        Ok((0..len)
            .map(|i| Vec3::new(axes[0][i], axes[1][i], axes[2][i]))
            .collect())
    }

    /// Largest vector norm in the series (0 when empty)
    pub fn max_norm(&self) -> f64 {
        self.0.iter().map(|v| v.norm()).fold(0.0, f64::max)
    }
}

impl Index<usize> for VectorSeries {
    type Output = Vec3;

    fn index(&self, index: usize) -> &Vec3 {
        &self.0[index]
    }
}

impl FromIterator<Vec3> for VectorSeries {
    fn from_iter<I: IntoIterator<Item = Vec3>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a VectorSeries {
    type Item = &'a Vec3;
    type IntoIter = std::slice::Iter<'a, Vec3>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_at(t: f64) -> Sample {
        Sample::from_components(t, [1.0, 0.0, 0.0, 0.0], [0.0, 0.0, 1.0])
    }

    #[test]
    fn test_series_accepts_equal_timestamps() {
        let series = Series::new(vec![sample_at(0.0), sample_at(0.0), sample_at(0.01)]).unwrap();
        assert_eq!(series.len(), 3);
        assert!((series.duration() - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_series_rejects_backwards_time() {
        let err = Series::new(vec![sample_at(0.0), sample_at(0.02), sample_at(0.01)]).unwrap_err();
        assert_eq!(err, TrajectoryError::NonMonotonicTimestamps { index: 2 });
    }

    #[test]
    fn test_series_rejects_nan_time() {
        let err = Series::new(vec![sample_at(f64::NAN)]).unwrap_err();
        assert_eq!(err, TrajectoryError::NonMonotonicTimestamps { index: 0 });
    }

    #[test]
    fn test_axis_split_and_rejoin() {
        let series = VectorSeries::new(vec![Vec3::new(1.0, 2.0, 3.0), Vec3::new(4.0, 5.0, 6.0)]);
        let axes = [series.axis(0), series.axis(1), series.axis(2)];
        assert_eq!(axes[1].to_vec(), vec![2.0, 5.0]);
        assert_eq!(VectorSeries::from_axes(axes).unwrap(), series);
    }

    #[test]
    fn test_from_axes_length_mismatch() {
        let axes = [
            Array1::zeros(3),
            Array1::zeros(2),
            Array1::zeros(3),
        ];
        assert_eq!(
            VectorSeries::from_axes(axes).unwrap_err(),
            TrajectoryError::LengthMismatch {
                expected: 3,
                actual: 2
            }
        );
    }
}
