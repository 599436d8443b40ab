/// Drift-removal filtering
///
/// High-pass Butterworth design plus zero-phase application, wrapped into a
/// per-axis filter for whole vector series.
pub mod butterworth;
pub mod zero_phase;

pub use butterworth::{mean_sample_rate, normalized_cutoff, FilterCoefficients};
pub use zero_phase::filtfilt;

use ndarray::Array1;

use crate::error::{TrajResult, TrajectoryError};
use crate::types::{VectorSeries, SPATIAL_DIM};

/// Zero-phase first-order high-pass, designed once per run
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DriftFilter {
    coeffs: FilterCoefficients,
    normalized_cutoff: f64,
}

impl DriftFilter {
    /// Design for a cutoff in Hz at a given sample rate
    pub fn design(cutoff_hz: f64, sample_rate_hz: f64) -> Self {
        let wn = normalized_cutoff(cutoff_hz, sample_rate_hz);
        DriftFilter {
            coeffs: FilterCoefficients::highpass_first_order(wn),
            normalized_cutoff: wn,
        }
    }

    /// Design from the series' time steps using the mean sample rate.
    ///
    /// With fewer than two samples there is no rate; the rate is taken as
    /// infinite, which clamps to the lowest normalised cutoff.
    pub fn from_deltas(cutoff_hz: f64, deltas: &[f64]) -> Self {
        let rate = mean_sample_rate(deltas).unwrap_or(f64::INFINITY);
        Self::design(cutoff_hz, rate)
    }

    pub fn normalized_cutoff(&self) -> f64 {
        self.normalized_cutoff
    }

    pub fn coefficients(&self) -> &FilterCoefficients {
        &self.coeffs
    }

    /// Filter each spatial axis independently. Fewer than two samples give zeros.
    pub fn apply(&self, series: &VectorSeries) -> TrajResult<VectorSeries> {
        if series.len() < 2 {
            return Ok(VectorSeries::zeros(series.len()));
        }

        let coeffs = self.coeffs;
        let filtered: Vec<Array1<f64>> = crossbeam::thread::scope(|scope| {
            let handles: Vec<_> = (0..SPATIAL_DIM)
                .map(|axis| {
                    let signal = series.axis(axis);
                    scope.spawn(move |_| filtfilt(&coeffs, signal.view()))
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join())
                .collect::<Result<Vec<_>, _>>()
        })
        .and_then(|joined| joined)
        .map_err(|_| TrajectoryError::Internal("axis filter worker panicked".to_string()))?;

        let axes: [Array1<f64>; SPATIAL_DIM] = filtered
            .try_into()
            .map_err(|_| TrajectoryError::Internal("expected one signal per axis".to_string()))?;
        VectorSeries::from_axes(axes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Vec3;

    #[test]
    fn test_from_deltas_uses_mean_rate() {
        let deltas = vec![0.0, 0.01, 0.01, 0.01];
        let filter = DriftFilter::from_deltas(0.1, &deltas);
        assert!((filter.normalized_cutoff() - 0.002).abs() < 1e-12);
    }

    #[test]
    fn test_cutoff_above_nyquist_is_clamped() {
        let filter = DriftFilter::design(100.0, 100.0);
        assert_eq!(filter.normalized_cutoff(), 0.99);
        let out = filter
            .apply(&VectorSeries::new(vec![Vec3::new(1.0, 2.0, 3.0); 10]))
            .unwrap();
        assert_eq!(out.len(), 10);
    }

    #[test]
    fn test_short_series_gives_zeros() {
        let filter = DriftFilter::design(0.1, 100.0);
        let out = filter.apply(&VectorSeries::new(vec![Vec3::new(5.0, 5.0, 5.0)])).unwrap();
        assert_eq!(out, VectorSeries::zeros(1));
        assert!(filter.apply(&VectorSeries::default()).unwrap().is_empty());
    }

    #[test]
    fn test_axes_are_independent() {
        let filter = DriftFilter::design(0.5, 100.0);
        let n = 400;
        let series: VectorSeries = (0..n)
            .map(|i| {
                let t = i as f64 / 100.0;
                Vec3::new((2.0 * std::f64::consts::PI * 3.0 * t).sin(), 2.0, t)
            })
            .collect();
        let out = filter.apply(&series).unwrap();

        let x_only = filtfilt(filter.coefficients(), series.axis(0).view());
        let z_only = filtfilt(filter.coefficients(), series.axis(2).view());
        for i in 0..n {
            assert_eq!(out[i].x, x_only[i]);
            assert_eq!(out[i].z, z_only[i]);
            // constant axis is pure DC
            assert!(out[i].y.abs() < 1e-12);
        }
    }

    #[test]
    fn test_apply_is_deterministic() {
        let filter = DriftFilter::design(0.1, 50.0);
        let series: VectorSeries = (0..100)
            .map(|i| Vec3::new(i as f64, (i as f64).sqrt(), -(i as f64)))
            .collect();
        assert_eq!(filter.apply(&series).unwrap(), filter.apply(&series).unwrap());
    }
}
