/// First-order Butterworth high-pass design
///
/// Digital coefficients come from the analog prototype `s / (s + ωc)` via the
/// bilinear transform with frequency pre-warping. Cutoffs are normalised to
/// Nyquist (1.0 = half the sample rate).
use serde::{Deserialize, Serialize};

pub const MAX_NORMALIZED_CUTOFF: f64 = 0.99;
pub const MIN_NORMALIZED_CUTOFF: f64 = 0.01;

/// Transfer function `B(z)/A(z)` with `a[0] == 1`
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilterCoefficients {
    pub b: [f64; 2],
    pub a: [f64; 2],
}

impl FilterCoefficients {
    /// High-pass for a normalised cutoff already inside (0, 1)
    pub fn highpass_first_order(normalized_cutoff: f64) -> Self {
        let k = (std::f64::consts::PI * normalized_cutoff / 2.0).tan();
        let gain = 1.0 / (1.0 + k);
        FilterCoefficients {
            b: [gain, -gain],
            a: [1.0, (k - 1.0) / (k + 1.0)],
        }
    }

    /// Magnitude response at a normalised frequency (1.0 = Nyquist)
    pub fn magnitude_at(&self, normalized_freq: f64) -> f64 {
        let omega = std::f64::consts::PI * normalized_freq;
        let (sin, cos) = omega.sin_cos();
        // e^{-jω}
        let num_re = self.b[0] + self.b[1] * cos;
        let num_im = -self.b[1] * sin;
        let den_re = self.a[0] + self.a[1] * cos;
        let den_im = -self.a[1] * sin;
        (num_re.hypot(num_im)) / (den_re.hypot(den_im))
    }
}

/// Force a normalised cutoff into the range the design accepts.
///
/// `>= 1` becomes 0.99, `<= 0` (and NaN) becomes 0.01.
pub fn clamp_normalized_cutoff(normalized_cutoff: f64) -> f64 {
    if normalized_cutoff >= 1.0 {
        MAX_NORMALIZED_CUTOFF
    } else if normalized_cutoff > 0.0 {
        normalized_cutoff
    } else {
        MIN_NORMALIZED_CUTOFF
    }
}

/// `cutoff_hz / (0.5 * sample_rate_hz)`, clamped
pub fn normalized_cutoff(cutoff_hz: f64, sample_rate_hz: f64) -> f64 {
    let nyquist = 0.5 * sample_rate_hz;
    let raw = cutoff_hz / nyquist;
    let clamped = clamp_normalized_cutoff(raw);
    if clamped != raw {
        log::debug!(
            "Normalized cutoff {:.4} out of range (cutoff {} Hz, rate {:.3} Hz), using {}",
            raw,
            cutoff_hz,
            sample_rate_hz,
            clamped
        );
    }
    clamped
}

/// One global rate estimate: `1 / mean(dt[1..])`.
///
/// `dt[0]` is the zero placeholder and is not part of the mean. Returns `None`
/// when there are no real steps.
pub fn mean_sample_rate(deltas: &[f64]) -> Option<f64> {
    if deltas.len() < 2 {
        return None;
    }
    let steps = &deltas[1..];
    let mean_dt = steps.iter().sum::<f64>() / steps.len() as f64;
    Some(1.0 / mean_dt)
}
