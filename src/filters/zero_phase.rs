/// Forward-backward (zero-phase) IIR filtering of a single signal
///
/// The signal is padded at both ends with an odd (point-symmetric)
/// reflection, run through the filter forwards and then backwards with
/// steady-state initial conditions, and the padding is cut off again. The
/// result has squared magnitude response and no phase shift.
use ndarray::{s, Array1, ArrayView1};

use super::butterworth::FilterCoefficients;

/// Padding used on each side: three times the filter length
pub const DEFAULT_PADLEN: usize = 3 * 2;

/// Initial state that makes a unit step input produce its steady-state output
pub fn steady_state_zi(coeffs: &FilterCoefficients) -> f64 {
    let [b0, b1] = coeffs.b;
    let a1 = coeffs.a[1];
    (b1 - a1 * b0) / (1.0 + a1)
}

/// Direct form II transposed, first order. Returns the output and final state.
pub fn lfilter(coeffs: &FilterCoefficients, signal: ArrayView1<f64>, zi: f64) -> (Array1<f64>, f64) {
    let [b0, b1] = coeffs.b;
    let a1 = coeffs.a[1];
    let mut z = zi;
    let mut out = Array1::<f64>::zeros(signal.len());
    for (y, &x) in out.iter_mut().zip(signal.iter()) {
        *y = b0 * x + z;
        z = b1 * x - a1 * *y;
    }
    (out, z)
}

/// Odd extension: `2*x[0] - x[padlen..=1]` before, `2*x[n-1] - x[n-2..=n-1-padlen]` after
fn odd_extend(signal: ArrayView1<f64>, padlen: usize) -> Array1<f64> {
    let n = signal.len();
    let first = signal[0];
    let last = signal[n - 1];

    let mut ext = Vec::with_capacity(n + 2 * padlen);
    ext.extend((1..=padlen).rev().map(|i| 2.0 * first - signal[i]));
    ext.extend(signal.iter().copied());
    ext.extend((1..=padlen).map(|i| 2.0 * last - signal[n - 1 - i]));
    Array1::from_vec(ext)
}

/// Zero-phase filter one signal. Padding shrinks to `len - 1` for short inputs.
pub fn filtfilt(coeffs: &FilterCoefficients, signal: ArrayView1<f64>) -> Array1<f64> {
    let n = signal.len();
    if n == 0 {
        return Array1::zeros(0);
    }

    let padlen = DEFAULT_PADLEN.min(n - 1);
    let ext = odd_extend(signal, padlen);
    let zi = steady_state_zi(coeffs);

    let (forward, _) = lfilter(coeffs, ext.view(), zi * ext[0]);
    let reversed = forward.slice(s![..;-1]);
    let (backward, _) = lfilter(coeffs, reversed, zi * reversed[0]);

    backward
        .slice(s![..;-1])
        .slice(s![padlen..padlen + n])
        .to_owned()
}
