//! Position buffer and execution lag (pipeline stage 6).
//!
//! The buffer is the one inherently sequential computation in the pipeline:
//! each bar's held position depends on the previous bar's held position, so
//! this must stay an explicit fold over the series. Do not replace it with
//! batch array math — an equivalent scan is required to preserve the
//! stateful contract.

/// Hysteresis fold: move to the ideal position only when the gap from the
/// currently held position exceeds `buffer_fraction`; otherwise hold.
pub fn buffer_positions(ideal: &[f64], buffer_fraction: f64) -> Vec<f64> {
    let mut held = 0.0_f64;
    let mut out = Vec::with_capacity(ideal.len());
    for &target in ideal {
        if (target - held).abs() > buffer_fraction {
            held = target;
        }
        out.push(held);
    }
    out
}

/// One-bar execution lag: a decision made on bar i's close is executable
/// starting bar i+1. `position[0] = 0`.
pub fn lag_positions(buffered: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(buffered.len());
    if buffered.is_empty() {
        return out;
    }
    out.push(0.0);
    out.extend_from_slice(&buffered[..buffered.len() - 1]);
    out
}
