//! Exponentially-weighted mean and dispersion primitives.
//!
//! Adjusted weighting: the estimate at bar t averages all observations up to
//! t with weights (1-a)^i decaying in recency, a = 2/(span+1). Every output
//! is defined from the first bar onward, except the standard deviation which
//! needs two observations and is NaN at index 0.

/// Exponentially-weighted moving average with span-based decay.
pub fn ewm_mean(values: &[f64], span: usize) -> Vec<f64> {
    let span = span.max(1);
    let alpha = 2.0 / (span as f64 + 1.0);
    let decay = 1.0 - alpha;

    let mut out = Vec::with_capacity(values.len());
    let mut num = 0.0;
    let mut den = 0.0;
    for &x in values {
        num = x + decay * num;
        den = 1.0 + decay * den;
        out.push(num / den);
    }
    out
}

/// Exponentially-weighted standard deviation (bias-corrected).
///
/// Incremental weighted mean/variance with decayed reliability weights:
/// var = S / (V1 - V2/V1) where V1 = sum of weights, V2 = sum of squared
/// weights. The denominator is zero for a single observation, so `out[0]`
/// is NaN; callers decide how to fill it.
pub fn ewm_std(values: &[f64], span: usize) -> Vec<f64> {
    let span = span.max(1);
    let alpha = 2.0 / (span as f64 + 1.0);
    let decay = 1.0 - alpha;

    let mut out = Vec::with_capacity(values.len());
    let mut sum_w = 0.0;
    let mut sum_w2 = 0.0;
    let mut mean = 0.0;
    let mut m2 = 0.0;

    for &x in values {
        sum_w = decay * sum_w + 1.0;
        sum_w2 = decay * decay * sum_w2 + 1.0;
        let delta = x - mean;
        mean += delta / sum_w;
        m2 = decay * m2 + delta * (x - mean);

        let denom = sum_w - sum_w2 / sum_w;
        if denom > 0.0 {
            out.push((m2 / denom).max(0.0).sqrt());
        } else {
            out.push(f64::NAN);
        }
    }
    out
}
