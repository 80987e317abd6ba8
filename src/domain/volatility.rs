//! Volatility estimation (pipeline stage 1).
//!
//! Two independent estimator instances share the same span: a price-unit
//! dispersion used to normalize the trend forecast, and an annualized
//! return-unit dispersion used by the position sizer.

use crate::domain::ewm::ewm_std;

/// Added to the price dispersion before it is used as a divisor.
pub const VOL_EPSILON: f64 = 1e-8;

/// Exponentially-weighted standard deviation of close prices.
///
/// Zeros are treated as undefined and forward-filled with the last valid
/// value, then the epsilon is added so the series is safe as a divisor. A
/// leading undefined stretch (first bar, or an all-constant prefix) stays
/// NaN; the forecast generator resolves those bars to a zero forecast.
pub fn price_volatility(closes: &[f64], span: usize) -> Vec<f64> {
    let raw = ewm_std(closes, span);
    let mut out = Vec::with_capacity(raw.len());
    let mut last_valid = f64::NAN;
    for v in raw {
        if v.is_finite() && v > 0.0 {
            last_valid = v;
        }
        out.push(last_valid + VOL_EPSILON);
    }
    out
}

/// Annualized exponentially-weighted standard deviation of simple returns.
///
/// Undefined values (the first bar) are filled with 0; a zero estimate is a
/// designed boundary (leverage saturates at the cap downstream), not an
/// error.
pub fn annualized_return_volatility(returns: &[f64], span: usize, bars_per_year: f64) -> Vec<f64> {
    ewm_std(returns, span)
        .into_iter()
        .map(|v| {
            if v.is_finite() {
                v * bars_per_year.sqrt()
            } else {
                0.0
            }
        })
        .collect()
}
