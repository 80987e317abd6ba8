//! Forecast generation (pipeline stage 2).
//!
//! Trend: for each horizon pair, EWMA(fast) - EWMA(slow) of close, scaled
//! and divided by the price dispersion, then weight-summed and clipped to
//! the forecast cap. Optionally blended with the mean-reversion component.
//! Bars whose inputs are still undefined (warm-up dispersion) resolve to a
//! zero forecast rather than an error.

use crate::domain::ewm::ewm_mean;
use crate::domain::mean_reversion::mean_reversion_forecast;
use crate::domain::params::{ForecastMode, StrategyParams, TrendRule};

/// Weighted multi-horizon crossover forecast, clipped to `[-cap, cap]`.
pub fn trend_forecast(closes: &[f64], price_vol: &[f64], rules: &[TrendRule], cap: f64) -> Vec<f64> {
    let emas: Vec<(Vec<f64>, Vec<f64>)> = rules
        .iter()
        .map(|r| (ewm_mean(closes, r.fast_span), ewm_mean(closes, r.slow_span)))
        .collect();

    let mut out = Vec::with_capacity(closes.len());
    for i in 0..closes.len() {
        let mut combined = 0.0;
        for (rule, (fast, slow)) in rules.iter().zip(&emas) {
            combined += rule.weight * (fast[i] - slow[i]) * rule.scalar / price_vol[i];
        }
        if combined.is_finite() {
            out.push(combined.clamp(-cap, cap));
        } else {
            out.push(0.0);
        }
    }
    out
}

/// Combined forecast per the configured mode, clipped to the cap.
pub fn combined_forecast(closes: &[f64], price_vol: &[f64], params: &StrategyParams) -> Vec<f64> {
    let trend = trend_forecast(closes, price_vol, &params.trend_rules, params.forecast_cap);

    match params.forecast_mode {
        ForecastMode::TrendOnly => trend,
        ForecastMode::TrendMeanReversion => {
            let mr = mean_reversion_forecast(closes, &params.mean_reversion);
            trend
                .iter()
                .zip(&mr)
                .map(|(&t, &m)| {
                    let blended =
                        params.weight_trend * t + params.weight_mean_reversion * m;
                    if blended.is_finite() {
                        blended.clamp(-params.forecast_cap, params.forecast_cap)
                    } else {
                        0.0
                    }
                })
                .collect()
        }
    }
}
