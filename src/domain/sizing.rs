//! Position sizing (pipeline stage 4).
//!
//! Vol-targeting: leverage scales inversely with realized volatility so
//! expected portfolio risk stays constant, and the forecast modulates the
//! share of that leverage actually taken. The result is clipped to the
//! regime ceiling, then to the global ceiling.

use crate::domain::params::StrategyParams;

/// Guard for a zero volatility estimate before it is used as a divisor.
pub const MIN_ANNUAL_VOL: f64 = 1e-6;

/// Sizing output: the ideal (pre-breaker, pre-buffer) position plus the
/// diagnostic leverage series kept on the output table.
#[derive(Debug, Clone)]
pub struct SizedPositions {
    /// Vol-target leverage, capped at the global ceiling (diagnostic).
    pub leverage_ratio: Vec<f64>,
    /// Signed ideal exposure per bar.
    pub ideal: Vec<f64>,
}

/// Map forecast to a vol-targeted, regime-capped ideal position.
pub fn size_positions(
    forecast: &[f64],
    annual_vol: &[f64],
    regime_caps: &[f64],
    params: &StrategyParams,
) -> SizedPositions {
    let mut leverage_ratio = Vec::with_capacity(forecast.len());
    let mut ideal = Vec::with_capacity(forecast.len());

    for i in 0..forecast.len() {
        let safe_vol = annual_vol[i].max(MIN_ANNUAL_VOL);
        let raw_leverage = params.target_volatility / safe_vol;
        leverage_ratio.push(raw_leverage.min(params.max_leverage));

        let unclipped = (forecast[i] / params.signal_divisor) * raw_leverage;
        let capped = unclipped
            .clamp(-regime_caps[i], regime_caps[i])
            .clamp(-params.max_leverage, params.max_leverage);
        ideal.push(capped);
    }

    SizedPositions {
        leverage_ratio,
        ideal,
    }
}
