//! Strategy parameter set.
//!
//! One flat immutable record passed by reference into every pipeline stage.
//! Defaults mirror the reference configuration for hourly BTC data.

/// One horizon pair of the trend family: EWMA(fast) - EWMA(slow), scaled
/// and weighted into the combined forecast.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendRule {
    pub fast_span: usize,
    pub slow_span: usize,
    pub scalar: f64,
    pub weight: f64,
}

/// Forecast variant selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForecastMode {
    TrendOnly,
    TrendMeanReversion,
}

/// Which moves can trip the tail-risk breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeltdownDirection {
    /// Only downside closes breach (default).
    Down,
    /// Any |return| beyond the threshold breaches.
    Symmetric,
}

/// Execution model for the return realized on a breach bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopExecution {
    /// Use the ordinary close-to-close return.
    CloseConfirm,
    /// Assume a fill at the theoretical stop price off the open.
    StopAtOpen,
    /// Exit at the worse of stop price and close, minus a slippage haircut.
    WorstOfSlippage,
}

/// Mean-reversion component parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct MeanReversionParams {
    /// Oscillator lookback (Wilder smoothing of gains/losses).
    pub oscillator_period: usize,
    /// Span of the smoothing applied to the oscillator itself.
    pub smooth_span: usize,
    /// No-signal half-width around the oscillator midpoint (0-50 scale).
    pub dead_zone: f64,
    /// Linear gain beyond the dead zone.
    pub scalar: f64,
    /// Span of the smoothing applied to the component output.
    pub output_smooth_span: usize,
}

impl Default for MeanReversionParams {
    fn default() -> Self {
        MeanReversionParams {
            oscillator_period: 14,
            smooth_span: 3,
            dead_zone: 10.0,
            scalar: 1.0,
            output_smooth_span: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyParams {
    // Forecast
    pub trend_rules: Vec<TrendRule>,
    pub forecast_cap: f64,
    pub weight_trend: f64,
    pub weight_mean_reversion: f64,
    pub forecast_mode: ForecastMode,
    pub mean_reversion: MeanReversionParams,

    // Volatility
    pub vol_span: usize,
    pub bars_per_year: f64,

    // Sizing
    pub target_volatility: f64,
    pub signal_divisor: f64,
    pub max_leverage: f64,
    pub bear_leverage: f64,
    pub regime_span: usize,

    // Tail-risk breaker
    pub atr_span: usize,
    pub atr_multiplier: f64,
    pub vol_floor: f64,
    pub meltdown_direction: MeltdownDirection,

    // Execution
    pub buffer_fraction: f64,
    pub stop_execution: StopExecution,
    pub slippage_haircut: f64,
    pub fee_rate: f64,
    pub funding_rate: f64,
    pub initial_capital: f64,
}

impl Default for StrategyParams {
    fn default() -> Self {
        StrategyParams {
            trend_rules: vec![
                TrendRule { fast_span: 8, slow_span: 32, scalar: 5.6, weight: 0.25 },
                TrendRule { fast_span: 16, slow_span: 64, scalar: 3.8, weight: 0.25 },
                TrendRule { fast_span: 32, slow_span: 128, scalar: 2.6, weight: 0.25 },
                TrendRule { fast_span: 64, slow_span: 256, scalar: 1.9, weight: 0.25 },
            ],
            forecast_cap: 20.0,
            weight_trend: 1.0,
            weight_mean_reversion: 0.0,
            forecast_mode: ForecastMode::TrendOnly,
            mean_reversion: MeanReversionParams::default(),

            vol_span: 36,
            bars_per_year: 365.0 * 24.0,

            target_volatility: 1.0,
            signal_divisor: 20.0,
            max_leverage: 4.0,
            bear_leverage: 2.0,
            regime_span: 2000,

            atr_span: 24,
            atr_multiplier: 6.0,
            vol_floor: 0.004,
            meltdown_direction: MeltdownDirection::Down,

            buffer_fraction: 0.10,
            stop_execution: StopExecution::WorstOfSlippage,
            slippage_haircut: 0.002,
            fee_rate: 0.0005,
            funding_rate: 0.0,
            initial_capital: 10_000.0,
        }
    }
}

impl StrategyParams {
    /// Longest lookback across all stages, useful for warm-up policy in
    /// outer drivers.
    pub fn longest_span(&self) -> usize {
        self.trend_rules
            .iter()
            .map(|r| r.slow_span)
            .chain([self.vol_span, self.regime_span, self.atr_span])
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights_sum_to_one() {
        let params = StrategyParams::default();
        let total: f64 = params.trend_rules.iter().map(|r| r.weight).sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn default_caps_ordered() {
        let params = StrategyParams::default();
        assert!(params.bear_leverage <= params.max_leverage);
    }

    #[test]
    fn longest_span_is_regime() {
        let params = StrategyParams::default();
        assert_eq!(params.longest_span(), 2000);
    }

    #[test]
    fn longest_span_empty_rules() {
        let params = StrategyParams {
            trend_rules: vec![],
            vol_span: 10,
            regime_span: 5,
            atr_span: 3,
            ..StrategyParams::default()
        };
        assert_eq!(params.longest_span(), 10);
    }
}
