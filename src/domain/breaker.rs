//! Tail-risk circuit breaker (pipeline stage 5).
//!
//! A short-span EWMA of true range gives a fast-reacting ATR; the crash
//! threshold is `max(atr * multiplier / close, vol_floor * multiplier)`.
//! A bar whose return breaches the threshold has its ideal position forced
//! to zero and is flagged; threshold and flag are retained for the cost
//! correction in the accumulator and for diagnostics.

use crate::domain::ewm::ewm_mean;
use crate::domain::ohlc::Bar;
use crate::domain::params::{MeltdownDirection, StrategyParams};

/// Breaker output: the overridden ideal series plus the retained columns.
#[derive(Debug, Clone)]
pub struct BreakerOutcome {
    /// Crash threshold per bar, as a fractional return.
    pub threshold: Vec<f64>,
    /// True where the bar's return breached the threshold.
    pub breach: Vec<bool>,
    /// Ideal position with breach bars forced to zero.
    pub ideal: Vec<f64>,
}

/// EWMA-smoothed true range. The first bar has no previous close, so its
/// true range is just high - low.
pub fn smoothed_true_range(bars: &[Bar], span: usize) -> Vec<f64> {
    let tr: Vec<f64> = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            if i == 0 {
                bar.high - bar.low
            } else {
                bar.true_range(bars[i - 1].close)
            }
        })
        .collect();
    ewm_mean(&tr, span)
}

/// Apply the breaker to the sized ideal positions.
pub fn apply_breaker(
    bars: &[Bar],
    returns: &[f64],
    ideal: &[f64],
    params: &StrategyParams,
) -> BreakerOutcome {
    let atr = smoothed_true_range(bars, params.atr_span);
    let floor = params.vol_floor * params.atr_multiplier;

    let mut threshold = Vec::with_capacity(bars.len());
    let mut breach = Vec::with_capacity(bars.len());
    let mut out = Vec::with_capacity(bars.len());

    for i in 0..bars.len() {
        let dynamic = atr[i] * params.atr_multiplier / bars[i].close;
        let thr = dynamic.max(floor);
        threshold.push(thr);

        let hit = match params.meltdown_direction {
            MeltdownDirection::Down => returns[i] < -thr,
            MeltdownDirection::Symmetric => returns[i].abs() > thr,
        };
        breach.push(hit);
        out.push(if hit { 0.0 } else { ideal[i] });
    }

    BreakerOutcome {
        threshold,
        breach,
        ideal: out,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ohlc::simple_returns;
    use chrono::{NaiveDate, NaiveDateTime};

    fn hour(i: usize) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + chrono::Duration::hours(i as i64)
    }

    fn flat_bars(n: usize, close: f64) -> Vec<Bar> {
        (0..n)
            .map(|i| Bar {
                time: hour(i),
                open: close,
                high: close * 1.01,
                low: close * 0.99,
                close,
            })
            .collect()
    }

    fn params() -> StrategyParams {
        StrategyParams {
            atr_span: 24,
            atr_multiplier: 3.0,
            vol_floor: 0.004,
            meltdown_direction: MeltdownDirection::Down,
            ..StrategyParams::default()
        }
    }

    #[test]
    fn quiet_market_never_breaches() {
        let bars = flat_bars(100, 100.0);
        let returns = simple_returns(&bars);
        let ideal = vec![1.0; 100];
        let outcome = apply_breaker(&bars, &returns, &ideal, &params());
        assert!(outcome.breach.iter().all(|&b| !b));
        assert_eq!(outcome.ideal, ideal);
    }

    #[test]
    fn crash_bar_breaches_and_zeroes() {
        let mut bars = flat_bars(50, 100.0);
        // 20% intrabar collapse on the last bar against a ~6% threshold.
        let last = bars.len() - 1;
        bars[last].open = 100.0;
        bars[last].low = 78.0;
        bars[last].close = 80.0;
        let returns = simple_returns(&bars);
        let ideal = vec![2.0; bars.len()];

        let outcome = apply_breaker(&bars, &returns, &ideal, &params());
        assert!(outcome.threshold[last] < 0.20);
        assert!(outcome.breach[last]);
        assert_eq!(outcome.ideal[last], 0.0);
        // Earlier bars untouched.
        assert_eq!(outcome.ideal[last - 1], 2.0);
    }

    #[test]
    fn downside_only_ignores_rally() {
        let mut bars = flat_bars(50, 100.0);
        let last = bars.len() - 1;
        bars[last].high = 125.0;
        bars[last].close = 120.0;
        let returns = simple_returns(&bars);
        let ideal = vec![1.0; bars.len()];

        let outcome = apply_breaker(&bars, &returns, &ideal, &params());
        assert!(!outcome.breach[last]);
    }

    #[test]
    fn symmetric_mode_trips_on_rally() {
        let mut bars = flat_bars(50, 100.0);
        let last = bars.len() - 1;
        bars[last].high = 125.0;
        bars[last].close = 120.0;
        let returns = simple_returns(&bars);
        let ideal = vec![1.0; bars.len()];

        let mut p = params();
        p.meltdown_direction = MeltdownDirection::Symmetric;
        let outcome = apply_breaker(&bars, &returns, &ideal, &p);
        assert!(outcome.breach[last]);
        assert_eq!(outcome.ideal[last], 0.0);
    }

    #[test]
    fn floor_binds_when_atr_collapses() {
        // Degenerate bars with zero range: dynamic threshold is 0, the
        // floor keeps the threshold strictly positive.
        let bars: Vec<Bar> = (0..30)
            .map(|i| Bar {
                time: hour(i),
                open: 100.0,
                high: 100.0,
                low: 100.0,
                close: 100.0,
            })
            .collect();
        let returns = simple_returns(&bars);
        let outcome = apply_breaker(&bars, &returns, &vec![0.0; 30], &params());
        for thr in outcome.threshold {
            assert!((thr - 0.004 * 3.0).abs() < 1e-12);
        }
    }

    #[test]
    fn first_bar_uses_high_low_range() {
        let bars = flat_bars(2, 100.0);
        let atr = smoothed_true_range(&bars, 24);
        assert!((atr[0] - (101.0 - 99.0)).abs() < 1e-12);
    }
}
