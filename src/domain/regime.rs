//! Regime classification (pipeline stage 3).
//!
//! Close above a long-horizon EWMA of close means "bull" and the normal
//! leverage ceiling; otherwise "bear" and the reduced ceiling. The flag
//! carries no hysteresis and may flip every bar; only the ceiling is
//! consumed downstream.

use crate::domain::ewm::ewm_mean;
use crate::domain::params::StrategyParams;

/// Per-bar leverage ceiling from the bull/bear classification.
pub fn leverage_caps(closes: &[f64], params: &StrategyParams) -> Vec<f64> {
    let ma = ewm_mean(closes, params.regime_span);
    closes
        .iter()
        .zip(&ma)
        .map(|(&close, &avg)| {
            if close > avg {
                params.max_leverage
            } else {
                params.bear_leverage
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> StrategyParams {
        StrategyParams {
            max_leverage: 4.0,
            bear_leverage: 2.0,
            regime_span: 8,
            ..StrategyParams::default()
        }
    }

    #[test]
    fn uptrend_is_bull() {
        let closes: Vec<f64> = (0..100).map(|i| 100.0 + i as f64).collect();
        let caps = leverage_caps(&closes, &params());
        assert_eq!(*caps.last().unwrap(), 4.0);
    }

    #[test]
    fn downtrend_is_bear() {
        let closes: Vec<f64> = (0..100).map(|i| 200.0 - i as f64).collect();
        let caps = leverage_caps(&closes, &params());
        assert_eq!(*caps.last().unwrap(), 2.0);
    }

    #[test]
    fn first_bar_is_bear() {
        // close equals its own seed average, never strictly above it.
        let caps = leverage_caps(&[100.0, 100.0], &params());
        assert_eq!(caps[0], 2.0);
    }

    #[test]
    fn flag_can_flip_every_bar() {
        // Alternating closes around a flat average: no smoothing on the flag.
        let closes: Vec<f64> = (0..40)
            .map(|i| if i % 2 == 0 { 90.0 } else { 110.0 })
            .collect();
        let caps = leverage_caps(&closes, &params());
        let flips = caps.windows(2).filter(|w| w[0] != w[1]).count();
        assert!(flips > 10);
    }
}
