//! OHLC bar representation and series-level helpers.

use crate::domain::error::VoltraderError;
use chrono::NaiveDateTime;

/// One row of the time-ordered input series. Timestamps are strictly
/// increasing at a fixed nominal cadence (hourly in the reference data set);
/// price sanity (high >= max(open, close) etc.) is enforced upstream.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub time: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Bar {
    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }
}

/// Per-bar simple returns: `close[i] / close[i-1] - 1`, with `ret[0] = 0`.
pub fn simple_returns(bars: &[Bar]) -> Vec<f64> {
    let mut returns = Vec::with_capacity(bars.len());
    for (i, bar) in bars.iter().enumerate() {
        if i == 0 {
            returns.push(0.0);
        } else {
            returns.push(bar.close / bars[i - 1].close - 1.0);
        }
    }
    returns
}

/// Reject malformed input before the pipeline runs: the core assumes a
/// non-empty series with strictly increasing timestamps.
pub fn validate_bars(bars: &[Bar], source: &str) -> Result<(), VoltraderError> {
    if bars.is_empty() {
        return Err(VoltraderError::NoData {
            data_source: source.to_string(),
        });
    }
    for i in 1..bars.len() {
        if bars[i].time <= bars[i - 1].time {
            return Err(VoltraderError::NonMonotonicTimestamp {
                index: i,
                timestamp: bars[i].time.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn hour(i: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(i, 0, 0)
            .unwrap()
    }

    fn sample_bar() -> Bar {
        Bar {
            time: hour(0),
            open: 100.0,
            high: 110.0,
            low: 90.0,
            close: 105.0,
        }
    }

    #[test]
    fn true_range_hl_dominates() {
        let bar = sample_bar();
        // high-low=20, |high-100|=10, |low-100|=10 -> 20
        assert!((bar.true_range(100.0) - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn true_range_gap_up() {
        let bar = sample_bar();
        // high-low=20, |110-70|=40, |90-70|=20 -> 40
        assert!((bar.true_range(70.0) - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn true_range_gap_down() {
        let bar = sample_bar();
        // high-low=20, |110-130|=20, |90-130|=40 -> 40
        assert!((bar.true_range(130.0) - 40.0).abs() < f64::EPSILON);
    }

    fn make_bars(closes: &[f64]) -> Vec<Bar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                time: hour(i as u32),
                open: close,
                high: close,
                low: close,
                close,
            })
            .collect()
    }

    #[test]
    fn simple_returns_first_is_zero() {
        let returns = simple_returns(&make_bars(&[100.0, 110.0, 99.0]));
        assert!((returns[0] - 0.0).abs() < f64::EPSILON);
        assert!((returns[1] - 0.10).abs() < 1e-12);
        assert!((returns[2] - (-0.10)).abs() < 1e-12);
    }

    #[test]
    fn simple_returns_empty() {
        assert!(simple_returns(&[]).is_empty());
    }

    #[test]
    fn validate_accepts_increasing() {
        let bars = make_bars(&[100.0, 101.0, 102.0]);
        assert!(validate_bars(&bars, "test").is_ok());
    }

    #[test]
    fn validate_rejects_empty() {
        let err = validate_bars(&[], "test").unwrap_err();
        assert!(matches!(err, VoltraderError::NoData { .. }));
    }

    #[test]
    fn validate_rejects_duplicate_timestamp() {
        let mut bars = make_bars(&[100.0, 101.0, 102.0]);
        bars[2].time = bars[1].time;
        let err = validate_bars(&bars, "test").unwrap_err();
        assert!(matches!(
            err,
            VoltraderError::NonMonotonicTimestamp { index: 2, .. }
        ));
    }

    #[test]
    fn validate_rejects_backwards_timestamp() {
        let mut bars = make_bars(&[100.0, 101.0, 102.0]);
        bars[1].time = hour(5);
        let err = validate_bars(&bars, "test").unwrap_err();
        assert!(matches!(
            err,
            VoltraderError::NonMonotonicTimestamp { index: 2, .. }
        ));
    }
}
