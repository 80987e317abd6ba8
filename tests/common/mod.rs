#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use voltrader::domain::error::VoltraderError;
use voltrader::domain::ohlc::Bar;
use voltrader::domain::params::StrategyParams;
use voltrader::ports::data_port::DataPort;

pub struct MockDataPort {
    pub bars: Vec<Bar>,
    pub error: Option<String>,
}

impl MockDataPort {
    pub fn new(bars: Vec<Bar>) -> Self {
        Self { bars, error: None }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            bars: Vec::new(),
            error: Some(reason.to_string()),
        }
    }
}

impl DataPort for MockDataPort {
    fn load_bars(&self) -> Result<Vec<Bar>, VoltraderError> {
        if let Some(reason) = &self.error {
            return Err(VoltraderError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self.bars.clone())
    }
}

pub fn hour(i: usize) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        + chrono::Duration::hours(i as i64)
}

pub fn make_bar(i: usize, close: f64) -> Bar {
    Bar {
        time: hour(i),
        open: close,
        high: close * 1.005,
        low: close * 0.995,
        close,
    }
}

pub fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| make_bar(i, c))
        .collect()
}

/// Geometric uptrend: `base * rate^i`.
pub fn trending_bars(n: usize, base: f64, rate: f64) -> Vec<Bar> {
    bars_from_closes(&(0..n).map(|i| base * rate.powi(i as i32)).collect::<Vec<_>>())
}

pub fn flat_bars(n: usize, close: f64) -> Vec<Bar> {
    bars_from_closes(&vec![close; n])
}

/// Uptrend with a single crash bar at `crash_at` dropping by `crash_frac`.
pub fn crash_bars(n: usize, crash_at: usize, crash_frac: f64) -> Vec<Bar> {
    let mut closes: Vec<f64> = (0..n).map(|i| 100.0 * 1.002_f64.powi(i as i32)).collect();
    closes[crash_at] = closes[crash_at - 1] * (1.0 - crash_frac);
    for i in crash_at + 1..n {
        closes[i] = closes[i - 1] * 0.999;
    }
    bars_from_closes(&closes)
}

pub fn default_params() -> StrategyParams {
    StrategyParams::default()
}
