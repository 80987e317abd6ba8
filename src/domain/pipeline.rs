//! End-to-end research pipeline.
//!
//! Runs the stages in their fixed order over a validated bar series and
//! assembles the per-bar output table. Stage order is a contract: forecast
//! before sizing, sizing before the breaker, the breaker before the buffer,
//! and the execution lag last before the accumulator.

use crate::domain::backtest::run_accumulator;
use crate::domain::breaker::apply_breaker;
use crate::domain::buffer::{buffer_positions, lag_positions};
use crate::domain::error::VoltraderError;
use crate::domain::forecast::combined_forecast;
use crate::domain::ohlc::{simple_returns, validate_bars, Bar};
use crate::domain::params::StrategyParams;
use crate::domain::regime::leverage_caps;
use crate::domain::sizing::size_positions;
use crate::domain::volatility::{annualized_return_volatility, price_volatility};
use chrono::NaiveDateTime;

/// Full per-bar output of a pipeline run. All columns are index-aligned
/// with the input bar series.
#[derive(Debug, Clone)]
pub struct PipelineTable {
    pub time: Vec<NaiveDateTime>,
    pub close: Vec<f64>,
    pub market_return: Vec<f64>,

    // Signal stages
    pub ann_vol: Vec<f64>,
    pub forecast: Vec<f64>,
    pub leverage_cap: Vec<f64>,
    pub leverage_ratio: Vec<f64>,
    pub raw_target: Vec<f64>,

    // Tail-risk breaker
    pub sl_threshold: Vec<f64>,
    pub sigma_event: Vec<bool>,

    // Execution
    pub buffered_pos: Vec<f64>,
    pub position: Vec<f64>,

    // Accounting
    pub transaction_cost: Vec<f64>,
    pub holding_cost: Vec<f64>,
    pub net_return: Vec<f64>,
    pub equity: Vec<f64>,
    pub buy_hold_equity: Vec<f64>,
}

impl PipelineTable {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}

/// Run the whole pipeline over a bar series.
///
/// `source` only labels errors for empty or malformed input.
pub fn run_pipeline(
    bars: &[Bar],
    params: &StrategyParams,
    source: &str,
) -> Result<PipelineTable, VoltraderError> {
    validate_bars(bars, source)?;

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let returns = simple_returns(bars);

    let price_vol = price_volatility(&closes, params.vol_span);
    let ann_vol = annualized_return_volatility(&returns, params.vol_span, params.bars_per_year);

    let forecast = combined_forecast(&closes, &price_vol, params);
    let caps = leverage_caps(&closes, params);
    let sized = size_positions(&forecast, &ann_vol, &caps, params);

    let breaker = apply_breaker(bars, &returns, &sized.ideal, params);

    let buffered = buffer_positions(&breaker.ideal, params.buffer_fraction);
    let position = lag_positions(&buffered);

    let accounts = run_accumulator(
        bars,
        &returns,
        &position,
        &breaker.breach,
        &breaker.threshold,
        params,
    );

    Ok(PipelineTable {
        time: bars.iter().map(|b| b.time).collect(),
        close: closes,
        market_return: returns,
        ann_vol,
        forecast,
        leverage_cap: caps,
        leverage_ratio: sized.leverage_ratio,
        raw_target: sized.ideal,
        sl_threshold: breaker.threshold,
        sigma_event: breaker.breach,
        buffered_pos: buffered,
        position,
        transaction_cost: accounts.transaction_cost,
        holding_cost: accounts.holding_cost,
        net_return: accounts.net_return,
        equity: accounts.equity,
        buy_hold_equity: accounts.buy_hold_equity,
    })
}
