//! Cost-aware backtest accumulator (pipeline stage 7).
//!
//! Applies the lagged position to bar returns, replaces the return on
//! breach bars with an execution-corrected one under the configured stop
//! policy, charges transaction and holding costs, and compounds equity as
//! a product of simple returns.

use crate::domain::ohlc::Bar;
use crate::domain::params::{StopExecution, StrategyParams};

#[derive(Debug, Clone)]
pub struct BacktestColumns {
    pub strategy_return: Vec<f64>,
    pub transaction_cost: Vec<f64>,
    pub holding_cost: Vec<f64>,
    pub net_return: Vec<f64>,
    pub equity: Vec<f64>,
    pub buy_hold_equity: Vec<f64>,
}

/// Return realized on a breach bar under the stop-execution policy.
///
/// The stop price is `open * (1 - threshold)`; the worst-of policy assumes
/// the fill lands at the worse of stop and close, less a slippage haircut.
/// A breach with no previous close falls back to the ordinary return.
fn execution_corrected_return(
    bar: &Bar,
    prev_close: Option<f64>,
    threshold: f64,
    raw_return: f64,
    params: &StrategyParams,
) -> f64 {
    let Some(prev) = prev_close else {
        return raw_return;
    };
    match params.stop_execution {
        StopExecution::CloseConfirm => raw_return,
        StopExecution::StopAtOpen => {
            let stop_price = bar.open * (1.0 - threshold);
            stop_price / prev - 1.0
        }
        StopExecution::WorstOfSlippage => {
            let stop_price = bar.open * (1.0 - threshold);
            let fill = stop_price.min(bar.close) * (1.0 - params.slippage_haircut);
            fill / prev - 1.0
        }
    }
}

/// Run the accumulator over the (already lagged) position series.
pub fn run_accumulator(
    bars: &[Bar],
    returns: &[f64],
    position: &[f64],
    breach: &[bool],
    threshold: &[f64],
    params: &StrategyParams,
) -> BacktestColumns {
    let n = bars.len();
    let mut strategy_return = Vec::with_capacity(n);
    let mut transaction_cost = Vec::with_capacity(n);
    let mut holding_cost = Vec::with_capacity(n);
    let mut net_return = Vec::with_capacity(n);
    let mut equity = Vec::with_capacity(n);
    let mut buy_hold_equity = Vec::with_capacity(n);

    let mut compounded = 1.0_f64;
    let mut bh_compounded = 1.0_f64;
    let mut prev_position = 0.0_f64;

    for i in 0..n {
        let market_return = if breach[i] {
            let prev_close = if i > 0 { Some(bars[i - 1].close) } else { None };
            execution_corrected_return(&bars[i], prev_close, threshold[i], returns[i], params)
        } else {
            returns[i]
        };

        let gross = position[i] * market_return;
        let t_cost = (position[i] - prev_position).abs() * params.fee_rate;
        let h_cost = position[i].abs() * params.funding_rate;
        let net = gross - t_cost - h_cost;

        compounded *= 1.0 + net;
        bh_compounded *= 1.0 + returns[i];

        strategy_return.push(gross);
        transaction_cost.push(t_cost);
        holding_cost.push(h_cost);
        net_return.push(net);
        equity.push(params.initial_capital * compounded);
        buy_hold_equity.push(params.initial_capital * bh_compounded);

        prev_position = position[i];
    }

    BacktestColumns {
        strategy_return,
        transaction_cost,
        holding_cost,
        net_return,
        equity,
        buy_hold_equity,
    }
}
