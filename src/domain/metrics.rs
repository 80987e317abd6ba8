//! Performance metrics and statistics over a pipeline run.

use crate::domain::pipeline::PipelineTable;

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub total_return: f64,
    pub annualized_return: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
    pub max_drawdown_duration: usize,
    pub calmar_ratio: f64,
    pub trade_count: usize,
    pub time_in_market: f64,
    pub breach_count: usize,
    pub final_equity: f64,
    pub buy_hold_return: f64,
}

impl Metrics {
    pub fn compute(table: &PipelineTable, initial_capital: f64, bars_per_year: f64) -> Self {
        let final_equity = table
            .equity
            .last()
            .copied()
            .unwrap_or(initial_capital);

        let total_return = if initial_capital > 0.0 {
            (final_equity - initial_capital) / initial_capital
        } else {
            0.0
        };

        let bars = table.len() as f64;
        let years = if bars_per_year > 0.0 { bars / bars_per_year } else { 0.0 };
        let annualized_return = if years > 0.0 && total_return > -1.0 {
            (1.0 + total_return).powf(1.0 / years) - 1.0
        } else {
            0.0
        };

        let sharpe_ratio = compute_sharpe(&table.net_return, bars_per_year);
        let (max_drawdown, max_drawdown_duration) = compute_drawdown(&table.equity);

        let calmar_ratio = if max_drawdown > 0.0 {
            annualized_return / max_drawdown
        } else {
            0.0
        };

        let trade_count = table
            .position
            .windows(2)
            .filter(|w| w[0] != w[1])
            .count();

        let in_market = table.position.iter().filter(|p| p.abs() > 0.0).count();
        let time_in_market = if table.is_empty() {
            0.0
        } else {
            in_market as f64 / bars
        };

        let breach_count = table.sigma_event.iter().filter(|&&b| b).count();

        let buy_hold_return = match (table.buy_hold_equity.last(), initial_capital > 0.0) {
            (Some(&bh), true) => (bh - initial_capital) / initial_capital,
            _ => 0.0,
        };

        Metrics {
            total_return,
            annualized_return,
            sharpe_ratio,
            max_drawdown,
            max_drawdown_duration,
            calmar_ratio,
            trade_count,
            time_in_market,
            breach_count,
            final_equity,
            buy_hold_return,
        }
    }
}

fn compute_sharpe(net_returns: &[f64], bars_per_year: f64) -> f64 {
    if net_returns.len() < 2 {
        return 0.0;
    }
    let n = net_returns.len() as f64;
    let mean: f64 = net_returns.iter().sum::<f64>() / n;
    let variance: f64 = net_returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let stddev = variance.sqrt();

    if stddev > 0.0 {
        (mean / stddev) * bars_per_year.sqrt()
    } else {
        0.0
    }
}

fn compute_drawdown(equity: &[f64]) -> (f64, usize) {
    if equity.is_empty() {
        return (0.0, 0);
    }

    let mut peak = equity[0];
    let mut max_dd = 0.0_f64;
    let mut max_dd_duration = 0usize;
    let mut current_dd_duration = 0usize;

    for &e in equity {
        if e > peak {
            peak = e;
            current_dd_duration = 0;
        } else if peak > 0.0 {
            let dd = (peak - e) / peak;
            if dd > max_dd {
                max_dd = dd;
            }
            current_dd_duration += 1;
            if current_dd_duration > max_dd_duration {
                max_dd_duration = current_dd_duration;
            }
        }
    }

    (max_dd, max_dd_duration)
}
