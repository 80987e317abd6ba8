//! Configuration validation and parameter construction.
//!
//! Validates all config fields before a run, then builds the immutable
//! `StrategyParams` record. Keys not present fall back to the reference
//! defaults; keys that are present must be well formed.

use crate::domain::error::VoltraderError;
use crate::domain::params::{
    ForecastMode, MeanReversionParams, MeltdownDirection, StopExecution, StrategyParams, TrendRule,
};
use crate::ports::config_port::ConfigPort;

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), VoltraderError> {
    validate_data_section(config)?;
    validate_forecast_section(config)?;
    validate_risk_section(config)?;
    validate_execution_section(config)?;
    validate_backtest_section(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: &str) -> VoltraderError {
    VoltraderError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn validate_data_section(config: &dyn ConfigPort) -> Result<(), VoltraderError> {
    match config.get_string("data", "csv_path") {
        Some(s) if !s.trim().is_empty() => {}
        _ => {
            return Err(VoltraderError::ConfigMissing {
                section: "data".to_string(),
                key: "csv_path".to_string(),
            })
        }
    }
    let bars_per_year = config.get_double("data", "bars_per_year", 8760.0);
    if bars_per_year <= 0.0 {
        return Err(invalid("data", "bars_per_year", "must be positive"));
    }
    Ok(())
}

fn validate_forecast_section(config: &dyn ConfigPort) -> Result<(), VoltraderError> {
    let rules = parse_trend_rules(config)?;
    if rules.is_empty() {
        return Err(invalid("forecast", "fast_spans", "at least one rule required"));
    }
    for rule in &rules {
        if rule.fast_span == 0 || rule.slow_span == 0 {
            return Err(invalid("forecast", "fast_spans", "spans must be positive"));
        }
        if rule.fast_span >= rule.slow_span {
            return Err(invalid(
                "forecast",
                "slow_spans",
                "each slow span must exceed its fast span",
            ));
        }
    }

    let cap = config.get_double("forecast", "forecast_cap", 20.0);
    if cap <= 0.0 {
        return Err(invalid("forecast", "forecast_cap", "must be positive"));
    }

    parse_forecast_mode(config)?;

    let w_trend = config.get_double("forecast", "weight_trend", 1.0);
    let w_mr = config.get_double("forecast", "weight_mean_reversion", 0.0);
    if w_trend < 0.0 || w_mr < 0.0 {
        return Err(invalid(
            "forecast",
            "weight_trend",
            "blend weights must be non-negative",
        ));
    }

    let dead_zone = config.get_double("forecast", "mr_dead_zone", 10.0);
    if !(0.0..=50.0).contains(&dead_zone) {
        return Err(invalid("forecast", "mr_dead_zone", "must be between 0 and 50"));
    }
    if config.get_int("forecast", "mr_oscillator_period", 14) < 1 {
        return Err(invalid("forecast", "mr_oscillator_period", "must be at least 1"));
    }

    Ok(())
}

fn validate_risk_section(config: &dyn ConfigPort) -> Result<(), VoltraderError> {
    if config.get_int("risk", "vol_span", 36) < 1 {
        return Err(invalid("risk", "vol_span", "must be at least 1"));
    }
    if config.get_double("risk", "target_volatility", 1.0) <= 0.0 {
        return Err(invalid("risk", "target_volatility", "must be positive"));
    }
    if config.get_double("risk", "signal_divisor", 20.0) <= 0.0 {
        return Err(invalid("risk", "signal_divisor", "must be positive"));
    }

    let max_leverage = config.get_double("risk", "max_leverage", 4.0);
    if max_leverage <= 0.0 {
        return Err(invalid("risk", "max_leverage", "must be positive"));
    }
    let bear_leverage = config.get_double("risk", "bear_leverage", 2.0);
    if bear_leverage <= 0.0 || bear_leverage > max_leverage {
        return Err(invalid(
            "risk",
            "bear_leverage",
            "must be positive and no greater than max_leverage",
        ));
    }

    if config.get_int("risk", "regime_span", 2000) < 1 {
        return Err(invalid("risk", "regime_span", "must be at least 1"));
    }
    if config.get_int("risk", "atr_span", 24) < 1 {
        return Err(invalid("risk", "atr_span", "must be at least 1"));
    }
    if config.get_double("risk", "atr_multiplier", 6.0) <= 0.0 {
        return Err(invalid("risk", "atr_multiplier", "must be positive"));
    }
    if config.get_double("risk", "vol_floor", 0.004) < 0.0 {
        return Err(invalid("risk", "vol_floor", "must be non-negative"));
    }
    parse_meltdown_direction(config)?;
    Ok(())
}

fn validate_execution_section(config: &dyn ConfigPort) -> Result<(), VoltraderError> {
    if config.get_double("execution", "buffer_fraction", 0.10) < 0.0 {
        return Err(invalid("execution", "buffer_fraction", "must be non-negative"));
    }
    if config.get_double("execution", "fee_rate", 0.0005) < 0.0 {
        return Err(invalid("execution", "fee_rate", "must be non-negative"));
    }
    if config.get_double("execution", "funding_rate", 0.0) < 0.0 {
        return Err(invalid("execution", "funding_rate", "must be non-negative"));
    }
    if config.get_double("execution", "slippage_haircut", 0.002) < 0.0 {
        return Err(invalid("execution", "slippage_haircut", "must be non-negative"));
    }
    parse_stop_execution(config)?;
    Ok(())
}

fn validate_backtest_section(config: &dyn ConfigPort) -> Result<(), VoltraderError> {
    if config.get_double("backtest", "initial_capital", 10_000.0) <= 0.0 {
        return Err(invalid("backtest", "initial_capital", "must be positive"));
    }
    Ok(())
}

/// Parse a comma-separated list like `8,16,32,64`.
fn parse_double_list(section: &str, key: &str, raw: &str) -> Result<Vec<f64>, VoltraderError> {
    raw.split(',')
        .map(|s| {
            s.trim()
                .parse::<f64>()
                .map_err(|_| invalid(section, key, "expected a comma-separated list of numbers"))
        })
        .collect()
}

fn parse_usize_list(section: &str, key: &str, raw: &str) -> Result<Vec<usize>, VoltraderError> {
    raw.split(',')
        .map(|s| {
            s.trim()
                .parse::<usize>()
                .map_err(|_| invalid(section, key, "expected a comma-separated list of integers"))
        })
        .collect()
}

fn parse_trend_rules(config: &dyn ConfigPort) -> Result<Vec<TrendRule>, VoltraderError> {
    let defaults = StrategyParams::default().trend_rules;

    let fast_raw = config.get_string("forecast", "fast_spans");
    let slow_raw = config.get_string("forecast", "slow_spans");
    let scalar_raw = config.get_string("forecast", "scalars");
    let weight_raw = config.get_string("forecast", "weights");

    if fast_raw.is_none() && slow_raw.is_none() && scalar_raw.is_none() && weight_raw.is_none() {
        return Ok(defaults);
    }

    let fast = match fast_raw {
        Some(s) => parse_usize_list("forecast", "fast_spans", &s)?,
        None => defaults.iter().map(|r| r.fast_span).collect(),
    };
    let slow = match slow_raw {
        Some(s) => parse_usize_list("forecast", "slow_spans", &s)?,
        None => defaults.iter().map(|r| r.slow_span).collect(),
    };
    let scalars = match scalar_raw {
        Some(s) => parse_double_list("forecast", "scalars", &s)?,
        None => defaults.iter().map(|r| r.scalar).collect(),
    };
    let weights = match weight_raw {
        Some(s) => parse_double_list("forecast", "weights", &s)?,
        None => defaults.iter().map(|r| r.weight).collect(),
    };

    if fast.len() != slow.len() || fast.len() != scalars.len() || fast.len() != weights.len() {
        return Err(invalid(
            "forecast",
            "fast_spans",
            "fast_spans, slow_spans, scalars and weights must have the same length",
        ));
    }

    Ok(fast
        .into_iter()
        .zip(slow)
        .zip(scalars)
        .zip(weights)
        .map(|(((fast_span, slow_span), scalar), weight)| TrendRule {
            fast_span,
            slow_span,
            scalar,
            weight,
        })
        .collect())
}

fn parse_forecast_mode(config: &dyn ConfigPort) -> Result<ForecastMode, VoltraderError> {
    match config.get_string("forecast", "mode").as_deref() {
        None => Ok(ForecastMode::TrendOnly),
        Some("trend") => Ok(ForecastMode::TrendOnly),
        Some("trend_mr") => Ok(ForecastMode::TrendMeanReversion),
        Some(_) => Err(invalid(
            "forecast",
            "mode",
            "expected 'trend' or 'trend_mr'",
        )),
    }
}

fn parse_meltdown_direction(config: &dyn ConfigPort) -> Result<MeltdownDirection, VoltraderError> {
    match config.get_string("risk", "meltdown_direction").as_deref() {
        None => Ok(MeltdownDirection::Down),
        Some("down") => Ok(MeltdownDirection::Down),
        Some("symmetric") => Ok(MeltdownDirection::Symmetric),
        Some(_) => Err(invalid(
            "risk",
            "meltdown_direction",
            "expected 'down' or 'symmetric'",
        )),
    }
}

fn parse_stop_execution(config: &dyn ConfigPort) -> Result<StopExecution, VoltraderError> {
    match config.get_string("execution", "stop_execution").as_deref() {
        None => Ok(StopExecution::WorstOfSlippage),
        Some("close_confirm") => Ok(StopExecution::CloseConfirm),
        Some("stop_at_open") => Ok(StopExecution::StopAtOpen),
        Some("worst_of") => Ok(StopExecution::WorstOfSlippage),
        Some(_) => Err(invalid(
            "execution",
            "stop_execution",
            "expected 'close_confirm', 'stop_at_open' or 'worst_of'",
        )),
    }
}

/// Build `StrategyParams` from a validated config.
pub fn build_params(config: &dyn ConfigPort) -> Result<StrategyParams, VoltraderError> {
    let defaults = StrategyParams::default();
    let mr_defaults = MeanReversionParams::default();

    Ok(StrategyParams {
        trend_rules: parse_trend_rules(config)?,
        forecast_cap: config.get_double("forecast", "forecast_cap", defaults.forecast_cap),
        weight_trend: config.get_double("forecast", "weight_trend", defaults.weight_trend),
        weight_mean_reversion: config.get_double(
            "forecast",
            "weight_mean_reversion",
            defaults.weight_mean_reversion,
        ),
        forecast_mode: parse_forecast_mode(config)?,
        mean_reversion: MeanReversionParams {
            oscillator_period: config.get_int(
                "forecast",
                "mr_oscillator_period",
                mr_defaults.oscillator_period as i64,
            ) as usize,
            smooth_span: config.get_int(
                "forecast",
                "mr_smooth_span",
                mr_defaults.smooth_span as i64,
            ) as usize,
            dead_zone: config.get_double("forecast", "mr_dead_zone", mr_defaults.dead_zone),
            scalar: config.get_double("forecast", "mr_scalar", mr_defaults.scalar),
            output_smooth_span: config.get_int(
                "forecast",
                "mr_output_smooth_span",
                mr_defaults.output_smooth_span as i64,
            ) as usize,
        },

        vol_span: config.get_int("risk", "vol_span", defaults.vol_span as i64) as usize,
        bars_per_year: config.get_double("data", "bars_per_year", defaults.bars_per_year),

        target_volatility: config.get_double(
            "risk",
            "target_volatility",
            defaults.target_volatility,
        ),
        signal_divisor: config.get_double("risk", "signal_divisor", defaults.signal_divisor),
        max_leverage: config.get_double("risk", "max_leverage", defaults.max_leverage),
        bear_leverage: config.get_double("risk", "bear_leverage", defaults.bear_leverage),
        regime_span: config.get_int("risk", "regime_span", defaults.regime_span as i64) as usize,

        atr_span: config.get_int("risk", "atr_span", defaults.atr_span as i64) as usize,
        atr_multiplier: config.get_double("risk", "atr_multiplier", defaults.atr_multiplier),
        vol_floor: config.get_double("risk", "vol_floor", defaults.vol_floor),
        meltdown_direction: parse_meltdown_direction(config)?,

        buffer_fraction: config.get_double(
            "execution",
            "buffer_fraction",
            defaults.buffer_fraction,
        ),
        stop_execution: parse_stop_execution(config)?,
        slippage_haircut: config.get_double(
            "execution",
            "slippage_haircut",
            defaults.slippage_haircut,
        ),
        fee_rate: config.get_double("execution", "fee_rate", defaults.fee_rate),
        funding_rate: config.get_double("execution", "funding_rate", defaults.funding_rate),
        initial_capital: config.get_double(
            "backtest",
            "initial_capital",
            defaults.initial_capital,
        ),
    })
}
