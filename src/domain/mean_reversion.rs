//! Mean-reversion forecast component (optional part of stage 2).
//!
//! A Wilder-smoothed gain/loss oscillator on a 0-100 scale, smoothed over a
//! short window, mapped through a dead-zone transform around the midpoint,
//! then smoothed again so position targets do not step discontinuously.

use crate::domain::ewm::ewm_mean;
use crate::domain::params::MeanReversionParams;

/// Oscillator midpoint: no directional information.
pub const NEUTRAL: f64 = 50.0;

/// Wilder-smoothed relative-strength oscillator over closes.
///
/// First average is a simple mean of the first `period` changes, then
/// `avg = (prev_avg * (period - 1) + current) / period`. If the average
/// loss is 0 the oscillator pins at 100. Warm-up bars (fewer than `period`
/// price changes) emit the neutral midpoint so downstream components stay
/// silent there.
pub fn oscillator(closes: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || closes.len() < 2 {
        return vec![NEUTRAL; closes.len()];
    }

    let mut gains = Vec::with_capacity(closes.len() - 1);
    let mut losses = Vec::with_capacity(closes.len() - 1);
    for i in 1..closes.len() {
        let change = closes[i] - closes[i - 1];
        gains.push(if change > 0.0 { change } else { 0.0 });
        losses.push(if change < 0.0 { -change } else { 0.0 });
    }

    let mut out = Vec::with_capacity(closes.len());
    out.push(NEUTRAL);

    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    for i in 0..gains.len() {
        if i < period - 1 {
            out.push(NEUTRAL);
        } else if i == period - 1 {
            avg_gain = gains[..period].iter().sum::<f64>() / period as f64;
            avg_loss = losses[..period].iter().sum::<f64>() / period as f64;
            out.push(oscillator_value(avg_gain, avg_loss));
        } else {
            avg_gain = (avg_gain * (period - 1) as f64 + gains[i]) / period as f64;
            avg_loss = (avg_loss * (period - 1) as f64 + losses[i]) / period as f64;
            out.push(oscillator_value(avg_gain, avg_loss));
        }
    }
    out
}

fn oscillator_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 {
            NEUTRAL
        } else {
            100.0
        }
    } else {
        100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
    }
}

/// Dead-zone transform: zero while `|diff| <= dead_zone`, linear beyond it.
pub fn dead_zone_transform(diff: f64, dead_zone: f64, scalar: f64) -> f64 {
    if diff.abs() <= dead_zone {
        0.0
    } else {
        diff.signum() * (diff.abs() - dead_zone) * scalar
    }
}

/// Full mean-reversion component: smoothed oscillator, dead-zoned distance
/// from the midpoint, smoothed output.
pub fn mean_reversion_forecast(closes: &[f64], params: &MeanReversionParams) -> Vec<f64> {
    let osc = oscillator(closes, params.oscillator_period);
    let smoothed = ewm_mean(&osc, params.smooth_span);
    let raw: Vec<f64> = smoothed
        .iter()
        .map(|&v| dead_zone_transform(NEUTRAL - v, params.dead_zone, params.scalar))
        .collect();
    ewm_mean(&raw, params.output_smooth_span)
}
