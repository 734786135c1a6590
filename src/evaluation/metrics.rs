//! Scoring rules for probabilistic forecasts.
//!
//! The Brier score is a proper scoring rule:
//!
//! ```text
//! Brier = mean((prediction - outcome)^2)
//! ```
//!
//! ## Interpretation
//!
//! - **0.0**: Perfect predictions
//! - **0.25**: Always predicting 0.5
//! - **1.0**: Always wrong with certainty
//!
//! Predicting the base rate scores `base_rate * (1 - base_rate)`.

use crate::errors::{Error, Result};

/// Default decision threshold for [`accuracy`].
pub const DEFAULT_THRESHOLD: f64 = 0.5;

fn check_lengths(predictions: &[f64], outcomes: &[f64]) -> Result<()> {
    if predictions.len() != outcomes.len() {
        return Err(Error::LengthMismatch {
            predictions: predictions.len(),
            outcomes: outcomes.len(),
        });
    }
    Ok(())
}

/// Mean squared error between predictions and 0/1 outcomes.
///
/// Returns 0.0 for empty input.
pub fn brier_score(predictions: &[f64], outcomes: &[f64]) -> Result<f64> {
    check_lengths(predictions, outcomes)?;
    if predictions.is_empty() {
        return Ok(0.0);
    }
    let sum: f64 = predictions
        .iter()
        .zip(outcomes)
        .map(|(p, y)| (p - y).powi(2))
        .sum();
    Ok(sum / predictions.len() as f64)
}

/// Fraction of predictions whose thresholded class matches the outcome.
///
/// A prediction exactly at `threshold` counts as the positive class.
/// Returns 0.0 for empty input.
pub fn accuracy(predictions: &[f64], outcomes: &[f64], threshold: f64) -> Result<f64> {
    check_lengths(predictions, outcomes)?;
    if predictions.is_empty() {
        return Ok(0.0);
    }
    let correct = predictions
        .iter()
        .zip(outcomes)
        .filter(|(p, y)| {
            let class = if **p >= threshold { 1.0 } else { 0.0 };
            class == **y
        })
        .count();
    Ok(correct as f64 / predictions.len() as f64)
}

/// Brier score of always predicting `base_rate`.
pub fn baseline_brier(base_rate: f64) -> f64 {
    let base_rate = base_rate.clamp(0.0, 1.0);
    base_rate * (1.0 - base_rate)
}

/// Brier skill score against the base-rate forecaster.
///
/// ```text
/// BSS = 1 - (Brier / Baseline)
/// ```
///
/// Returns None when the baseline is degenerate (base rate 0 or 1).
pub fn skill_score(brier: f64, base_rate: f64) -> Option<f64> {
    let baseline = baseline_brier(base_rate);
    if baseline < 1e-10 {
        return None;
    }
    Some(1.0 - brier / baseline)
}
