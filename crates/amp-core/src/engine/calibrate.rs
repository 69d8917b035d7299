//! Score → probability calibration by bisection over the transform shift.
//!
//! The mean probability of `transform(z, b)` is non-decreasing in the shift
//! `b`, so a mean above target moves the upper bound down and a mean below
//! target moves the lower bound up.

use amp_common::{Error, Result};
use amp_config::{AmputerConfig, ScoreToProbability};
use amp_math::{mean, zscore};
use serde::Serialize;
use tracing::debug;

/// Bracket, tolerance and iteration cap of the shift search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchSettings {
    pub lower_range: f64,
    pub upper_range: f64,
    pub max_dif_with_target: f64,
    pub max_iter: usize,
}

impl From<&AmputerConfig> for SearchSettings {
    fn from(config: &AmputerConfig) -> Self {
        Self {
            lower_range: config.lower_range,
            upper_range: config.upper_range,
            max_dif_with_target: config.max_dif_with_target,
            max_iter: config.max_iter,
        }
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self::from(&AmputerConfig::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CalibrationMethod {
    /// All scores were zero; a uniform probability was assigned.
    Uniform,
    /// Shift found by bisection.
    Bisection,
}

/// How a group's probabilities were obtained.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CalibrationOutcome {
    pub method: CalibrationMethod,
    /// Shift that produced the returned probabilities.
    pub shift: Option<f64>,
    pub iterations: usize,
    pub mean_probability: f64,
    /// Whether the mean is within tolerance of the target.
    pub converged: bool,
}

#[derive(Debug, Clone)]
pub struct Calibration {
    pub probabilities: Vec<f64>,
    pub outcome: CalibrationOutcome,
}

/// Missingness probability for every score of pattern group `pattern`.
///
/// Scores that are all exactly zero get `uniform_probability` each. Otherwise
/// the scores are z-scored and the shift is bisected in
/// `[lower_range, upper_range]` until the mean probability is within
/// `max_dif_with_target` of `target`. The last allotted iteration only moves
/// the midpoint; it does not evaluate the transform again.
pub fn calibrate(
    scores: &[f64],
    transform: &ScoreToProbability,
    target: f64,
    uniform_probability: f64,
    settings: &SearchSettings,
    pattern: usize,
) -> Result<Calibration> {
    if scores.iter().all(|&s| s == 0.0) {
        return Ok(Calibration {
            probabilities: vec![uniform_probability; scores.len()],
            outcome: CalibrationOutcome {
                method: CalibrationMethod::Uniform,
                shift: None,
                iterations: 0,
                mean_probability: uniform_probability,
                converged: (uniform_probability - target).abs() < settings.max_dif_with_target,
            },
        });
    }

    let standardized = zscore(scores);
    let evaluate = |shift: f64| -> Result<(Vec<f64>, f64)> {
        let probs = transform.probabilities(&standardized, shift);
        check_probabilities(&probs, standardized.len(), pattern)?;
        let m = mean(&probs);
        Ok((probs, m))
    };

    let mut lower = settings.lower_range;
    let mut upper = settings.upper_range;
    let mut shift = 0.0;
    let mut evaluated: Option<(Vec<f64>, f64, f64)> = None;
    let mut iterations = 0;
    let mut converged = false;

    while iterations < settings.max_iter {
        iterations += 1;
        shift = lower + (upper - lower) / 2.0;
        if iterations == settings.max_iter {
            break;
        }

        let (probs, current) = evaluate(shift)?;
        let gap = current - target;
        evaluated = Some((probs, current, shift));
        if gap.abs() < settings.max_dif_with_target {
            converged = true;
            break;
        }
        if gap > 0.0 {
            upper = shift;
        } else {
            lower = shift;
        }
    }

    let (probabilities, mean_probability, shift) = match evaluated {
        Some(found) => found,
        None => {
            let (probs, current) = evaluate(shift)?;
            converged = (current - target).abs() < settings.max_dif_with_target;
            (probs, current, shift)
        }
    };

    debug!(
        pattern,
        shift,
        iterations,
        mean_probability,
        converged,
        "Calibrated score-to-probability shift"
    );

    Ok(Calibration {
        probabilities,
        outcome: CalibrationOutcome {
            method: CalibrationMethod::Bisection,
            shift: Some(shift),
            iterations,
            mean_probability,
            converged,
        },
    })
}

fn check_probabilities(probs: &[f64], expected: usize, pattern: usize) -> Result<()> {
    if probs.len() != expected {
        return Err(Error::Config(format!(
            "pattern {}: score-to-probability function returned {} probabilities for {} scores",
            pattern,
            probs.len(),
            expected
        )));
    }
    match probs.iter().find(|p| !(0.0..=1.0).contains(*p)) {
        Some(&value) => Err(Error::InvalidProbability { pattern, value }),
        None => Ok(()),
    }
}
