//! Defaulting and validation of compiled patterns.
//!
//! The defaulting pass runs first (proportion normalization, mechanism-based
//! weights) because the hard checks assume it ran. Every fatal condition is
//! raised here, before any sample is assigned or drawn.

use std::fmt;

use amp_common::{Dataset, Error, Result};
use amp_config::{AmputerConfig, Mechanism, ScoreToProbability};
use serde::Serialize;
use tracing::{info, warn};

use super::compile::PatternDraft;

/// Absolute tolerance for the frequencies summing to one.
pub const FREQ_SUM_TOLERANCE: f64 = 1e-9;

/// Fully resolved k×m pattern set. Read-only for the duration of a run.
#[derive(Debug, Clone, Serialize)]
pub struct CompiledPatternSet {
    /// `true` = observed, `false` = amputed when the pattern applies.
    pub observed_var_indicator: Vec<Vec<bool>>,
    pub weights: Vec<Vec<f64>>,
    pub mechanisms: Vec<Mechanism>,
    pub freqs: Vec<f64>,
    pub score_to_probability: Vec<ScoreToProbability>,
}

impl CompiledPatternSet {
    pub fn n_patterns(&self) -> usize {
        self.mechanisms.len()
    }

    pub fn n_features(&self) -> usize {
        self.observed_var_indicator.first().map(Vec::len).unwrap_or(0)
    }

    /// Columns set to missing when `pattern` applies to a sample.
    pub fn amputed_columns(&self, pattern: usize) -> Vec<usize> {
        self.observed_var_indicator[pattern]
            .iter()
            .enumerate()
            .filter(|&(_, &observed)| !observed)
            .map(|(col, _)| col)
            .collect()
    }

    /// Columns with a nonzero weight in some non-MCAR pattern.
    pub fn scored_columns(&self) -> Vec<usize> {
        (0..self.n_features())
            .filter(|&col| {
                self.mechanisms
                    .iter()
                    .zip(&self.weights)
                    .any(|(mech, row)| *mech != Mechanism::Mcar && row[col] != 0.0)
            })
            .collect()
    }
}

/// Suspicious but legal configuration, logged and reported.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Advisory {
    /// `prop` was given as a percentage.
    PercentageProportion { given: f64, normalized: f64 },
    /// Weights were filled from the pattern's mechanism.
    DefaultedWeights { pattern: usize, mechanism: Mechanism },
    /// Weight mask matches the mask of the other mechanism.
    SuspectMechanism { pattern: usize, mechanism: Mechanism },
    /// A scored column holds text that will be coerced to numbers.
    NumericCoercion { column: String },
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::PercentageProportion { given, normalized } => write!(
                f,
                "proportion {} looks like a percentage, using {}",
                given, normalized
            ),
            Advisory::DefaultedWeights { pattern, mechanism } => write!(
                f,
                "pattern {}: no weights passed, filled in for {}",
                pattern, mechanism
            ),
            Advisory::SuspectMechanism { pattern, mechanism } => match mechanism {
                Mechanism::Mnar => write!(
                    f,
                    "pattern {}: weights for observed vars under MNAR, did you mean MAR+MNAR?",
                    pattern
                ),
                _ => write!(
                    f,
                    "pattern {}: weights for incomplete vars under {}, did you mean MAR+MNAR?",
                    pattern, mechanism
                ),
            },
            Advisory::NumericCoercion { column } => write!(
                f,
                "feature `{}` is non-numeric and will be coerced when computing scores",
                column
            ),
        }
    }
}

/// Output of the defaulting and validation pass.
#[derive(Debug, Clone, Serialize)]
pub struct ValidatedPatterns {
    pub patterns: CompiledPatternSet,
    /// Target proportion as a decimal.
    pub prop: f64,
    pub advisories: Vec<Advisory>,
}

/// Fill defaults into `draft` and check it against the amputer options.
pub fn validate_and_default(draft: PatternDraft, config: &AmputerConfig) -> Result<ValidatedPatterns> {
    let mut advisories = Vec::new();

    let prop = normalize_prop(config.prop, &mut advisories);
    let weights = default_weights(&draft, &mut advisories)?;

    let patterns = CompiledPatternSet {
        observed_var_indicator: draft.observed_var_indicator,
        weights,
        mechanisms: draft.mechanisms,
        freqs: draft.freqs,
        score_to_probability: draft.score_to_probability,
    };

    check_shapes(&patterns, draft.specs.len(), draft.n_features)?;
    check_indicator(&patterns)?;
    if !(0.0..=1.0).contains(&prop) {
        return Err(Error::InvalidProportion(config.prop));
    }
    check_freqs(&patterns, &draft.specs)?;
    check_weights(&patterns)?;
    check_search(config)?;
    mechanism_advisories(&patterns, &mut advisories);

    Ok(ValidatedPatterns {
        patterns,
        prop,
        advisories,
    })
}

/// Dataset checks that need the compiled patterns.
///
/// Scored columns must be complete, finite and numeric or coercible to numeric.
pub fn validate_dataset(patterns: &CompiledPatternSet, data: &Dataset) -> Result<Vec<Advisory>> {
    check_dataset_shape(data)?;
    if patterns.n_features() != data.n_cols() {
        return Err(Error::Dataset(format!(
            "patterns compiled for {} columns but dataset has {}",
            patterns.n_features(),
            data.n_cols()
        )));
    }

    let rows: Vec<usize> = (0..data.n_rows()).collect();
    let mut advisories = Vec::new();
    for col in patterns.scored_columns() {
        if data.column_missing_count(col) > 0 {
            return Err(Error::IncompleteFeature {
                column: data.column_name(col),
            });
        }
        let values = data.numeric_column(col, &rows)?;
        if let Some((row, &value)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(Error::NonFiniteFeature {
                column: data.column_name(col),
                row,
                value,
            });
        }
        if data.column_needs_coercion(col) {
            let advisory = Advisory::NumericCoercion {
                column: data.column_name(col),
            };
            warn!(column = col, "{}", advisory);
            advisories.push(advisory);
        }
    }
    Ok(advisories)
}

/// A dataset needs at least two columns to be amputed.
pub fn check_dataset_shape(data: &Dataset) -> Result<()> {
    if data.n_cols() < 2 {
        return Err(Error::DatasetTooSmall {
            columns: data.n_cols(),
        });
    }
    Ok(())
}

fn normalize_prop(prop: f64, advisories: &mut Vec<Advisory>) -> f64 {
    if prop > 1.0 && prop <= 100.0 {
        let normalized = prop / 100.0;
        let advisory = Advisory::PercentageProportion {
            given: prop,
            normalized,
        };
        info!("{}", advisory);
        advisories.push(advisory);
        normalized
    } else {
        prop
    }
}

fn default_weights(draft: &PatternDraft, advisories: &mut Vec<Advisory>) -> Result<Vec<Vec<f64>>> {
    draft
        .weights
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            if let Some(row) = row {
                return Ok(row.clone());
            }
            let observed = &draft.observed_var_indicator[idx];
            let mechanism = draft.mechanisms[idx];
            let filled = match mechanism {
                Mechanism::Mcar => vec![0.0; observed.len()],
                Mechanism::Mar => observed.iter().map(|&o| if o { 1.0 } else { 0.0 }).collect(),
                Mechanism::Mnar => observed.iter().map(|&o| if o { 0.0 } else { 1.0 }).collect(),
                Mechanism::MarMnar => return Err(Error::MissingCustomWeights { pattern: idx }),
            };
            let advisory = Advisory::DefaultedWeights {
                pattern: idx,
                mechanism,
            };
            info!(pattern = idx, mechanism = %mechanism, "{}", advisory);
            advisories.push(advisory);
            Ok(filled)
        })
        .collect()
}

fn check_shapes(patterns: &CompiledPatternSet, k: usize, m: usize) -> Result<()> {
    let lengths = [
        ("observed_var_indicator", patterns.observed_var_indicator.len()),
        ("weights", patterns.weights.len()),
        ("mechanisms", patterns.mechanisms.len()),
        ("freqs", patterns.freqs.len()),
        ("score_to_probability_func", patterns.score_to_probability.len()),
    ];
    if let Some((name, len)) = lengths.iter().find(|(_, len)| *len != k) {
        return Err(Error::Config(format!(
            "expected one `{}` entry per pattern ({}), found {}",
            name, k, len
        )));
    }
    let ragged = patterns
        .observed_var_indicator
        .iter()
        .map(Vec::len)
        .chain(patterns.weights.iter().map(Vec::len))
        .any(|len| len != m);
    if ragged {
        return Err(Error::Config(format!(
            "every pattern row must cover all {} features",
            m
        )));
    }
    Ok(())
}

fn check_indicator(patterns: &CompiledPatternSet) -> Result<()> {
    for (idx, row) in patterns.observed_var_indicator.iter().enumerate() {
        if row.iter().all(|&observed| observed) {
            return Err(Error::InvalidIndicator(format!(
                "pattern {} amputes no features, which would result in no amputation",
                idx
            )));
        }
        if patterns.mechanisms[idx] == Mechanism::Mar && row.iter().all(|&observed| !observed) {
            return Err(Error::InvalidIndicator(format!(
                "pattern {} amputes all features under MAR, leaving nothing observed to drive the score",
                idx
            )));
        }
    }
    Ok(())
}

fn check_freqs(patterns: &CompiledPatternSet, specs: &[amp_config::PatternSpec]) -> Result<()> {
    let given = specs.iter().filter(|p| p.freq.is_some()).count();
    if given != 0 && given != specs.len() {
        return Err(Error::PartialFrequencies);
    }
    if let Some((idx, f)) = patterns
        .freqs
        .iter()
        .enumerate()
        .find(|(_, f)| !(0.0..=1.0).contains(*f))
    {
        return Err(Error::InvalidFrequencies(format!(
            "frequency {} of pattern {} is outside [0, 1]",
            f, idx
        )));
    }
    let sum: f64 = patterns.freqs.iter().sum();
    if (sum - 1.0).abs() > FREQ_SUM_TOLERANCE {
        return Err(Error::InvalidFrequencies(format!(
            "frequencies should sum to 1, got {}",
            sum
        )));
    }
    Ok(())
}

fn check_weights(patterns: &CompiledPatternSet) -> Result<()> {
    for (idx, (row, mechanism)) in patterns.weights.iter().zip(&patterns.mechanisms).enumerate() {
        if let Some(w) = row.iter().find(|w| !w.is_finite()) {
            return Err(Error::InvalidWeights(format!(
                "pattern {} has non-finite weight {}",
                idx, w
            )));
        }
        let all_zero = row.iter().all(|&w| w == 0.0);
        match mechanism {
            Mechanism::Mcar if !all_zero => {
                return Err(Error::InvalidWeights(format!(
                    "pattern {} is MCAR and must have weights of all 0's",
                    idx
                )));
            }
            Mechanism::Mar | Mechanism::Mnar | Mechanism::MarMnar if all_zero => {
                return Err(Error::InvalidWeights(format!(
                    "pattern {} is {} but all its weights are 0",
                    idx, mechanism
                )));
            }
            _ => {}
        }
    }
    Ok(())
}

fn check_search(config: &AmputerConfig) -> Result<()> {
    if !config.lower_range.is_finite() || !config.upper_range.is_finite() {
        return Err(Error::InvalidSearch(
            "lower_range and upper_range must be finite".to_string(),
        ));
    }
    if config.lower_range >= config.upper_range {
        return Err(Error::InvalidSearch(format!(
            "lower_range {} must be below upper_range {}",
            config.lower_range, config.upper_range
        )));
    }
    if !(config.max_dif_with_target > 0.0) {
        return Err(Error::InvalidSearch(format!(
            "max_dif_with_target must be positive, got {}",
            config.max_dif_with_target
        )));
    }
    if config.max_iter == 0 {
        return Err(Error::InvalidSearch("max_iter must be at least 1".to_string()));
    }
    Ok(())
}

fn mechanism_advisories(patterns: &CompiledPatternSet, advisories: &mut Vec<Advisory>) {
    for (idx, mechanism) in patterns.mechanisms.iter().enumerate() {
        let observed = &patterns.observed_var_indicator[idx];
        let weighted = patterns.weights[idx].iter().map(|&w| w != 0.0);
        let suspect = match mechanism {
            Mechanism::Mar => weighted.zip(observed).all(|(w, &o)| w == !o),
            Mechanism::Mnar => weighted.zip(observed).all(|(w, &o)| w == o),
            _ => false,
        };
        if suspect {
            let advisory = Advisory::SuspectMechanism {
                pattern: idx,
                mechanism: *mechanism,
            };
            warn!(pattern = idx, "{}", advisory);
            advisories.push(advisory);
        }
    }
}
