//! Pattern compilation: pattern specs → fixed-shape k×m rows.
//!
//! Compilation resolves column references and fills single-valued defaults.
//! Weight rows that were not specified stay `None`; mechanism-dependent
//! defaults are the validator's job because they depend on the whole set.

use std::collections::HashMap;

use amp_common::{Error, Result};
use amp_config::{ColumnRef, Mechanism, PatternSpec, ScoreToProbability, Weights};
use amp_math::SigmoidCutoff;
use tracing::{debug, info};

use super::sampler::step_rng;

/// Compiled patterns before mechanism-based weight defaulting.
#[derive(Debug, Clone)]
pub struct PatternDraft {
    /// Effective pattern specs (synthesized when none were configured).
    pub specs: Vec<PatternSpec>,
    /// `true` = observed under the pattern, `false` = amputation candidate.
    pub observed_var_indicator: Vec<Vec<bool>>,
    /// `None` marks a pattern whose weights were not given.
    pub weights: Vec<Option<Vec<f64>>>,
    pub mechanisms: Vec<Mechanism>,
    pub freqs: Vec<f64>,
    pub score_to_probability: Vec<ScoreToProbability>,
    pub n_features: usize,
}

impl PatternDraft {
    pub fn n_patterns(&self) -> usize {
        self.specs.len()
    }
}

/// The single pattern used when none is configured: a random half of the
/// features amputed under MAR with sigmoid-right.
pub fn default_patterns(m_features: usize, seed: Option<u64>) -> Vec<PatternSpec> {
    let mut rng = step_rng(seed);
    let mut incomplete = rand::seq::index::sample(&mut rng, m_features, m_features / 2).into_vec();
    incomplete.sort_unstable();
    vec![PatternSpec::new(incomplete)
        .with_mechanism(Mechanism::Mar)
        .with_freq(1.0)
        .with_transform(SigmoidCutoff::Right)]
}

/// Compile pattern specs against a dataset with `m_features` columns.
pub fn compile(
    patterns: &[PatternSpec],
    m_features: usize,
    colname_to_index: &HashMap<String, usize>,
    seed: Option<u64>,
) -> Result<PatternDraft> {
    let specs = if patterns.is_empty() {
        info!("No patterns passed, setting default pattern");
        default_patterns(m_features, seed)
    } else {
        patterns.to_vec()
    };

    let k = specs.len();
    let mut draft = PatternDraft {
        specs: Vec::with_capacity(k),
        observed_var_indicator: Vec::with_capacity(k),
        weights: Vec::with_capacity(k),
        mechanisms: Vec::with_capacity(k),
        freqs: vec![1.0 / k as f64; k],
        score_to_probability: Vec::with_capacity(k),
        n_features: m_features,
    };

    for (idx, pattern) in specs.iter().enumerate() {
        let amputed = resolve_refs(
            &pattern.incomplete_vars,
            "incomplete_vars",
            idx,
            m_features,
            colname_to_index,
        )?;
        let mut observed = vec![true; m_features];
        for col in amputed {
            observed[col] = false;
        }
        draft.observed_var_indicator.push(observed);

        let weights = match &pattern.weights {
            None => None,
            Some(Weights::Dense(values)) => {
                if values.len() != m_features {
                    return Err(Error::WeightLength {
                        pattern: idx,
                        expected: m_features,
                        actual: values.len(),
                    });
                }
                Some(values.clone())
            }
            Some(Weights::ByColumn(entries)) => {
                let refs: Vec<ColumnRef> = entries.iter().map(|(c, _)| c.clone()).collect();
                let cols = resolve_refs(&refs, "weights", idx, m_features, colname_to_index)?;
                let mut row = vec![0.0; m_features];
                for (col, (_, w)) in cols.into_iter().zip(entries) {
                    row[col] = *w;
                }
                Some(row)
            }
        };
        draft.weights.push(weights);

        draft.mechanisms.push(pattern.mechanism.unwrap_or_default());
        draft
            .score_to_probability
            .push(pattern.score_to_probability_func.clone().unwrap_or_default());
    }

    // Frequencies are all-or-none; a partial specification keeps 1/k here and
    // is rejected by the validator.
    if let Some(freqs) = specs.iter().map(|p| p.freq).collect::<Option<Vec<f64>>>() {
        draft.freqs = freqs;
    }

    debug!(
        patterns = k,
        features = m_features,
        "Compiled pattern specs into matrix form"
    );
    draft.specs = specs;
    Ok(draft)
}

/// Resolve a list of column references to positions in `0..m`.
fn resolve_refs(
    refs: &[ColumnRef],
    field: &'static str,
    pattern: usize,
    m_features: usize,
    colname_to_index: &HashMap<String, usize>,
) -> Result<Vec<usize>> {
    if refs.is_empty() {
        return Ok(Vec::new());
    }
    if refs.len() > m_features {
        return Err(Error::TooManyColumns {
            pattern,
            listed: refs.len(),
            columns: m_features,
        });
    }
    let by_name = refs[0].is_name();
    if refs.iter().any(|r| r.is_name() != by_name) {
        return Err(Error::MixedColumnRefs { pattern, field });
    }

    refs.iter()
        .map(|r| match r {
            ColumnRef::Name(name) => {
                colname_to_index
                    .get(name)
                    .copied()
                    .ok_or_else(|| Error::UnknownColumn {
                        pattern,
                        name: name.clone(),
                    })
            }
            ColumnRef::Index(index) => usize::try_from(*index)
                .ok()
                .filter(|&i| i < m_features)
                .ok_or(Error::IndexOutOfRange {
                    pattern,
                    index: *index,
                    columns: m_features,
                }),
        })
        .collect()
}
