//! The amputer: one configured engine, run over in-memory datasets.

use amp_common::{Dataset, Result, SCHEMA_VERSION};
use amp_config::{AmputerConfig, Mechanism, UniformProbability};
use serde::Serialize;
use tracing::{debug, info};

use super::calibrate::{calibrate, CalibrationOutcome, SearchSettings};
use super::compile::compile;
use super::sampler::{assign_groups, draw_selection, group_members};
use super::score::weighted_sum_scores;
use super::validate::{
    check_dataset_shape, validate_and_default, validate_dataset, Advisory, ValidatedPatterns,
};
use crate::profile::MissingnessProfile;

/// Per-pattern outcome of a run.
#[derive(Debug, Clone, Serialize)]
pub struct PatternReport {
    pub index: usize,
    pub mechanism: Mechanism,
    pub score_to_probability: String,
    pub freq: f64,
    pub amputed_columns: Vec<String>,
    pub weights: Vec<f64>,
    /// Samples assigned to the pattern.
    pub group_size: usize,
    /// Samples the pattern was applied to.
    pub amputed_rows: usize,
    /// `None` when the group was empty.
    pub calibration: Option<CalibrationOutcome>,
}

/// Summary of one amputation run.
#[derive(Debug, Clone, Serialize)]
pub struct AmputationReport {
    pub schema_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Target proportion as a decimal.
    pub prop: f64,
    pub n_samples: usize,
    pub n_features: usize,
    pub patterns: Vec<PatternReport>,
    pub advisories: Vec<Advisory>,
    pub profile: MissingnessProfile,
}

/// Amputation engine configured once and run on any number of datasets.
///
/// Each run compiles its own pattern set from the configuration, so the same
/// amputer may be reused with different data.
#[derive(Debug, Clone, Default)]
pub struct Amputer {
    config: AmputerConfig,
}

impl Amputer {
    pub fn new(config: AmputerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AmputerConfig {
        &self.config
    }

    /// Compile and validate the configuration against `data` without sampling.
    pub fn prepare(&self, data: &Dataset) -> Result<ValidatedPatterns> {
        check_dataset_shape(data)?;
        let draft = compile(
            &self.config.patterns,
            data.n_cols(),
            &data.column_index(),
            self.config.seed,
        )?;
        let mut validated = validate_and_default(draft, &self.config)?;
        let data_advisories = validate_dataset(&validated.patterns, data)?;
        validated.advisories.extend(data_advisories);
        Ok(validated)
    }

    /// Return a copy of `data` with missing values injected.
    pub fn run(&self, data: &Dataset) -> Result<Dataset> {
        self.run_with_report(data).map(|(output, _)| output)
    }

    /// Alias of [`Amputer::run`].
    pub fn fit_transform(&self, data: &Dataset) -> Result<Dataset> {
        self.run(data)
    }

    /// Like [`Amputer::run`], also returning what happened per pattern.
    pub fn run_with_report(&self, data: &Dataset) -> Result<(Dataset, AmputationReport)> {
        let validated = self.prepare(data)?;
        let patterns = &validated.patterns;
        let settings = SearchSettings::from(&self.config);
        let seed = self.config.seed;

        let assignment = assign_groups(data.n_rows(), &patterns.freqs, seed)?;
        let mut output = data.clone();
        let mut reports = Vec::with_capacity(patterns.n_patterns());

        for idx in 0..patterns.n_patterns() {
            let rows = group_members(&assignment, idx);
            let amputed_columns = patterns.amputed_columns(idx);
            let mut report = PatternReport {
                index: idx,
                mechanism: patterns.mechanisms[idx],
                score_to_probability: patterns.score_to_probability[idx].name(),
                freq: patterns.freqs[idx],
                amputed_columns: amputed_columns.iter().map(|&c| data.column_name(c)).collect(),
                weights: patterns.weights[idx].clone(),
                group_size: rows.len(),
                amputed_rows: 0,
                calibration: None,
            };

            if rows.is_empty() {
                debug!(pattern = idx, "No samples assigned to pattern, skipping");
                reports.push(report);
                continue;
            }

            let scores = weighted_sum_scores(data, &rows, &patterns.weights[idx], self.config.std)?;
            let uniform = match self.config.uniform_probability {
                UniformProbability::TargetProportion => validated.prop,
                UniformProbability::PatternFrequency => patterns.freqs[idx],
            };
            let calibration = calibrate(
                &scores,
                &patterns.score_to_probability[idx],
                validated.prop,
                uniform,
                &settings,
                idx,
            )?;
            let selected = draw_selection(&calibration.probabilities, seed, idx)?;

            for (&row, chosen) in rows.iter().zip(selected) {
                if chosen {
                    for &col in &amputed_columns {
                        output.set_missing(row, col);
                    }
                    report.amputed_rows += 1;
                }
            }

            info!(
                pattern = idx,
                mechanism = %report.mechanism,
                group_size = report.group_size,
                amputed_rows = report.amputed_rows,
                "Applied missingness pattern"
            );
            report.calibration = Some(calibration.outcome);
            reports.push(report);
        }

        let profile = MissingnessProfile::from_dataset(&output);
        profile.log();

        let report = AmputationReport {
            schema_version: SCHEMA_VERSION.to_string(),
            seed,
            prop: validated.prop,
            n_samples: data.n_rows(),
            n_features: data.n_cols(),
            patterns: reports,
            advisories: validated.advisories,
            profile,
        };
        Ok((output, report))
    }
}
