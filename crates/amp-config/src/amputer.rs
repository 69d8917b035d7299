//! Amputer options.
//!
//! These are the constructor-time settings of one amputation engine. Every
//! field has a default, so an empty JSON object is a valid configuration.

use amp_common::Error;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::pattern::PatternSpec;

/// Where the uniform probability comes from when a group's scores are all zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UniformProbability {
    /// Every sample of the group gets that pattern's `freq`.
    #[default]
    PatternFrequency,
    /// Every sample of the group gets the target proportion `prop`.
    TargetProportion,
}

/// Complete amputer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AmputerConfig {
    /// Target proportion of amputed samples, as a decimal or a percentage.
    pub prop: f64,

    /// Ordered patterns; empty means one synthesized default pattern.
    pub patterns: Vec<PatternSpec>,

    /// Standardize scored columns within each pattern group.
    pub std: bool,

    /// Lower end of the shift search bracket.
    pub lower_range: f64,

    /// Upper end of the shift search bracket.
    pub upper_range: f64,

    /// Allowed gap between the calibrated mean probability and `prop`.
    pub max_dif_with_target: f64,

    /// Bisection iteration cap.
    pub max_iter: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    pub uniform_probability: UniformProbability,
}

impl Default for AmputerConfig {
    fn default() -> Self {
        Self {
            prop: 0.5,
            patterns: Vec::new(),
            std: true,
            lower_range: -3.0,
            upper_range: 3.0,
            max_dif_with_target: 0.001,
            max_iter: 100,
            seed: None,
            uniform_probability: UniformProbability::default(),
        }
    }
}

impl AmputerConfig {
    pub fn new(prop: f64, patterns: Vec<PatternSpec>) -> Self {
        Self {
            prop,
            patterns,
            ..Default::default()
        }
    }

    /// Parse a JSON document, filling unspecified options with defaults.
    ///
    /// Patterns are decoded one at a time so a bad entry is reported as
    /// [`Error::MalformedPattern`] with its index.
    pub fn from_json_str(raw: &str) -> amp_common::Result<Self> {
        let mut doc: Value = serde_json::from_str(raw)?;
        let patterns = match doc.as_object_mut().and_then(|o| o.remove("patterns")) {
            None => None,
            Some(Value::Array(items)) => Some(
                items
                    .into_iter()
                    .enumerate()
                    .map(|(idx, item)| {
                        serde_json::from_value::<PatternSpec>(item).map_err(|e| {
                            Error::MalformedPattern {
                                pattern: idx,
                                reason: e.to_string(),
                            }
                        })
                    })
                    .collect::<amp_common::Result<Vec<_>>>()?,
            ),
            Some(other) => {
                return Err(Error::Config(format!(
                    "`patterns` must be a list, got {}",
                    other
                )))
            }
        };
        let mut config: Self = serde_json::from_value(doc)?;
        if let Some(patterns) = patterns {
            config.patterns = patterns;
        }
        Ok(config)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_prop(mut self, prop: f64) -> Self {
        self.prop = prop;
        self
    }

    pub fn with_patterns(mut self, patterns: Vec<PatternSpec>) -> Self {
        self.patterns = patterns;
        self
    }

    pub fn with_std(mut self, std: bool) -> Self {
        self.std = std;
        self
    }

    pub fn with_search_range(mut self, lower: f64, upper: f64) -> Self {
        self.lower_range = lower;
        self.upper_range = upper;
        self
    }

    pub fn with_tolerance(mut self, max_dif_with_target: f64) -> Self {
        self.max_dif_with_target = max_dif_with_target;
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_uniform_probability(mut self, source: UniformProbability) -> Self {
        self.uniform_probability = source;
        self
    }
}
