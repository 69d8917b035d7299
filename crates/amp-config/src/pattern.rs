//! Missing-data pattern specifications.
//!
//! A [`PatternSpec`] is the declarative, partially-optional description of one
//! pattern. The engine compiles a list of them into fixed-shape matrices; this
//! module only describes and parses them.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use amp_common::Error;
use amp_math::SigmoidCutoff;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Reference to a dataset column, by position or by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnRef {
    Index(i64),
    Name(String),
}

impl ColumnRef {
    pub fn is_name(&self) -> bool {
        matches!(self, ColumnRef::Name(_))
    }
}

impl From<usize> for ColumnRef {
    fn from(value: usize) -> Self {
        ColumnRef::Index(value as i64)
    }
}

impl From<i64> for ColumnRef {
    fn from(value: i64) -> Self {
        ColumnRef::Index(value)
    }
}

impl From<i32> for ColumnRef {
    fn from(value: i32) -> Self {
        ColumnRef::Index(i64::from(value))
    }
}

impl From<&str> for ColumnRef {
    fn from(value: &str) -> Self {
        ColumnRef::Name(value.to_string())
    }
}

impl From<String> for ColumnRef {
    fn from(value: String) -> Self {
        ColumnRef::Name(value)
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnRef::Index(i) => write!(f, "{}", i),
            ColumnRef::Name(n) => write!(f, "{}", n),
        }
    }
}

/// Per-feature effect sizes on the missingness score.
///
/// In JSON, an array is `Dense` and an object is `ByColumn`; object keys that
/// parse as integers are column indices, all other keys are column names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "WeightsRepr", into = "WeightsRepr")]
pub enum Weights {
    /// One weight per dataset column, in column order.
    Dense(Vec<f64>),
    /// Weights for the listed columns; unlisted columns weigh 0.
    ByColumn(Vec<(ColumnRef, f64)>),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum WeightsRepr {
    Dense(Vec<f64>),
    Map(BTreeMap<String, f64>),
}

impl From<WeightsRepr> for Weights {
    fn from(repr: WeightsRepr) -> Self {
        match repr {
            WeightsRepr::Dense(values) => Weights::Dense(values),
            WeightsRepr::Map(map) => Weights::ByColumn(
                map.into_iter()
                    .map(|(key, w)| match key.trim().parse::<i64>() {
                        Ok(idx) => (ColumnRef::Index(idx), w),
                        Err(_) => (ColumnRef::Name(key), w),
                    })
                    .collect(),
            ),
        }
    }
}

impl From<Weights> for WeightsRepr {
    fn from(weights: Weights) -> Self {
        match weights {
            Weights::Dense(values) => WeightsRepr::Dense(values),
            Weights::ByColumn(entries) => WeightsRepr::Map(
                entries
                    .into_iter()
                    .map(|(col, w)| (col.to_string(), w))
                    .collect(),
            ),
        }
    }
}

/// Missingness mechanism of a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Mechanism {
    /// Missing completely at random.
    Mcar,
    /// Missing at random: depends on observed features only.
    #[default]
    Mar,
    /// Missing not at random: depends on the amputed features only.
    Mnar,
    /// Custom mixture of observed and amputed features; needs explicit weights.
    MarMnar,
}

impl Mechanism {
    pub const ALL: [Mechanism; 4] = [
        Mechanism::Mcar,
        Mechanism::Mar,
        Mechanism::Mnar,
        Mechanism::MarMnar,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Mechanism::Mcar => "MCAR",
            Mechanism::Mar => "MAR",
            Mechanism::Mnar => "MNAR",
            Mechanism::MarMnar => "MAR+MNAR",
        }
    }
}

impl fmt::Display for Mechanism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mechanism {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MCAR" => Ok(Mechanism::Mcar),
            "MAR" => Ok(Mechanism::Mar),
            "MNAR" => Ok(Mechanism::Mnar),
            "MAR+MNAR" => Ok(Mechanism::MarMnar),
            _ => Err(Error::InvalidMechanism(s.to_string())),
        }
    }
}

impl TryFrom<String> for Mechanism {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Mechanism> for String {
    fn from(value: Mechanism) -> Self {
        value.name().to_string()
    }
}

type TransformFn = dyn Fn(&[f64], f64) -> Vec<f64> + Send + Sync;

/// User-supplied score-to-probability function.
///
/// Receives the standardized scores of one pattern group and the current
/// shift, and returns one probability per score. The bisection assumes the
/// mean output does not decrease as the shift grows.
#[derive(Clone)]
pub struct CustomTransform {
    label: String,
    func: Arc<TransformFn>,
}

impl CustomTransform {
    pub fn new<F>(label: impl Into<String>, func: F) -> Self
    where
        F: Fn(&[f64], f64) -> Vec<f64> + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            func: Arc::new(func),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn call(&self, scores: &[f64], shift: f64) -> Vec<f64> {
        (self.func)(scores, shift)
    }
}

impl fmt::Debug for CustomTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomTransform")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

impl PartialEq for CustomTransform {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

/// Score-to-probability function of a pattern.
#[derive(Debug, Clone, PartialEq)]
pub enum ScoreToProbability {
    Named(SigmoidCutoff),
    Custom(CustomTransform),
}

impl Default for ScoreToProbability {
    fn default() -> Self {
        ScoreToProbability::Named(SigmoidCutoff::Right)
    }
}

impl ScoreToProbability {
    pub fn custom<F>(label: impl Into<String>, func: F) -> Self
    where
        F: Fn(&[f64], f64) -> Vec<f64> + Send + Sync + 'static,
    {
        ScoreToProbability::Custom(CustomTransform::new(label, func))
    }

    /// Probability per standardized score at the given shift.
    pub fn probabilities(&self, scores: &[f64], shift: f64) -> Vec<f64> {
        match self {
            ScoreToProbability::Named(cutoff) => cutoff.probabilities(scores, shift),
            ScoreToProbability::Custom(custom) => custom.call(scores, shift),
        }
    }

    /// Display name: the canonical cutoff name or `custom:<label>`.
    pub fn name(&self) -> String {
        match self {
            ScoreToProbability::Named(cutoff) => cutoff.name().to_string(),
            ScoreToProbability::Custom(custom) => format!("custom:{}", custom.label()),
        }
    }
}

impl From<SigmoidCutoff> for ScoreToProbability {
    fn from(value: SigmoidCutoff) -> Self {
        ScoreToProbability::Named(value)
    }
}

impl FromStr for ScoreToProbability {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<SigmoidCutoff>()
            .map(ScoreToProbability::Named)
            .map_err(|_| Error::InvalidTransform(s.to_string()))
    }
}

impl Serialize for ScoreToProbability {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name())
    }
}

impl<'de> Deserialize<'de> for ScoreToProbability {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// One declarative missingness pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatternSpec {
    /// Columns amputed together when this pattern applies.
    pub incomplete_vars: Vec<ColumnRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights: Option<Weights>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mechanism: Option<Mechanism>,

    /// Relative occurrence among patterns; all patterns or none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub freq: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_to_probability_func: Option<ScoreToProbability>,
}

impl PatternSpec {
    pub fn new<I, C>(incomplete_vars: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<ColumnRef>,
    {
        Self {
            incomplete_vars: incomplete_vars.into_iter().map(Into::into).collect(),
            weights: None,
            mechanism: None,
            freq: None,
            score_to_probability_func: None,
        }
    }

    pub fn with_mechanism(mut self, mechanism: Mechanism) -> Self {
        self.mechanism = Some(mechanism);
        self
    }

    pub fn with_freq(mut self, freq: f64) -> Self {
        self.freq = Some(freq);
        self
    }

    pub fn with_weights(mut self, weights: Weights) -> Self {
        self.weights = Some(weights);
        self
    }

    /// Dense weights, one per column.
    pub fn with_dense_weights(self, weights: Vec<f64>) -> Self {
        self.with_weights(Weights::Dense(weights))
    }

    /// Sparse weights for the listed columns.
    pub fn with_column_weights<I, C>(self, weights: I) -> Self
    where
        I: IntoIterator<Item = (C, f64)>,
        C: Into<ColumnRef>,
    {
        self.with_weights(Weights::ByColumn(
            weights.into_iter().map(|(c, w)| (c.into(), w)).collect(),
        ))
    }

    pub fn with_transform(mut self, transform: impl Into<ScoreToProbability>) -> Self {
        self.score_to_probability_func = Some(transform.into());
        self
    }
}
