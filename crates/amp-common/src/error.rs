//! Error types for the amputation engine.

use thiserror::Error;

/// Result type alias for amputation operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for amputation.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-29)
    #[error("configuration error: {0}")]
    Config(String),

    #[error("pattern {pattern} is malformed: {reason}")]
    MalformedPattern { pattern: usize, reason: String },

    #[error("pattern {pattern}: `{field}` mixes column names and column indices")]
    MixedColumnRefs { pattern: usize, field: &'static str },

    #[error("pattern {pattern}: column `{name}` is not a column in the provided data")]
    UnknownColumn { pattern: usize, name: String },

    #[error("pattern {pattern}: column index {index} is outside 0..{columns}")]
    IndexOutOfRange {
        pattern: usize,
        index: i64,
        columns: usize,
    },

    #[error("pattern {pattern}: lists {listed} columns but the data only has {columns}")]
    TooManyColumns {
        pattern: usize,
        listed: usize,
        columns: usize,
    },

    #[error("pattern {pattern}: weights must cover all {expected} columns, got {actual}")]
    WeightLength {
        pattern: usize,
        expected: usize,
        actual: usize,
    },

    #[error("either specify a freq for all patterns or for none (equal frequency 1/k)")]
    PartialFrequencies,

    #[error("invalid frequencies: {0}")]
    InvalidFrequencies(String),

    #[error("proportion of missingness must be in [0, 1] or (1, 100] as a percentage, got {0}")]
    InvalidProportion(f64),

    #[error("unknown mechanism `{0}` (expected one of MCAR, MAR, MNAR, MAR+MNAR)")]
    InvalidMechanism(String),

    #[error("unknown score-to-probability function `{0}` (expected one of SIGMOID-RIGHT, SIGMOID-LEFT, SIGMOID-MID, SIGMOID-TAIL)")]
    InvalidTransform(String),

    #[error("pattern {pattern}: MAR+MNAR requires a custom weights specification")]
    MissingCustomWeights { pattern: usize },

    #[error("invalid observed-variable indicator: {0}")]
    InvalidIndicator(String),

    #[error("invalid weights: {0}")]
    InvalidWeights(String),

    #[error("invalid search settings: {0}")]
    InvalidSearch(String),

    // Data errors (30-39)
    #[error("dataset must contain at least two columns, got {columns}")]
    DatasetTooSmall { columns: usize },

    #[error("feature `{column}` is involved in amputation but contains missing values")]
    IncompleteFeature { column: String },

    #[error("feature `{column}` is involved in amputation but row {row} is not numeric: {value:?}")]
    NonNumericFeature {
        column: String,
        row: usize,
        value: String,
    },

    #[error("feature `{column}` is involved in amputation but row {row} holds non-finite value {value}")]
    NonFiniteFeature {
        column: String,
        row: usize,
        value: f64,
    },

    #[error("row {row} has {actual} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("dataset error: {0}")]
    Dataset(String),

    // Numeric errors (40-49)
    #[error("pattern {pattern}: score-to-probability function produced invalid probability {value}")]
    InvalidProbability { pattern: usize, value: f64 },

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error code for this error type.
    /// Used for detailed error reporting in JSON output.
    pub fn code(&self) -> u32 {
        match self {
            Error::Config(_) => 10,
            Error::MalformedPattern { .. } => 11,
            Error::MixedColumnRefs { .. } => 12,
            Error::UnknownColumn { .. } => 13,
            Error::IndexOutOfRange { .. } => 14,
            Error::TooManyColumns { .. } => 15,
            Error::WeightLength { .. } => 16,
            Error::PartialFrequencies => 17,
            Error::InvalidFrequencies(_) => 18,
            Error::InvalidProportion(_) => 19,
            Error::InvalidMechanism(_) => 20,
            Error::InvalidTransform(_) => 21,
            Error::MissingCustomWeights { .. } => 22,
            Error::InvalidIndicator(_) => 23,
            Error::InvalidWeights(_) => 24,
            Error::InvalidSearch(_) => 25,
            Error::DatasetTooSmall { .. } => 30,
            Error::IncompleteFeature { .. } => 31,
            Error::NonNumericFeature { .. } => 32,
            Error::RaggedRow { .. } => 33,
            Error::Dataset(_) => 34,
            Error::NonFiniteFeature { .. } => 35,
            Error::InvalidProbability { .. } => 40,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }

    /// True for errors caused by the amputation configuration itself.
    pub fn is_config(&self) -> bool {
        (10..30).contains(&self.code())
    }

    /// True for errors caused by the contents or shape of the dataset.
    pub fn is_data(&self) -> bool {
        (30..40).contains(&self.code())
    }
}
