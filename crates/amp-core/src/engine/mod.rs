//! Amputation engine.
//!
//! Pipeline per run: compile pattern specs → default + validate → assign
//! samples to patterns → per pattern: score, calibrate, draw, write back.

pub mod amputer;
pub mod calibrate;
pub mod compile;
pub mod sampler;
pub mod score;
pub mod validate;

pub use amputer::{AmputationReport, Amputer, PatternReport};
pub use calibrate::{calibrate, Calibration, CalibrationMethod, CalibrationOutcome, SearchSettings};
pub use compile::{compile, default_patterns, PatternDraft};
pub use score::weighted_sum_scores;
pub use validate::{validate_and_default, validate_dataset, Advisory, CompiledPatternSet, ValidatedPatterns};
