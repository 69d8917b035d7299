//! Amputation configuration loading and parsing.
//!
//! This crate provides:
//! - Typed Rust records for the amputer options and per-pattern specs
//! - Closed enumerations for mechanisms and score-to-probability functions
//! - JSON loading with defaults and strict key checking

pub mod amputer;
pub mod pattern;
pub mod resolve;

pub use amputer::{AmputerConfig, UniformProbability};
pub use pattern::{ColumnRef, CustomTransform, Mechanism, PatternSpec, ScoreToProbability, Weights};
pub use resolve::{load_config, resolve_config, ConfigSource, CONFIG_ENV_VAR};
