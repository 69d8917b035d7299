//! Multivariate amputation engine.
//!
//! Generates missing values in complete datasets under MCAR, MAR, MNAR and
//! MAR+MNAR mechanisms, with per-pattern score transforms calibrated to a
//! target proportion of incomplete rows.

pub mod cli;
pub mod engine;
pub mod exit_codes;
pub mod io;
pub mod profile;

pub use engine::{AmputationReport, Amputer, PatternReport};
pub use exit_codes::ExitCode;
pub use profile::MissingnessProfile;
