//! Core math modules.

pub mod sigmoid;
pub mod stats;
