//! Amputation common types and errors.
//!
//! This crate provides foundational types shared across the amp-* crates:
//! - The tabular `Dataset` model with missing-value markers
//! - Common error types and their stable codes
//! - Report schema versioning

pub mod dataset;
pub mod error;
pub mod schema;

pub use dataset::{Cell, Dataset};
pub use error::{Error, Result};
pub use schema::SCHEMA_VERSION;
