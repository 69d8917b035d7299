//! Amputation math utilities.

pub mod math;

pub use math::sigmoid::*;
pub use math::stats::*;
