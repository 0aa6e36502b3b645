//! Data models

pub mod rule;
pub mod analysis;

pub use rule::*;
pub use analysis::*;
