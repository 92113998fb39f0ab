//! CLI command implementations

pub mod adapt;
pub mod error;
