//! Core types and utilities

pub mod error;
pub mod logging;
pub mod types;

pub use error::ConfigError;
pub use types::*;
