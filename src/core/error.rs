//! Error types for terrain configuration validation
//!
//! Generation itself is pure computation over owned buffers and cannot
//! fail; every error here is a configuration problem that must be
//! surfaced before any streaming or generation starts.

use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("detail levels must not be empty")]
    EmptyDetailLevels,

    #[error("detail level {index}: lod {lod} exceeds the supported maximum of {max}")]
    UnsupportedLod { index: usize, lod: u32, max: u32 },

    #[error(
        "detail level {index}: visible distance {distance} does not increase over previous {previous}"
    )]
    NonIncreasingDistance {
        index: usize,
        distance: f32,
        previous: f32,
    },

    #[error("collider lod index {index} is out of range for {levels} detail levels")]
    ColliderIndexOutOfRange { index: usize, levels: usize },

    #[error("chunk size index {index} is out of range for {supported} supported sizes")]
    ChunkSizeIndexOutOfRange { index: usize, supported: usize },

    #[error("chunk size {size} is not divisible by the lod {lod} increment {increment}")]
    IndivisibleChunkSize { size: u32, lod: u32, increment: u32 },

    #[error("height curve must have at least one key")]
    EmptyHeightCurve,
}
