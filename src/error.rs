//! Boundary error types
//!
//! Gameplay rejections (no ammo, wrong phase) are reported as events, not
//! errors. These types cover data arriving from outside the simulation.

use thiserror::Error;

/// Reasons an external terrain config is rejected before it touches the grid
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TerrainConfigError {
    #[error("terrain config has no heights")]
    MissingHeights,
    #[error("expected {expected} heights, found {found}")]
    HeightCount { expected: usize, found: usize },
    #[error("height at column {column} is not a finite number")]
    NonFiniteHeight { column: usize },
    #[error("height {value} at column {column} is not a whole row between the sky and the water line")]
    HeightOutOfRange { column: usize, value: f32 },
    #[error("modification {index} lies outside the world")]
    ModificationOutOfRange { index: usize },
    #[error("modification {index} has a non-positive size")]
    DegenerateModification { index: usize },
    #[error("unknown terrain theme '{0}'")]
    UnknownTheme(String),
    #[error("malformed terrain config: {0}")]
    Malformed(String),
    #[error("terrain can only be loaded before the match starts")]
    MatchInProgress,
}

/// JSON file load/save failures (settings, match log)
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to read or write file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
