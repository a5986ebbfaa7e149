//! Error types

use thiserror::Error;

/// Errors from grid queries and placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("cell ({row}, {col}) is outside the grid")]
    OutOfBounds { row: i32, col: i32 },
    #[error("cell ({row}, {col}) is already occupied")]
    OccupiedCell { row: i32, col: i32 },
    #[error("no free cell next to ({row}, {col})")]
    NoFreeNeighbor { row: i32, col: i32 },
}

/// Errors from loading or validating a [`crate::GameConfig`]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}
