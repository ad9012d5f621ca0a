//! Crate error type

use thiserror::Error;

/// Errors surfaced by configuration, settings and presentation sinks.
///
/// Normal play never produces one of these: claims on missing items, spawns
/// into a full grid and stale timers are silent no-ops.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("unknown difficulty: {0:?} (expected easy, normal or hard)")]
    UnknownDifficulty(String),
    #[error("invalid round config: {0}")]
    InvalidConfig(String),
    #[error("invalid settings: {0}")]
    InvalidSettings(#[from] serde_json::Error),
    #[error("presentation sink failed: {0}")]
    Sink(String),
}

pub type Result<T> = std::result::Result<T, GameError>;
