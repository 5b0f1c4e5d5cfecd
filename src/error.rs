//! Error types for placement and run control
//!
//! A wrong selection is not an error: it is an ordinary `Failed` verdict.

use thiserror::Error;

/// Why a round could not be laid out
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlacementError {
    /// The footprint does not fit inside the field at all
    #[error("footprint {footprint}px does not fit in a {width}x{height}px field")]
    InfeasibleField { footprint: u32, width: u32, height: u32 },
    /// The tokens could not all be placed without overlap
    #[error("could not place {tokens} tokens without overlap (field holds at most {capacity})")]
    PlacementExhausted { tokens: usize, capacity: usize },
}

/// Errors surfaced by a game session or its entry point
#[derive(Debug, Error)]
pub enum GameError {
    #[error("'{0}' is not a token count")]
    InvalidTokenCount(String),
    #[error("token count {count} is outside {min}..={max}")]
    TokenCountOutOfRange { count: usize, min: usize, max: usize },
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
    #[error(transparent)]
    Placement(#[from] PlacementError),
    #[error("settings are not valid JSON: {0}")]
    SettingsFormat(#[from] serde_json::Error),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
