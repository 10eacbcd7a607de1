//! Recoverable error types
//!
//! Fatal internal failures (a singular orientation matrix) panic instead.

use thiserror::Error;

/// Why a command was not started
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("another animation is still running")]
    AnimationActive,

    #[error("the game is over; import a puzzle to play again")]
    GameOver,
}

/// Unrecognised turn axis name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown axis '{0}' (expected x, y or z with an optional sign)")]
pub struct ParseAxisError(pub String);

/// Failures reading or writing length-delimited records
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("record I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("record payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("record frame of {len} bytes exceeds the {max} byte limit")]
    FrameTooLarge { len: u64, max: u64 },

    #[error("stream ended inside a length prefix")]
    TruncatedLength,
}
