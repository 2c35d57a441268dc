//! Error types for clock operations

use thiserror::Error;

/// Errors surfaced to the UI by clock, group and session operations.
///
/// Out-of-range fills (clicking past full, unfilling below zero, clicking an
/// inactive linked dial) are not errors; those operations report a no-op.
#[derive(Error, Debug)]
pub enum ClockError {
    /// Operation not allowed in the current state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Session data that cannot be repaired
    #[error("Corrupt session: {0}")]
    CorruptSession(String),

    /// Countdown text that does not parse or is too long
    #[error("Invalid timer text '{0}': expected SS, MM:SS or HH:MM:SS up to 999:59:59")]
    InvalidTimerText(String),

    /// File system error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClockError {
    pub(crate) fn invalid_state(reason: impl Into<String>) -> Self {
        Self::InvalidState(reason.into())
    }

    pub(crate) fn corrupt(reason: impl Into<String>) -> Self {
        Self::CorruptSession(reason.into())
    }
}
