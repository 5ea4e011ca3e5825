//! Error types for the tuning layer.

use thiserror::Error;

/// Failures reported by tuning-session operations.
///
/// Every variant leaves the session's committed state untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TuningError {
    /// An open/close/tune/switch hook on the hardware failed.
    #[error("Tuning hardware unavailable: {0}")]
    HardwareUnavailable(String),

    /// Input name or id is not in the registry.
    #[error("Unknown input: {0}")]
    UnknownInput(String),

    /// Channel id or number is not in the current input's lineup.
    #[error("Unknown channel: {0}")]
    UnknownChannel(String),

    /// Favorite navigation was requested but no channel is a favorite.
    #[error("No favorite channel on this input")]
    NoFavorite,

    /// The external channel changer did not accept the change.
    #[error("External channel changer unresponsive: {0}")]
    ChangerUnresponsive(String),

    /// The session must be opened before tuning.
    #[error("Tuning session is not open")]
    NotOpen,

    /// No inputs are configured for the card; the hardware is unusable.
    #[error("No inputs configured for card {0}")]
    NoInputs(u32),

    /// The hardware family does not implement this operation.
    #[error("Operation not supported: {0}")]
    Unsupported(&'static str),

    /// The persistence gateway rejected a write.
    #[error("Store error: {0}")]
    Store(String),
}

impl TuningError {
    /// Returns true if retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            TuningError::HardwareUnavailable(_) | TuningError::ChangerUnresponsive(_)
        )
    }
}

/// Errors raised by an external-changer transport.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChangerError {
    /// The changer could not be started or reached.
    #[error("Failed to reach changer {changer}: {reason}")]
    Unreachable { changer: String, reason: String },

    /// The changer ran but reported failure.
    #[error("Changer {changer} rejected channel {channum} (status {status:?})")]
    Rejected {
        changer: String,
        channum: String,
        status: Option<i32>,
    },

    /// The changer is busy with another request.
    #[error("Changer {0} is busy")]
    Busy(String),
}

impl From<ChangerError> for TuningError {
    fn from(value: ChangerError) -> Self {
        TuningError::ChangerUnresponsive(value.to_string())
    }
}
