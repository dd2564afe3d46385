//! Engine error types.
//!
//! Only two classes of error escalate out of a cycle: configuration errors
//! (unresolvable target group, missing selectors) and roster fetch errors.
//! Everything else — probe failures, individual operation failures,
//! verification failures, observation degradation — is absorbed into the
//! cycle report and surfaced through logs.

use thiserror::Error;

use rostersync_directory::DirectoryError;
use rostersync_roster::RosterError;

/// Error that aborts a reconciliation cycle for a scope.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine is misconfigured for this scope.
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// The roster could not be fetched; no partial roster is processed.
    #[error(transparent)]
    Roster(#[from] RosterError),

    /// A directory call required to even start the cycle failed.
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

impl EngineError {
    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        EngineError::Configuration {
            message: message.into(),
        }
    }
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
