//! Roster ingestion error types.

use thiserror::Error;

/// Error that can occur while obtaining the roster document.
///
/// Any fetch failure aborts the whole cycle for the scope; no partial
/// roster is ever classified.
#[derive(Debug, Error)]
pub enum RosterError {
    /// No roster source has been configured.
    #[error("roster source not configured")]
    NotConfigured,

    /// The roster URL could not be parsed.
    #[error("invalid roster url: {message}")]
    InvalidUrl { message: String },

    /// Transport-level fetch failure.
    #[error("roster fetch failed: {message}")]
    Fetch {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The roster endpoint answered with a non-success status.
    #[error("roster fetch failed: HTTP {status}")]
    Status { status: u16 },
}

impl RosterError {
    /// Create a fetch error.
    pub fn fetch(message: impl Into<String>) -> Self {
        RosterError::Fetch {
            message: message.into(),
            source: None,
        }
    }

    /// Create a fetch error with source.
    pub fn fetch_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        RosterError::Fetch {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Result type for roster operations.
pub type RosterResult<T> = Result<T, RosterError>;
