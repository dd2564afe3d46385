//! Directory client error types
//!
//! Error definitions with transient/permanent classification. Transient
//! errors are worth reattempting on the next reconciliation cycle; permanent
//! errors require configuration or operator intervention.

use thiserror::Error;

use crate::ids::{ScopeId, UserId};

/// Error that can occur during directory operations.
#[derive(Debug, Error)]
pub enum DirectoryError {
    // Connection errors (usually transient)
    /// Failed to establish a connection to the directory.
    #[error("connection failed: {message}")]
    ConnectionFailed {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Call timed out.
    #[error("directory call timed out")]
    Timeout,

    /// Directory is temporarily unavailable.
    #[error("directory unavailable: {message}")]
    Unavailable { message: String },

    /// Network error during communication.
    #[error("network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // Authorization errors (permanent)
    /// Credentials were rejected.
    #[error("authentication failed: invalid credentials")]
    AuthenticationFailed,

    /// Insufficient permissions for the operation.
    #[error("permission denied for {operation}")]
    PermissionDenied { operation: String },

    // Lookup errors
    /// Target group could not be resolved in the scope.
    #[error("group not found in scope {scope_id}")]
    GroupNotFound { scope_id: ScopeId },

    /// Member does not exist in the scope.
    #[error("member {user_id} not found in scope {scope_id}")]
    MemberNotFound { scope_id: ScopeId, user_id: UserId },

    // Operation errors
    /// A mutation or query failed.
    #[error("operation failed: {message}")]
    OperationFailed {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Response from the directory could not be interpreted.
    #[error("invalid response: {message}")]
    InvalidResponse { message: String },
}

impl DirectoryError {
    /// Check if this error is transient and a later cycle may succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DirectoryError::ConnectionFailed { .. }
                | DirectoryError::Timeout
                | DirectoryError::Unavailable { .. }
                | DirectoryError::Network { .. }
        )
    }

    /// Check if this error is permanent and retry will not help.
    #[must_use]
    pub fn is_permanent(&self) -> bool {
        !self.is_transient()
    }

    // Convenience constructors

    /// Create a connection failed error.
    pub fn connection_failed(message: impl Into<String>) -> Self {
        DirectoryError::ConnectionFailed {
            message: message.into(),
            source: None,
        }
    }

    /// Create a connection failed error with source.
    pub fn connection_failed_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        DirectoryError::ConnectionFailed {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        DirectoryError::Network {
            message: message.into(),
            source: None,
        }
    }

    /// Create a network error with source.
    pub fn network_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        DirectoryError::Network {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an operation failed error.
    pub fn operation_failed(message: impl Into<String>) -> Self {
        DirectoryError::OperationFailed {
            message: message.into(),
            source: None,
        }
    }

    /// Create an invalid response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        DirectoryError::InvalidResponse {
            message: message.into(),
        }
    }
}

/// Result type for directory operations.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_errors() {
        let transient = vec![
            DirectoryError::connection_failed("boom"),
            DirectoryError::Timeout,
            DirectoryError::Unavailable {
                message: "maintenance".to_string(),
            },
            DirectoryError::network("reset"),
        ];
        for err in transient {
            assert!(err.is_transient(), "expected {err} to be transient");
            assert!(!err.is_permanent());
        }
    }

    #[test]
    fn permanent_errors() {
        let permanent = vec![
            DirectoryError::AuthenticationFailed,
            DirectoryError::PermissionDenied {
                operation: "ban".to_string(),
            },
            DirectoryError::GroupNotFound {
                scope_id: ScopeId::new("s1"),
            },
            DirectoryError::operation_failed("rejected"),
        ];
        for err in permanent {
            assert!(err.is_permanent(), "expected {err} to be permanent");
        }
    }

    #[test]
    fn error_display() {
        let err = DirectoryError::GroupNotFound {
            scope_id: ScopeId::new("scope-1"),
        };
        assert_eq!(err.to_string(), "group not found in scope scope-1");
    }
}
