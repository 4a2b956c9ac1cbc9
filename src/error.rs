//! Error types for release publishing operations.
//!
//! This module defines the transport taxonomy returned by the release service
//! and the crate-level error type, with actionable messages and recovery
//! suggestions.

use thiserror::Error;

/// Result type alias for release publishing operations
pub type Result<T> = std::result::Result<T, ReleaseError>;

/// Main error type for all crate operations outside the pipeline boundary
#[derive(Error, Debug)]
pub enum ReleaseError {
    /// Release service errors
    #[error("Release service error: {0}")]
    Service(#[from] ServiceError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Input gathering errors with context
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

/// Failures reported by a [`ReleaseService`](crate::github::ReleaseService) call.
///
/// Only [`ServiceError::Transport`] is ever retried, and only for the draft
/// creation and publish stages.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Credentials missing or rejected
    #[error("authentication failed: {reason}")]
    Authentication {
        /// Reason reported by the service, or why no credentials were sent
        reason: String,
    },

    /// The tag is already used by another release
    #[error("tag '{tag}' already exists")]
    Conflict {
        /// Conflicting tag name
        tag: String,
    },

    /// Size, count or rate limit exceeded
    #[error("quota exceeded")]
    Quota {
        /// Detail reported by the service
        detail: String,
    },

    /// Network failure, timeout or server-side error
    #[error("transport error: {reason}")]
    Transport {
        /// Reason for the error
        reason: String,
    },

    /// The release no longer exists
    #[error("release {remote_id} not found")]
    NotFound {
        /// Identifier that could not be resolved
        remote_id: String,
    },

    /// Any other client error returned by the service
    #[error("request rejected ({status}): {message}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Message reported by the service
        message: String,
    },

    /// Local artifact content could not be read
    #[error("cannot read artifact '{name}': {reason}")]
    Unreadable {
        /// Artifact display name
        name: String,
        /// Reason for the error
        reason: String,
    },
}

impl ServiceError {
    /// Whether a bounded retry may be attempted for this error
    pub fn is_transient(&self) -> bool {
        matches!(self, ServiceError::Transport { .. })
    }

    /// Shorthand for a transport failure
    pub fn transport(reason: impl Into<String>) -> Self {
        ServiceError::Transport {
            reason: reason.into(),
        }
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            ServiceError::transport(format!("request timed out: {error}"))
        } else {
            ServiceError::transport(error.to_string())
        }
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Repository identity could not be determined
    #[error("Invalid repository '{value}'. Expected: owner/repo")]
    InvalidRepository {
        /// Value that failed to parse
        value: String,
    },

    /// Repository identity missing entirely
    #[error("No repository configured. Use --repo owner/repo or set GITHUB_REPOSITORY")]
    MissingRepository,

    /// Retry settings out of range
    #[error("Invalid retry configuration: {reason}")]
    InvalidRetry {
        /// Reason for the error
        reason: String,
    },

    /// HTTP client could not be built
    #[error("Failed to build HTTP client: {reason}")]
    HttpClient {
        /// Reason for the error
        reason: String,
    },
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },
}

impl ReleaseError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            ReleaseError::Service(ServiceError::Authentication { .. }) => vec![
                "Set GH_TOKEN or GITHUB_TOKEN, or pass --token".to_string(),
                "Verify the token has 'contents: write' permission on the repository".to_string(),
            ],
            ReleaseError::Service(ServiceError::Conflict { tag }) => vec![
                format!("Choose a new tag; '{}' is already released", tag),
                "Delete the existing release on the service if it was created by mistake"
                    .to_string(),
            ],
            ReleaseError::Service(ServiceError::NotFound { .. }) => vec![
                "Check the release id; the release may have been deleted".to_string(),
            ],
            ReleaseError::Config(ConfigError::MissingRepository)
            | ReleaseError::Config(ConfigError::InvalidRepository { .. }) => vec![
                "Pass --repo owner/repo".to_string(),
                "Or export GITHUB_REPOSITORY=owner/repo".to_string(),
            ],
            ReleaseError::Cli(CliError::InvalidArguments { .. }) => vec![
                "Run with --help to see the accepted arguments".to_string(),
            ],
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }

    /// Check if this error is recoverable by simply trying again
    pub fn is_recoverable(&self) -> bool {
        match self {
            ReleaseError::Service(e) => e.is_transient(),
            ReleaseError::Io(_) => true,
            _ => false,
        }
    }
}
