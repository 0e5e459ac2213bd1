//! Error types for shipwright operations.
//!
//! Every failure carries a distinguishable kind so callers (the pipeline, the
//! upload retry loop, the CLI) can branch without inspecting messages.

use std::fmt;
use std::num::ParseIntError;
use thiserror::Error;

/// Result type alias for shipwright operations
pub type Result<T> = std::result::Result<T, ReleaseError>;

/// Main error type for all shipwright operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    /// Missing or invalid configuration
    #[error("Configuration error: {reason}")]
    Config {
        /// Reason for the error
        reason: String,
    },

    /// A user template failed to render
    #[error("Failed to render template '{template}': {reason}")]
    Template {
        /// Template source
        template: String,
        /// Renderer error
        reason: String,
    },

    /// No milestone with the requested title exists
    #[error("No milestone found with title '{title}'")]
    MilestoneNotFound {
        /// Milestone title that was looked up
        title: String,
    },

    /// Remote API call failed
    #[error("{context}: {source}")]
    Remote {
        /// Operation being performed
        context: String,
        /// Underlying API error
        #[source]
        source: ApiError,
    },

    /// Asset upload rejected in a way that retrying cannot fix
    #[error("Failed to upload '{name}': {source}")]
    UploadFatal {
        /// Asset name
        name: String,
        /// Underlying API error
        #[source]
        source: ApiError,
    },

    /// Asset upload failed but may succeed if attempted again
    #[error("Retriable upload failure: {source}")]
    Retriable {
        /// Underlying API error
        #[source]
        source: ApiError,
    },

    /// Release identifier could not be parsed
    #[error("Invalid release id '{id}': {source}")]
    InvalidReleaseId {
        /// Identifier as received
        id: String,
        /// Parse failure
        #[source]
        source: ParseIntError,
    },

    /// A pipe failed; names the pipe and the phase
    #[error("{pipe}: failed to {phase}: {source}")]
    Pipe {
        /// Pipe name
        pipe: String,
        /// Phase that failed
        phase: Phase,
        /// Failure reported by the pipe
        #[source]
        source: Box<ReleaseError>,
    },

    /// Announcement could not be delivered
    #[error("{service}: {reason}")]
    Announce {
        /// Announcement target, e.g. `discord`
        service: &'static str,
        /// What went wrong
        reason: String,
    },

    /// The run was cancelled
    #[error("Operation cancelled")]
    Cancelled,

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Pipe phase reported on failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Applying the pipe's configuration defaults
    Default,
    /// Executing the pipe
    Execute,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Default => write!(f, "set defaults"),
            Phase::Execute => write!(f, "execute"),
        }
    }
}

/// Error returned by the hosting provider transport
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}{}", .status.map(|s| format!(" (status {s})")).unwrap_or_default())]
pub struct ApiError {
    /// HTTP status, absent when no response was received
    pub status: Option<u16>,
    /// `X-GitHub-Request-Id` of the failed response
    pub request_id: Option<String>,
    /// Provider or transport message
    pub message: String,
}

impl ApiError {
    /// Error backed by an HTTP response
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            request_id: None,
            message: message.into(),
        }
    }

    /// Error raised before any response was received
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            request_id: None,
            message: message.into(),
        }
    }

    /// Attach the provider request id
    pub fn with_request_id(mut self, request_id: Option<String>) -> Self {
        self.request_id = request_id;
        self
    }

    /// Whether the provider answered 404
    pub fn is_not_found(&self) -> bool {
        self.status == Some(404)
    }
}

impl ReleaseError {
    /// Wrap an API error with the operation it interrupted
    pub fn remote(context: impl Into<String>, source: ApiError) -> Self {
        ReleaseError::Remote {
            context: context.into(),
            source,
        }
    }

    /// Configuration error shorthand
    pub fn config(reason: impl Into<String>) -> Self {
        ReleaseError::Config {
            reason: reason.into(),
        }
    }

    /// Whether a retry loop may attempt the operation again
    pub fn is_retriable(&self) -> bool {
        matches!(self, ReleaseError::Retriable { .. })
    }

    /// Whether this is a not-found condition the caller may tolerate
    pub fn is_not_found(&self) -> bool {
        match self {
            ReleaseError::MilestoneNotFound { .. } => true,
            ReleaseError::Remote { source, .. } => source.is_not_found(),
            ReleaseError::Pipe { source, .. } => source.is_not_found(),
            _ => false,
        }
    }

    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            ReleaseError::Config { .. } => vec![
                "Review the configuration file passed with --config".to_string(),
                "Run `shipwright check` to validate it without publishing".to_string(),
            ],
            ReleaseError::Remote { source, .. } if source.status == Some(401) => vec![
                "Set GITHUB_TOKEN or GH_TOKEN to a token with `repo` scope".to_string(),
            ],
            ReleaseError::UploadFatal { name, .. } => vec![
                format!("An asset named '{name}' already exists on the release"),
                "Delete the asset or rename the artifact before retrying".to_string(),
            ],
            ReleaseError::Pipe { source, .. } => source.recovery_suggestions(),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display_includes_status() {
        let err = ApiError::status(422, "Validation Failed");
        assert_eq!(err.to_string(), "Validation Failed (status 422)");
        assert_eq!(ApiError::transport("timed out").to_string(), "timed out");
    }

    #[test]
    fn test_pipe_error_names_pipe_and_phase() {
        let err = ReleaseError::Pipe {
            pipe: "release".to_string(),
            phase: Phase::Execute,
            source: Box::new(ReleaseError::Cancelled),
        };
        assert_eq!(err.to_string(), "release: failed to execute: Operation cancelled");
    }

    #[test]
    fn test_not_found_kinds() {
        assert!(ReleaseError::MilestoneNotFound { title: "v1".into() }.is_not_found());
        assert!(ReleaseError::remote("get", ApiError::status(404, "Not Found")).is_not_found());
        assert!(!ReleaseError::remote("get", ApiError::status(500, "boom")).is_not_found());
    }
}
