//! Error types for track image derivation.
//!
//! Every fallible operation in the crate returns [`TrackError`]. Variants carry
//! structured context so callers can log them without re-deriving where they
//! came from, and so the HTTP boundary can map them onto status codes.
//!
//! ## Error Categories
//!
//! - **Invalid requests**: malformed rotation/size parameters, or a rotation
//!   override sent to the strict public boundary
//! - **Session unavailable**: no usable data within the year look-back window
//! - **Session errors**: provider faults and corrupt session documents
//! - **Render errors**: geometry, scene or encoding failures after data loaded
//! - **Cache persistence**: non-fatal storage failures, logged by the cache
//! - **Parse errors**: malformed session documents or configuration files
//! - **Configuration and file errors**
//!
//! ## Recovery and Retry
//!
//! ```rust
//! use trackplot::TrackError;
//!
//! let error = TrackError::session_unavailable("Monaco", 2024, 2023);
//! assert_eq!(error.status_code(), 404);
//! assert!(!error.is_retryable());
//! for suggestion in error.recovery_suggestions() {
//!     println!("  - {}", suggestion);
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for track operations.
pub type Result<T, E = TrackError> = std::result::Result<T, E>;

/// Main error type for track image derivation.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TrackError {
    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },

    #[error("No session data for {identifier} from {requested_year} to {oldest_year}")]
    SessionUnavailable { identifier: String, requested_year: i32, oldest_year: i32 },

    #[error("Failed to load session {year} {identifier}: {reason}")]
    Session {
        year: i32,
        identifier: String,
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Render failed during {context}")]
    Render {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Failed to persist cache entry {path}")]
    CachePersist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error in {context}: {details}")]
    Parse { context: String, details: String },

    #[error("Configuration error: {details}")]
    Config { details: String },

    #[error("File error: {path}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TrackError {
    /// Returns whether re-invoking the failed operation may succeed.
    ///
    /// Year fallback is handled inside the resolver, so an exhausted window is
    /// terminal here.
    pub fn is_retryable(&self) -> bool {
        match self {
            TrackError::InvalidRequest { .. } => false,
            TrackError::SessionUnavailable { .. } => false,
            TrackError::Session { .. } => true,
            TrackError::Render { .. } => false,
            TrackError::CachePersist { .. } => true,
            TrackError::Parse { .. } => false,
            TrackError::Config { .. } => false,
            TrackError::File { .. } => false,
        }
    }

    /// HTTP-equivalent status for this error at the public boundary.
    pub fn status_code(&self) -> u16 {
        match self {
            TrackError::InvalidRequest { .. } => 400,
            TrackError::SessionUnavailable { .. } => 404,
            _ => 500,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            TrackError::InvalidRequest { .. } => vec![
                "Remove the angle parameter; rotation comes from circuit metadata",
                "Send both w and h as positive numbers",
            ],
            TrackError::SessionUnavailable { .. } => vec![
                "Check the event identifier against the provider's naming",
                "Request an earlier season",
                "Increase the year look-back window",
            ],
            TrackError::Session { .. } => vec![
                "Check the session archive is readable",
                "Verify the session document is valid YAML",
                "Retry with refresh=1",
            ],
            TrackError::Render { .. } => vec![
                "Check the figure size is reasonable",
                "Verify the session has finite position samples",
            ],
            TrackError::CachePersist { .. } => vec![
                "Check permissions on the cache directory",
                "Ensure sufficient disk space",
            ],
            TrackError::Parse { .. } => vec![
                "Verify source data integrity",
                "Check the document matches the session schema",
            ],
            TrackError::Config { .. } => vec![
                "Check the configuration file syntax",
                "Colors must be #rrggbb",
            ],
            TrackError::File { .. } => {
                vec!["Check file exists and is readable", "Check file permissions"]
            }
        }
    }

    /// Helper constructor for invalid request errors.
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        TrackError::InvalidRequest { reason: reason.into() }
    }

    /// Helper constructor for an exhausted year window.
    pub fn session_unavailable(
        identifier: impl Into<String>,
        requested_year: i32,
        oldest_year: i32,
    ) -> Self {
        TrackError::SessionUnavailable { identifier: identifier.into(), requested_year, oldest_year }
    }

    /// Helper constructor for session load failures.
    pub fn session_error(year: i32, identifier: impl Into<String>, reason: impl Into<String>) -> Self {
        TrackError::Session { year, identifier: identifier.into(), reason: reason.into(), source: None }
    }

    /// Helper constructor for session load failures with source.
    pub fn session_error_with_source(
        year: i32,
        identifier: impl Into<String>,
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        TrackError::Session {
            year,
            identifier: identifier.into(),
            reason: reason.into(),
            source: Some(source),
        }
    }

    /// Helper constructor for render failures.
    pub fn render_error(context: impl Into<String>) -> Self {
        TrackError::Render { context: context.into(), source: None }
    }

    /// Helper constructor for render failures with source.
    pub fn render_error_with_source(
        context: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        TrackError::Render { context: context.into(), source: Some(source) }
    }

    /// Helper constructor for file errors with path context.
    pub fn file_error(path: PathBuf, source: std::io::Error) -> Self {
        TrackError::File { path, source }
    }

    /// Helper constructor for parse errors.
    pub fn parse_error(context: impl Into<String>, details: impl Into<String>) -> Self {
        TrackError::Parse { context: context.into(), details: details.into() }
    }

    /// Helper constructor for configuration errors.
    pub fn config_error(details: impl Into<String>) -> Self {
        TrackError::Config { details: details.into() }
    }
}

impl From<std::io::Error> for TrackError {
    fn from(err: std::io::Error) -> Self {
        TrackError::File { path: PathBuf::from("<unknown>"), source: err }
    }
}
