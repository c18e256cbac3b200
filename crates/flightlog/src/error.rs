//! Error types for flightlog.
//!
//! This module defines all error types used throughout the flightlog crate,
//! along with the conversion into the short messages shown to the user at the
//! action boundary.

use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

/// The main error type for flightlog operations.
#[derive(Error, Debug)]
pub enum Error {
    // === API Errors ===
    /// A single resource was requested and the backend answered 404.
    #[error("{resource} '{id}' not found")]
    NotFound {
        /// Kind of resource (e.g. "flight log").
        resource: &'static str,
        /// Identifier that was looked up.
        id: String,
    },

    /// The backend answered with a non-success status.
    #[error("request failed with status {status}: {message}")]
    Status {
        /// HTTP status returned by the backend.
        status: StatusCode,
        /// Detail extracted from the response body, if any.
        message: String,
    },

    /// The request could not be sent or its response could not be read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A URL could not be built.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Input Errors ===
    /// User-supplied input was rejected before any request was made.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to write a downloaded file.
    #[error("failed to write {path}: {source}")]
    FileWrite {
        /// Destination path.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Platform Errors ===
    /// The system clipboard could not be used.
    #[error("clipboard unavailable: {0}")]
    Clipboard(String),

    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for flightlog operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a not-found error for a flight log.
    #[must_use]
    pub fn log_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            resource: "flight log",
            id: id.into(),
        }
    }

    /// Create a new invalid input error.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create a new clipboard error.
    #[must_use]
    pub fn clipboard(message: impl Into<String>) -> Self {
        Self::Clipboard(message.into())
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this error means the requested resource does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// The message shown to the user when an action fails.
    ///
    /// Detail views distinguish a missing resource from everything else;
    /// list and statistics views only ever see the generic form.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound { resource, .. } => format!("The requested {resource} does not exist."),
            Self::InvalidInput(message) => message.clone(),
            Self::ConfigLoad(_) | Self::ConfigValidation { .. } => self.to_string(),
            _ => format!("Something went wrong: {self}. Please try again."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = Error::log_not_found("abc-123");
        assert_eq!(err.to_string(), "flight log 'abc-123' not found");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_status_is_not_not_found() {
        let err = Error::Status {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "boom".to_string(),
        };
        assert!(!err.is_not_found());
        assert!(err.to_string().contains("500"));
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_user_message_not_found() {
        let msg = Error::log_not_found("x").user_message();
        assert_eq!(msg, "The requested flight log does not exist.");
    }

    #[test]
    fn test_user_message_generic() {
        let err = Error::Status {
            status: StatusCode::BAD_GATEWAY,
            message: "upstream".to_string(),
        };
        let msg = err.user_message();
        assert!(msg.starts_with("Something went wrong"));
        assert!(msg.contains("upstream"));
    }

    #[test]
    fn test_user_message_invalid_input_is_verbatim() {
        let err = Error::invalid_input("File must be a .ulg file");
        assert_eq!(err.user_message(), "File must be a .ulg file");
    }

    #[test]
    fn test_config_validation_error_display() {
        let err = Error::ConfigValidation {
            message: "debounce_ms must be greater than 0".to_string(),
        };
        assert!(err.to_string().contains("debounce_ms"));
        assert!(err.user_message().contains("debounce_ms"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_json_error() {
        let json_result: std::result::Result<i32, serde_json::Error> =
            serde_json::from_str("not valid json");
        if let Err(json_err) = json_result {
            let err: Error = json_err.into();
            assert!(matches!(err, Error::Json(_)));
        }
    }

    #[test]
    fn test_from_url_error() {
        let err: Error = url::Url::parse("not a url").unwrap_err().into();
        assert!(matches!(err, Error::Url(_)));
    }

    #[test]
    fn test_file_write_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::FileWrite {
            path: PathBuf::from("/root/forbidden.ulg"),
            source: io_err,
        };
        assert!(err.to_string().contains("/root/forbidden.ulg"));
    }

    #[test]
    fn test_clipboard_and_internal_display() {
        assert_eq!(
            Error::clipboard("no display").to_string(),
            "clipboard unavailable: no display"
        );
        assert_eq!(
            Error::internal("oops").to_string(),
            "internal error: oops"
        );
    }
}
