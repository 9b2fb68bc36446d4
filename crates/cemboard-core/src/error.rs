//! Error types for cemboard-core
//!
//! One error hierarchy for API, session, form and document failures. The API
//! layer keeps "unauthorized" apart from every other status because it is the
//! only failure the dashboards react to with a redirect.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for cemboard operations
#[derive(Error, Debug)]
pub enum CoreError {
    // ===================
    // HTTP Errors
    // ===================
    #[error("Unauthorized: the API rejected the session token")]
    Unauthorized,

    #[error("HTTP {status} from {path}: {message}")]
    Status {
        path: String,
        status: u16,
        message: String,
    },

    #[error("Request to {path} failed: {message}")]
    Transport {
        path: String,
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    #[error("Failed to decode response from {path}: {message}")]
    Decode {
        path: String,
        message: String,
        #[source]
        source: serde_json::Error,
    },

    // ===================
    // Session Errors
    // ===================
    #[error("Not logged in: no session token stored")]
    MissingToken,

    // ===================
    // Form Errors
    // ===================
    #[error("{message}")]
    Validation { message: String },

    #[error("Image upload failed: {message}")]
    Upload { message: String },

    #[error("Record not found: {id}")]
    RecordNotFound { id: String },

    // ===================
    // Document Errors
    // ===================
    #[error("Spreadsheet error: {message}")]
    Spreadsheet { message: String },

    #[error("Invoice rendering failed: {message}")]
    Invoice { message: String },

    // ===================
    // IO Errors
    // ===================
    #[error("Failed to read file: {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ===================
    // Config Errors
    // ===================
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Failed to parse config file {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// True for HTTP 401 responses
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, CoreError::Unauthorized)
    }

    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            CoreError::Unauthorized => Some(401),
            CoreError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message shown to the operator in an alert.
    ///
    /// Server-supplied text is preferred over the generic description.
    pub fn alert_message(&self) -> String {
        match self {
            CoreError::Status { message, .. } if !message.is_empty() => message.clone(),
            CoreError::Validation { message } => message.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_is_distinct_from_other_statuses() {
        assert!(CoreError::Unauthorized.is_unauthorized());
        let forbidden = CoreError::Status {
            path: "/api/prints".to_string(),
            status: 403,
            message: "Forbidden".to_string(),
        };
        assert!(!forbidden.is_unauthorized());
        assert_eq!(forbidden.status(), Some(403));
        assert_eq!(CoreError::Unauthorized.status(), Some(401));
        assert_eq!(CoreError::MissingToken.status(), None);
    }

    #[test]
    fn test_alert_prefers_server_message() {
        let err = CoreError::Status {
            path: "/api/prints".to_string(),
            status: 400,
            message: "clientName is required".to_string(),
        };
        assert_eq!(err.alert_message(), "clientName is required");

        let empty = CoreError::Status {
            path: "/api/prints".to_string(),
            status: 500,
            message: String::new(),
        };
        assert_eq!(empty.alert_message(), "HTTP 500 from /api/prints: ");
    }
}
