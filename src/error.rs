// Error types for certnotify
//
// Structured error taxonomy built with thiserror. Source failures abort a run;
// invalid records and send failures are collected into the run summary instead
// of being raised one by one.

use crate::expiry::UrgencyCategory;
use std::io;
use thiserror::Error;

/// Main error type for certnotify operations
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The certificate source cannot be reached or the query failed
    #[error("Certificate source unavailable: {reason}")]
    SourceUnavailable { reason: String },

    /// A record is missing a required field and cannot be grouped
    #[error("Invalid certificate record '{name}': {reason}")]
    InvalidRecord {
        name: String,
        owner: String,
        issued_to: String,
        reason: String,
    },

    /// The sender rejected or failed to deliver a group's notification
    #[error("Failed to notify {recipients} ({urgency}) about {} certificate(s): {reason}", .certificates.len())]
    SendFailure {
        recipients: String,
        urgency: UrgencyCategory,
        certificates: Vec<String>,
        reason: String,
    },

    /// Invalid configuration or parameters
    #[error("Invalid configuration: {message}")]
    ConfigError { message: String },

    /// Database operation errors
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Template rendering errors
    #[error("Template error: {0}")]
    TemplateError(String),

    /// Email construction or transport errors
    #[error("Email error: {0}")]
    EmailError(String),

    /// Generic I/O error
    #[error("I/O error: {source}")]
    IoError {
        #[from]
        source: io::Error,
    },

    /// File system errors with the offending path
    #[error("File system error: {path}: {source}")]
    FileSystemError {
        path: String,
        #[source]
        source: io::Error,
    },

    /// CSV decoding errors
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl NotifyError {
    /// Build a source failure from anything displayable
    pub fn source_unavailable(reason: impl std::fmt::Display) -> Self {
        NotifyError::SourceUnavailable {
            reason: reason.to_string(),
        }
    }

    /// Build a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        NotifyError::ConfigError {
            message: message.into(),
        }
    }

    /// Whether this error must abort the current run
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            NotifyError::InvalidRecord { .. } | NotifyError::SendFailure { .. }
        )
    }
}

/// Conversion from anyhow::Error for the binary edge
impl From<anyhow::Error> for NotifyError {
    fn from(err: anyhow::Error) -> Self {
        NotifyError::Other(err.to_string())
    }
}

impl From<toml::de::Error> for NotifyError {
    fn from(err: toml::de::Error) -> Self {
        NotifyError::ConfigError {
            message: format!("Failed to parse TOML config: {}", err),
        }
    }
}

impl From<toml::ser::Error> for NotifyError {
    fn from(err: toml::ser::Error) -> Self {
        NotifyError::ConfigError {
            message: format!("Failed to serialize config: {}", err),
        }
    }
}

impl From<sqlx::Error> for NotifyError {
    fn from(err: sqlx::Error) -> Self {
        NotifyError::DatabaseError(err.to_string())
    }
}

impl From<handlebars::RenderError> for NotifyError {
    fn from(err: handlebars::RenderError) -> Self {
        NotifyError::TemplateError(format!("Template render error: {}", err))
    }
}

impl From<handlebars::TemplateError> for NotifyError {
    fn from(err: handlebars::TemplateError) -> Self {
        NotifyError::TemplateError(format!("Template registration error: {}", err))
    }
}

impl From<lettre::address::AddressError> for NotifyError {
    fn from(err: lettre::address::AddressError) -> Self {
        NotifyError::EmailError(format!("Email address error: {}", err))
    }
}

impl From<lettre::error::Error> for NotifyError {
    fn from(err: lettre::error::Error) -> Self {
        NotifyError::EmailError(format!("Email error: {}", err))
    }
}

impl From<lettre::transport::smtp::Error> for NotifyError {
    fn from(err: lettre::transport::smtp::Error) -> Self {
        NotifyError::EmailError(format!("SMTP error: {}", err))
    }
}

impl From<tokio::task::JoinError> for NotifyError {
    fn from(err: tokio::task::JoinError) -> Self {
        NotifyError::Other(format!("Task join error: {}", err))
    }
}

/// Helper macro for bailing out with a formatted `NotifyError::Other`
#[macro_export]
macro_rules! notify_bail {
    ($msg:literal $(,)?) => {
        return Err($crate::error::NotifyError::Other($msg.to_string()))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::error::NotifyError::Other(format!($fmt, $($arg)*)))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_unavailable_message() {
        let err = NotifyError::source_unavailable("connection refused");
        let msg = err.to_string();
        assert!(msg.contains("source unavailable"));
        assert!(msg.contains("connection refused"));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_send_failure_message_counts_certificates() {
        let err = NotifyError::SendFailure {
            recipients: "ops,dev".to_string(),
            urgency: UrgencyCategory::Today,
            certificates: vec!["CertA".to_string(), "CertB".to_string()],
            reason: "mailbox unavailable".to_string(),
        };

        let msg = err.to_string();
        assert!(msg.contains("ops,dev"));
        assert!(msg.contains("2 certificate(s)"));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_invalid_record_is_not_fatal() {
        let err = NotifyError::InvalidRecord {
            name: "CertX".to_string(),
            owner: String::new(),
            issued_to: "bob".to_string(),
            reason: "owner is empty".to_string(),
        };

        assert!(err.to_string().contains("CertX"));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_error_conversion_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "missing");
        let err: NotifyError = io_err.into();
        assert!(matches!(err, NotifyError::IoError { .. }));
    }

    #[test]
    fn test_error_chain_preserved() {
        use std::error::Error;

        let err = NotifyError::FileSystemError {
            path: "/tmp/certs.csv".to_string(),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };

        assert!(err.source().is_some());
    }
}
