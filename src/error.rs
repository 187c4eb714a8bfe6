//! Unified error handling for mongoconf
//!
//! Every operation on an automation document returns [`AutomationResult`]. The
//! variants mirror the error surface callers match on: unsupported mechanisms,
//! missing users, processes or agents, duplicate entries, and failures of the
//! derivation pipeline or the entropy source.

use std::fmt;
use std::io;
use thiserror::Error;

use crate::agents::AgentKind;

/// Main error type for automation document operations
#[derive(Debug, Error)]
pub enum AutomationError {
    /// Mechanism identifier is neither MONGODB-CR nor SCRAM-SHA-256
    #[error("unsupported mechanism {mechanism}")]
    UnsupportedMechanism { mechanism: String },

    /// No wanted user with this (username, database) pair
    #[error("user {username} not found for {database}")]
    UserNotFound { username: String, database: String },

    /// Filter tokens that never matched a process; earlier mutations are kept
    #[error("processes not found: {}", .processes.join(", "))]
    ProcessesNotFound { processes: Vec<String> },

    #[error("{agent} already enabled for {hostname}")]
    AgentAlreadyEnabled { agent: AgentKind, hostname: String },

    #[error("{agent} not enabled for {hostname}")]
    AgentNotFound { agent: AgentKind, hostname: String },

    #[error("index already exists on {database}.{collection} for replica set {rs_name}")]
    IndexAlreadyExists {
        database: String,
        collection: String,
        rs_name: String,
    },

    #[error("the automation config has not been initialized")]
    NotInitialized,

    /// Salt length must be the hash output size minus four bytes
    #[error("salt should have length of {expected} bytes, got {actual}")]
    SaltSizeMismatch { expected: usize, actual: usize },

    #[error("salt is not valid base64: {0}")]
    InvalidSalt(#[from] base64::DecodeError),

    /// SASLprep rejected the password
    #[error("password preparation failed: {message}")]
    PasswordPreparation { message: String },

    /// The HMAC implementation refused the derived key
    #[error("HMAC key rejected: {message}")]
    MacKey { message: String },

    /// The OS random source failed while generating key material
    #[error("random source failed while generating {stage}: {source}")]
    Entropy {
        stage: &'static str,
        #[source]
        source: rand::Error,
    },

    #[error("document error: {0}")]
    Document(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

pub use crate::config::ConfigError;

/// Result type alias for document operations
pub type AutomationResult<T> = Result<T, AutomationError>;

/// Broad classes of failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected input, nothing was mutated
    Validation,
    /// Something named by the caller does not exist
    NotFound,
    /// The entry already exists, nothing was mutated
    Conflict,
    /// Entropy, IO or serialization failure
    Fatal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Validation => write!(f, "VALIDATION"),
            ErrorKind::NotFound => write!(f, "NOT_FOUND"),
            ErrorKind::Conflict => write!(f, "CONFLICT"),
            ErrorKind::Fatal => write!(f, "FATAL"),
        }
    }
}

impl AutomationError {
    pub fn unsupported_mechanism<S: Into<String>>(mechanism: S) -> Self {
        AutomationError::UnsupportedMechanism {
            mechanism: mechanism.into(),
        }
    }

    pub fn user_not_found<S: Into<String>>(username: S, database: S) -> Self {
        AutomationError::UserNotFound {
            username: username.into(),
            database: database.into(),
        }
    }

    pub fn entropy(stage: &'static str, source: rand::Error) -> Self {
        AutomationError::Entropy { stage, source }
    }

    /// Get the error class
    pub fn kind(&self) -> ErrorKind {
        match self {
            AutomationError::UnsupportedMechanism { .. }
            | AutomationError::NotInitialized
            | AutomationError::SaltSizeMismatch { .. }
            | AutomationError::InvalidSalt(_)
            | AutomationError::PasswordPreparation { .. } => ErrorKind::Validation,
            AutomationError::Config(ConfigError::IoError(_)) => ErrorKind::Fatal,
            AutomationError::Config(_) => ErrorKind::Validation,
            AutomationError::UserNotFound { .. }
            | AutomationError::ProcessesNotFound { .. }
            | AutomationError::AgentNotFound { .. } => ErrorKind::NotFound,
            AutomationError::AgentAlreadyEnabled { .. }
            | AutomationError::IndexAlreadyExists { .. } => ErrorKind::Conflict,
            AutomationError::Entropy { .. }
            | AutomationError::MacKey { .. }
            | AutomationError::Document(_)
            | AutomationError::Io(_) => ErrorKind::Fatal,
        }
    }

    /// Whether the document may already carry mutations from the failed call
    pub fn is_partial_application(&self) -> bool {
        matches!(self, AutomationError::ProcessesNotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let error = AutomationError::unsupported_mechanism("PLAIN");
        assert!(matches!(error, AutomationError::UnsupportedMechanism { .. }));
        assert_eq!(error.to_string(), "unsupported mechanism PLAIN");
    }

    #[test]
    fn test_processes_not_found_lists_tokens() {
        let error = AutomationError::ProcessesNotFound {
            processes: vec!["host0:27017".to_string(), "host9:1".to_string()],
        };
        assert_eq!(
            error.to_string(),
            "processes not found: host0:27017, host9:1"
        );
        assert!(error.is_partial_application());
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(
            AutomationError::user_not_found("alice", "admin").kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            AutomationError::SaltSizeMismatch {
                expected: 16,
                actual: 12
            }
            .kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            AutomationError::AgentAlreadyEnabled {
                agent: AgentKind::Backup,
                hostname: "host0".to_string()
            }
            .kind(),
            ErrorKind::Conflict
        );

        let io_error = AutomationError::Io(io::Error::new(io::ErrorKind::NotFound, "test"));
        assert_eq!(io_error.kind(), ErrorKind::Fatal);
        assert!(!io_error.is_partial_application());
    }

    #[test]
    fn test_config_error_kind() {
        let io = AutomationError::from(ConfigError::IoError("permission denied".to_string()));
        assert_eq!(io.kind(), ErrorKind::Fatal);

        let invalid =
            AutomationError::from(ConfigError::ValidationError("Invalid log level".to_string()));
        assert_eq!(invalid.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_agent_error_display() {
        let error = AutomationError::AgentNotFound {
            agent: AgentKind::Monitoring,
            hostname: "host1".to_string(),
        };
        assert_eq!(error.to_string(), "monitoring not enabled for host1");
    }
}
