//! Error types for conformance checking
//!
//! The validation engine itself never fails: missing or mistyped host data is
//! an outcome, not an error. These errors come from the layers around it,
//! reading files, parsing messages and loading configuration.

use thiserror::Error;

/// Result type for conformance operations
pub type ConformanceResult<T> = Result<T, ConformanceError>;

/// Errors that can occur around a conformance run
#[derive(Error, Debug)]
pub enum ConformanceError {
    /// A message is not a well-formed JSON-RPC 2.0 message
    #[error("Invalid JSON-RPC message: {details}")]
    InvalidMessage { details: String },

    /// A transcript could not be read as JSON, a JSON array or JSON lines
    #[error("Invalid transcript at line {line}: {reason}")]
    InvalidTranscript { line: usize, reason: String },

    /// Nothing in the input carried a host context
    #[error("No host context found in {source_label}")]
    NoHostContext { source_label: String },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    /// I/O error
    #[error("I/O error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {source}")]
    JsonError {
        #[from]
        source: serde_json::Error,
    },

    /// YAML serialization error
    #[error("YAML error: {source}")]
    YamlError {
        #[from]
        source: serde_yaml::Error,
    },
}

impl ConformanceError {
    /// Create a new invalid message error
    pub fn invalid_message<S: Into<String>>(details: S) -> Self {
        Self::InvalidMessage {
            details: details.into(),
        }
    }

    /// Create a new configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::ConfigurationError {
            message: message.into(),
        }
    }

    /// Create a new missing host context error
    pub fn no_host_context<S: Into<String>>(source_label: S) -> Self {
        Self::NoHostContext {
            source_label: source_label.into(),
        }
    }

    /// Check if this error indicates a configuration problem
    pub fn is_configuration_issue(&self) -> bool {
        matches!(self, ConformanceError::ConfigurationError { .. })
    }

    /// Check if this error was caused by the data under test
    pub fn is_input_issue(&self) -> bool {
        matches!(
            self,
            ConformanceError::InvalidMessage { .. }
                | ConformanceError::InvalidTranscript { .. }
                | ConformanceError::NoHostContext { .. }
                | ConformanceError::JsonError { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categorization() {
        let config_error = ConformanceError::configuration("bad grade");
        assert!(config_error.is_configuration_issue());
        assert!(!config_error.is_input_issue());

        let message_error = ConformanceError::invalid_message("missing jsonrpc");
        assert!(message_error.is_input_issue());
        assert!(!message_error.is_configuration_issue());
    }

    #[test]
    fn test_error_display() {
        let error = ConformanceError::no_host_context("session.jsonl");
        assert_eq!(error.to_string(), "No host context found in session.jsonl");

        let error = ConformanceError::InvalidTranscript {
            line: 3,
            reason: "expected value".to_string(),
        };
        assert_eq!(error.to_string(), "Invalid transcript at line 3: expected value");
    }

    #[test]
    fn test_from_conversions() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: ConformanceError = json_err.into();
        assert!(matches!(error, ConformanceError::JsonError { .. }));

        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let error: ConformanceError = io_err.into();
        assert!(matches!(error, ConformanceError::IoError { .. }));
    }
}
