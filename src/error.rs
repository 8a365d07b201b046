//! Error types and handling for the weather digest

use thiserror::Error;

/// Main error type for a digest run
#[derive(Error, Debug)]
pub enum DigestError {
    /// Network or HTTP failure reaching a data source
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// Malformed or type-mismatched field in a record
    #[error("Parse error: {message}")]
    Parse { message: String },

    /// Source returned zero records where at least one was expected
    #[error("Empty result: {message}")]
    EmptyResult { message: String },

    /// Required single-record response absent
    #[error("Missing data: {message}")]
    MissingData { message: String },

    /// Malformed time string
    #[error("Format error: {message}")]
    Format { message: String },

    /// Chat sink rejected the message
    #[error("Delivery error: {message}")]
    Delivery { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl DigestError {
    /// Create a new transport error
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a new parse error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create a new empty-result error
    pub fn empty_result<S: Into<String>>(message: S) -> Self {
        Self::EmptyResult {
            message: message.into(),
        }
    }

    /// Create a new missing-data error
    pub fn missing_data<S: Into<String>>(message: S) -> Self {
        Self::MissingData {
            message: message.into(),
        }
    }

    /// Create a new format error
    pub fn format<S: Into<String>>(message: S) -> Self {
        Self::Format {
            message: message.into(),
        }
    }

    /// Create a new delivery error
    pub fn delivery<S: Into<String>>(message: S) -> Self {
        Self::Delivery {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Short stable name used as a structured log field
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            DigestError::Transport { .. } => "transport",
            DigestError::Parse { .. } => "parse",
            DigestError::EmptyResult { .. } => "empty_result",
            DigestError::MissingData { .. } => "missing_data",
            DigestError::Format { .. } => "format",
            DigestError::Delivery { .. } => "delivery",
            DigestError::Config { .. } => "config",
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            DigestError::Transport { .. } => {
                "Unable to reach the weather services. Please check your internet connection."
                    .to_string()
            }
            DigestError::Parse { message } => {
                format!("A weather service returned data that could not be read: {message}")
            }
            DigestError::EmptyResult { .. } => {
                "The forecast service returned no data for today.".to_string()
            }
            DigestError::MissingData { .. } => {
                "No air-quality reading is available for the configured station.".to_string()
            }
            DigestError::Format { message } => format!("Invalid time value: {message}"),
            DigestError::Delivery { .. } => {
                "The digest could not be delivered. Please check your chat credentials."
                    .to_string()
            }
            DigestError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = DigestError::transport("connection refused");
        assert!(matches!(err, DigestError::Transport { .. }));

        let err = DigestError::parse("bad POP value");
        assert!(matches!(err, DigestError::Parse { .. }));

        let err = DigestError::format("930");
        assert!(matches!(err, DigestError::Format { .. }));
    }

    #[test]
    fn test_display_includes_message() {
        let err = DigestError::parse("record POP@0900 has value 'abc'");
        assert_eq!(
            err.to_string(),
            "Parse error: record POP@0900 has value 'abc'"
        );
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(DigestError::empty_result("x").kind(), "empty_result");
        assert_eq!(DigestError::missing_data("x").kind(), "missing_data");
        assert_eq!(DigestError::delivery("x").kind(), "delivery");
    }

    #[test]
    fn test_user_messages() {
        let err = DigestError::config("test");
        assert!(err.user_message().contains("Configuration error"));

        let err = DigestError::transport("test");
        assert!(err.user_message().contains("Unable to reach"));

        let err = DigestError::format("2460");
        assert!(err.user_message().contains("2460"));
    }
}
