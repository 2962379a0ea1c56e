//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Finlink
#[derive(Error, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum FinlinkError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Security error: {0}")]
    Security(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for Finlink operations
pub type Result<T> = std::result::Result<T, FinlinkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_includes_category_and_message() {
        let err = FinlinkError::Config("missing client_id".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing client_id");

        let err = FinlinkError::Auth("token exchange rejected".to_string());
        assert_eq!(err.to_string(), "Authentication error: token exchange rejected");
    }

    #[test]
    fn error_serializes_with_tag_and_content() {
        let err = FinlinkError::Security("state signature mismatch".to_string());
        let json = serde_json::to_value(&err).expect("serialize error");
        assert_eq!(json["type"], "Security");
        assert_eq!(json["message"], "state signature mismatch");
    }
}
