//! Common data types used throughout the application

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persisted shape of a connected third-party integration.
///
/// Ownership of this record belongs to the CRUD layer: the integrations core
/// produces it after a successful code exchange and never stores it itself.
/// Field names line up with the platform's relational schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectedIntegration {
    pub integration_id: i64,
    pub provider: String,
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connected_integration_round_trips_through_json() {
        let record = ConnectedIntegration {
            integration_id: 7,
            provider: "stripe".to_string(),
            access_token: "access_123".to_string(),
            refresh_token: Some("refresh_456".to_string()),
            expires_at: Some(Utc::now()),
            scope: Some("read write".to_string()),
        };

        let json = serde_json::to_string(&record).expect("serialize");
        let parsed: ConnectedIntegration = serde_json::from_str(&json).expect("deserialize");

        assert_eq!(parsed.integration_id, 7);
        assert_eq!(parsed.provider, "stripe");
        assert_eq!(parsed.refresh_token.as_deref(), Some("refresh_456"));
    }

    #[test]
    fn optional_fields_are_omitted_when_absent() {
        let record = ConnectedIntegration {
            integration_id: 1,
            provider: "slack".to_string(),
            access_token: "xoxb".to_string(),
            refresh_token: None,
            expires_at: None,
            scope: None,
        };

        let json = serde_json::to_string(&record).expect("serialize");
        assert!(!json.contains("refresh_token"));
        assert!(!json.contains("expires_at"));
    }
}
