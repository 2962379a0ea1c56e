//! Static provider registry.
//!
//! Maps each supported provider to its OAuth endpoints, default scopes, and
//! flow flags. Entries are compile-time constants; credentials come from
//! configuration and are joined to an entry when a manager is constructed.

use std::fmt;
use std::str::FromStr;

use finlink_domain::FinlinkError;
use serde::{Deserialize, Serialize};

/// Providers the platform can connect to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Payment processing (Stripe Connect)
    Stripe,
    /// Team messaging
    Slack,
    /// Accounting (Intuit QuickBooks Online)
    QuickBooks,
    /// Accounting (Xero)
    Xero,
    /// Mail/calendar family (Google Workspace)
    Google,
    /// Mail/calendar family (Microsoft 365)
    Microsoft,
}

/// Registry entry for one provider.
///
/// `revoke_url` is explicit wherever the provider documents an endpoint; a
/// `None` falls back to the derived `/token` → `/revoke` convention at call
/// time, with a warning.
#[derive(Debug, Clone, Copy)]
pub struct RegistryEntry {
    pub authorization_url: &'static str,
    pub token_url: &'static str,
    pub revoke_url: Option<&'static str>,
    pub default_scopes: &'static [&'static str],
    pub response_type: &'static str,
    pub access_type: Option<&'static str>,
    pub prompt: Option<&'static str>,
}

impl ProviderKind {
    /// Every supported provider, for iteration and validation.
    pub const ALL: [Self; 6] =
        [Self::Stripe, Self::Slack, Self::QuickBooks, Self::Xero, Self::Google, Self::Microsoft];

    /// Stable identifier used in persisted records and environment keys.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stripe => "stripe",
            Self::Slack => "slack",
            Self::QuickBooks => "quickbooks",
            Self::Xero => "xero",
            Self::Google => "google",
            Self::Microsoft => "microsoft",
        }
    }

    /// Uppercase key segment for environment variables
    /// (`FINLINK_<KEY>_CLIENT_ID`).
    #[must_use]
    pub fn env_key(self) -> &'static str {
        match self {
            Self::Stripe => "STRIPE",
            Self::Slack => "SLACK",
            Self::QuickBooks => "QUICKBOOKS",
            Self::Xero => "XERO",
            Self::Google => "GOOGLE",
            Self::Microsoft => "MICROSOFT",
        }
    }

    /// Endpoint and flow configuration for this provider.
    #[must_use]
    pub fn entry(self) -> RegistryEntry {
        match self {
            Self::Stripe => RegistryEntry {
                authorization_url: "https://connect.stripe.com/oauth/authorize",
                token_url: "https://connect.stripe.com/oauth/token",
                revoke_url: Some("https://connect.stripe.com/oauth/deauthorize"),
                default_scopes: &["read_write"],
                response_type: "code",
                access_type: None,
                prompt: None,
            },
            Self::Slack => RegistryEntry {
                authorization_url: "https://slack.com/oauth/v2/authorize",
                token_url: "https://slack.com/api/oauth.v2.access",
                revoke_url: Some("https://slack.com/api/auth.revoke"),
                default_scopes: &["chat:write", "channels:read"],
                response_type: "code",
                access_type: None,
                prompt: None,
            },
            Self::QuickBooks => RegistryEntry {
                authorization_url: "https://appcenter.intuit.com/connect/oauth2",
                token_url: "https://oauth.platform.intuit.com/oauth2/v1/tokens/bearer",
                revoke_url: Some("https://developer.api.intuit.com/v2/oauth2/tokens/revoke"),
                default_scopes: &["com.intuit.quickbooks.accounting"],
                response_type: "code",
                access_type: None,
                prompt: None,
            },
            Self::Xero => RegistryEntry {
                authorization_url: "https://login.xero.com/identity/connect/authorize",
                token_url: "https://identity.xero.com/connect/token",
                revoke_url: Some("https://identity.xero.com/connect/revocation"),
                default_scopes: &[
                    "openid",
                    "accounting.transactions",
                    "accounting.settings",
                    "offline_access",
                ],
                response_type: "code",
                access_type: None,
                prompt: None,
            },
            // Google only issues refresh tokens with offline access and an
            // explicit consent prompt
            Self::Google => RegistryEntry {
                authorization_url: "https://accounts.google.com/o/oauth2/v2/auth",
                token_url: "https://oauth2.googleapis.com/token",
                revoke_url: Some("https://oauth2.googleapis.com/revoke"),
                default_scopes: &[
                    "openid",
                    "email",
                    "https://www.googleapis.com/auth/calendar.readonly",
                    "https://www.googleapis.com/auth/gmail.send",
                ],
                response_type: "code",
                access_type: Some("offline"),
                prompt: Some("consent"),
            },
            // Microsoft documents no revocation endpoint; the derived
            // fallback is harmless because revocation is best effort
            Self::Microsoft => RegistryEntry {
                authorization_url: "https://login.microsoftonline.com/common/oauth2/v2.0/authorize",
                token_url: "https://login.microsoftonline.com/common/oauth2/v2.0/token",
                revoke_url: None,
                default_scopes: &[
                    "openid",
                    "email",
                    "offline_access",
                    "https://graph.microsoft.com/Calendars.Read",
                    "https://graph.microsoft.com/Mail.Send",
                ],
                response_type: "code",
                access_type: None,
                prompt: None,
            },
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = FinlinkError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "stripe" => Ok(Self::Stripe),
            "slack" => Ok(Self::Slack),
            "quickbooks" => Ok(Self::QuickBooks),
            "xero" => Ok(Self::Xero),
            "google" => Ok(Self::Google),
            "microsoft" => Ok(Self::Microsoft),
            other => Err(FinlinkError::NotFound(format!("unknown provider '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_identifiers_round_trip() {
        for kind in ProviderKind::ALL {
            let parsed: ProviderKind = kind.as_str().parse().expect("identifier parses");
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn unknown_provider_is_a_not_found_error() {
        let result = "fax-machine".parse::<ProviderKind>();
        assert!(matches!(result, Err(FinlinkError::NotFound(_))));
    }

    #[test]
    fn every_entry_has_usable_endpoints_and_scopes() {
        for kind in ProviderKind::ALL {
            let entry = kind.entry();
            assert!(entry.authorization_url.starts_with("https://"), "{kind}");
            assert!(entry.token_url.starts_with("https://"), "{kind}");
            assert!(!entry.default_scopes.is_empty(), "{kind}");
            assert_eq!(entry.response_type, "code", "{kind}");
        }
    }

    #[test]
    fn refresh_capable_providers_request_offline_access() {
        // Google via flow flags, Microsoft and Xero via scope
        assert_eq!(ProviderKind::Google.entry().access_type, Some("offline"));
        assert!(ProviderKind::Microsoft.entry().default_scopes.contains(&"offline_access"));
        assert!(ProviderKind::Xero.entry().default_scopes.contains(&"offline_access"));
    }

    #[test]
    fn serde_identifier_matches_as_str() {
        let json = serde_json::to_string(&ProviderKind::QuickBooks).expect("serialize");
        assert_eq!(json, "\"quickbooks\"");
    }
}
