//! OAuth 2.0 types and structures
//!
//! Defines unified data structures for OAuth tokens, wire responses, and
//! per-provider configuration. One `ProviderConfig` is built per configured
//! integration and stays immutable for the lifetime of its client.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// OAuth 2.0 access and refresh tokens with expiry metadata
///
/// Produced by code exchange and replaced (never mutated in place) by
/// refresh. Ownership and storage belong entirely to the caller; the client
/// never retains a reference after returning one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenSet {
    /// Access token presented to the provider's protected API
    pub access_token: String,

    /// Refresh token for obtaining new access tokens
    /// Optional because some OAuth providers don't issue them
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Token type (`"Bearer"` for every supported provider)
    pub token_type: String,

    /// Access token lifetime in seconds, when the provider reported one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,

    /// Absolute expiration timestamp (UTC)
    /// Calculated from `expires_in` exactly once, at creation/refresh time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,

    /// Granted scopes (space-separated)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl TokenSet {
    /// Create a new `TokenSet` with calculated expiration time
    ///
    /// `expires_at` is derived from `expires_in` here and nowhere else; a
    /// missing or non-positive lifetime means the token is treated as
    /// non-expiring. A missing `token_type` defaults to `"Bearer"`.
    #[must_use]
    pub fn new(
        access_token: String,
        refresh_token: Option<String>,
        expires_in: Option<i64>,
        scope: Option<String>,
        token_type: Option<String>,
    ) -> Self {
        let expires_at = expires_in
            .filter(|seconds| *seconds > 0)
            .map(|seconds| Utc::now() + chrono::Duration::seconds(seconds));

        Self {
            access_token,
            refresh_token,
            token_type: token_type.unwrap_or_else(|| "Bearer".to_string()),
            expires_in,
            expires_at,
            scope,
        }
    }

    /// Check whether the access token has expired
    ///
    /// # Returns
    /// `false` if no expiry is set (non-expiring by convention), otherwise
    /// `true` once the current time reaches `expires_at`.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => Utc::now() >= expires_at,
            None => false,
        }
    }

    /// Check whether the token expires within the given threshold
    ///
    /// Useful for refresh-ahead logic in the calling layer (recommended
    /// threshold: 300 = 5 minutes).
    #[must_use]
    pub fn expires_within(&self, threshold_seconds: i64) -> bool {
        match self.expires_at {
            Some(expires_at) => {
                Utc::now() + chrono::Duration::seconds(threshold_seconds) >= expires_at
            }
            None => false,
        }
    }

    /// Get seconds until token expiration
    ///
    /// # Returns
    /// `None` for non-expiring tokens, otherwise the remaining lifetime
    /// clamped at zero.
    #[must_use]
    pub fn seconds_until_expiry(&self) -> Option<i64> {
        self.expires_at.map(|expires_at| (expires_at - Utc::now()).num_seconds().max(0))
    }
}

/// OAuth token response from a provider's token endpoint
///
/// Standard OAuth 2.0 token response format (RFC 6749). Providers differ in
/// which optional fields they populate.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub token_type: Option<String>,
    pub expires_in: Option<i64>,
    pub scope: Option<String>,
}

impl From<TokenResponse> for TokenSet {
    fn from(response: TokenResponse) -> Self {
        Self::new(
            response.access_token,
            response.refresh_token,
            response.expires_in,
            response.scope,
            response.token_type,
        )
    }
}

/// OAuth error response from an authorization server
///
/// Standard OAuth 2.0 error response format (RFC 6749 §5.2).
#[derive(Debug, Deserialize)]
pub struct OAuthError {
    pub error: String,
    pub error_description: Option<String>,
}

impl fmt::Display for OAuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error_description {
            Some(desc) => write!(f, "{}: {}", self.error, desc),
            None => write!(f, "{}", self.error),
        }
    }
}

impl std::error::Error for OAuthError {}

/// Configuration for a single provider connection
///
/// Immutable per configured integration. Construct through
/// [`ProviderConfig::builder`], which validates required credentials at
/// build time rather than at the first network call.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Provider identifier for logging and the persisted record
    pub provider: String,

    /// OAuth client ID
    pub client_id: String,

    /// OAuth client secret (confidential client)
    pub client_secret: String,

    /// Redirect URI registered with the provider
    pub redirect_uri: String,

    /// Authorization endpoint the user is sent to
    pub authorization_url: String,

    /// Token endpoint for exchange and refresh
    pub token_url: String,

    /// Revocation endpoint, when the provider documents one
    pub revoke_url: Option<String>,

    /// OAuth scopes to request
    pub scopes: Vec<String>,

    /// Authorization response type (`"code"` unless overridden)
    pub response_type: String,

    /// `access_type` query parameter (e.g. `"offline"` for Google refresh
    /// tokens)
    pub access_type: Option<String>,

    /// `prompt` query parameter (e.g. `"consent"`)
    pub prompt: Option<String>,
}

impl ProviderConfig {
    /// Start building a provider configuration
    #[must_use]
    pub fn builder(provider: impl Into<String>) -> ProviderConfigBuilder {
        ProviderConfigBuilder::new(provider)
    }

    /// Get scopes as a space-separated string
    #[must_use]
    pub fn scope_string(&self) -> String {
        self.scopes.join(" ")
    }

    /// Resolve the revocation endpoint
    ///
    /// Prefers the explicitly configured `revoke_url`. Falls back to the
    /// `/token` → `/revoke` substitution convention, which is fragile enough
    /// to warrant a warning whenever it is used.
    #[must_use]
    pub fn revoke_endpoint(&self) -> String {
        match &self.revoke_url {
            Some(url) => url.clone(),
            None => {
                let derived = self.token_url.replace("/token", "/revoke");
                warn!(
                    provider = %self.provider,
                    derived = %derived,
                    "no revoke_url configured; deriving from token_url"
                );
                derived
            }
        }
    }
}

/// Validating builder for [`ProviderConfig`]
///
/// Fails fast when `client_id`, `client_secret`, or `redirect_uri` is
/// missing or empty, and when either endpoint URL does not parse. A partial
/// registry entry can therefore never produce an unusable client.
#[derive(Debug)]
pub struct ProviderConfigBuilder {
    provider: String,
    client_id: Option<String>,
    client_secret: Option<String>,
    redirect_uri: Option<String>,
    authorization_url: Option<String>,
    token_url: Option<String>,
    revoke_url: Option<String>,
    scopes: Vec<String>,
    response_type: Option<String>,
    access_type: Option<String>,
    prompt: Option<String>,
}

impl ProviderConfigBuilder {
    fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            client_id: None,
            client_secret: None,
            redirect_uri: None,
            authorization_url: None,
            token_url: None,
            revoke_url: None,
            scopes: Vec::new(),
            response_type: None,
            access_type: None,
            prompt: None,
        }
    }

    #[must_use]
    pub fn client_id(mut self, value: impl Into<String>) -> Self {
        self.client_id = Some(value.into());
        self
    }

    #[must_use]
    pub fn client_secret(mut self, value: impl Into<String>) -> Self {
        self.client_secret = Some(value.into());
        self
    }

    #[must_use]
    pub fn redirect_uri(mut self, value: impl Into<String>) -> Self {
        self.redirect_uri = Some(value.into());
        self
    }

    #[must_use]
    pub fn authorization_url(mut self, value: impl Into<String>) -> Self {
        self.authorization_url = Some(value.into());
        self
    }

    #[must_use]
    pub fn token_url(mut self, value: impl Into<String>) -> Self {
        self.token_url = Some(value.into());
        self
    }

    #[must_use]
    pub fn revoke_url(mut self, value: impl Into<String>) -> Self {
        self.revoke_url = Some(value.into());
        self
    }

    #[must_use]
    pub fn scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    #[must_use]
    pub fn response_type(mut self, value: impl Into<String>) -> Self {
        self.response_type = Some(value.into());
        self
    }

    #[must_use]
    pub fn access_type(mut self, value: impl Into<String>) -> Self {
        self.access_type = Some(value.into());
        self
    }

    #[must_use]
    pub fn prompt(mut self, value: impl Into<String>) -> Self {
        self.prompt = Some(value.into());
        self
    }

    /// Build the configuration, validating required fields
    ///
    /// # Errors
    /// Returns a description of the first missing or invalid field. The
    /// message never includes secret material.
    pub fn build(self) -> Result<ProviderConfig, String> {
        let provider = self.provider;

        let client_id = require_non_empty("client_id", self.client_id, &provider)?;
        let client_secret = require_non_empty("client_secret", self.client_secret, &provider)?;
        let redirect_uri = require_non_empty("redirect_uri", self.redirect_uri, &provider)?;
        let authorization_url =
            require_non_empty("authorization_url", self.authorization_url, &provider)?;
        let token_url = require_non_empty("token_url", self.token_url, &provider)?;

        require_valid_url("authorization_url", &authorization_url, &provider)?;
        require_valid_url("token_url", &token_url, &provider)?;
        if let Some(revoke_url) = &self.revoke_url {
            require_valid_url("revoke_url", revoke_url, &provider)?;
        }

        Ok(ProviderConfig {
            provider,
            client_id,
            client_secret,
            redirect_uri,
            authorization_url,
            token_url,
            revoke_url: self.revoke_url,
            scopes: self.scopes,
            response_type: self.response_type.unwrap_or_else(|| "code".to_string()),
            access_type: self.access_type,
            prompt: self.prompt,
        })
    }
}

fn require_non_empty(field: &str, value: Option<String>, provider: &str) -> Result<String, String> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(format!("provider '{provider}' is missing required field '{field}'")),
    }
}

fn require_valid_url(field: &str, value: &str, provider: &str) -> Result<(), String> {
    url::Url::parse(value)
        .map(|_| ())
        .map_err(|err| format!("provider '{provider}' has invalid {field}: {err}"))
}
