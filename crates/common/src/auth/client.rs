//! OAuth 2.0 client for third-party integrations
//!
//! Handles the authorization-code flow against an external provider:
//! - signed-state authorization URL construction
//! - authorization code exchange
//! - token refresh
//! - best-effort revocation
//! - authenticated request dispatch

use reqwest::{header, Client, Method, Response};
use tracing::{debug, info, warn};

use super::state::{OAuthState, StateCodec};
use super::types::{OAuthError, ProviderConfig, TokenResponse, TokenSet};

/// Error type for OAuth client operations
#[derive(Debug)]
pub enum OAuthClientError {
    /// HTTP request failed
    RequestFailed(reqwest::Error),

    /// State parameter failed verification (CSRF defense)
    InvalidState,

    /// Provider rejected the authorization-code exchange
    ExchangeFailed { status: u16, body: String },

    /// Provider rejected the refresh request
    RefreshFailed { status: u16, body: String },

    /// Failed to parse a provider response
    ParseError(String),

    /// No refresh token available
    NoRefreshToken,

    /// Invalid configuration
    ConfigError(String),

    /// State encoding failed
    StateError(String),
}

impl std::fmt::Display for OAuthClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RequestFailed(e) => write!(f, "HTTP request failed: {e}"),
            Self::InvalidState => {
                // Deliberately unspecific: signature material and the exact
                // failure mode stay out of error messages.
                write!(f, "state parameter failed verification")
            }
            Self::ExchangeFailed { status, body } => {
                write!(f, "token exchange failed (status {status}): {body}")
            }
            Self::RefreshFailed { status, body } => {
                write!(f, "token refresh failed (status {status}): {body}")
            }
            Self::ParseError(msg) => write!(f, "parse error: {msg}"),
            Self::NoRefreshToken => write!(f, "no refresh token available"),
            Self::ConfigError(msg) => write!(f, "configuration error: {msg}"),
            Self::StateError(msg) => write!(f, "state encoding error: {msg}"),
        }
    }
}

impl std::error::Error for OAuthClientError {}

impl From<reqwest::Error> for OAuthClientError {
    fn from(err: reqwest::Error) -> Self {
        Self::RequestFailed(err)
    }
}

/// Hint passed to the revocation endpoint (RFC 7009 `token_type_hint`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenTypeHint {
    AccessToken,
    RefreshToken,
}

impl TokenTypeHint {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AccessToken => "access_token",
            Self::RefreshToken => "refresh_token",
        }
    }
}

/// Stateless OAuth 2.0 client for one configured provider
///
/// All per-flow context travels inside the signed state parameter, so a
/// single instance serves any number of concurrent authorization flows
/// across users without coordination. Construct one per
/// `(ProviderConfig, StateCodec)` pair via dependency injection; there is no
/// process-wide singleton.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    config: ProviderConfig,
    codec: StateCodec,
    client: Client,
}

impl OAuthClient {
    /// Create a new OAuth client with the given configuration and codec
    ///
    /// The underlying HTTP client carries an explicit 30-second timeout so a
    /// hung provider cannot stall a caller indefinitely.
    #[must_use]
    pub fn new(config: ProviderConfig, codec: StateCodec) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { config, codec, client }
    }

    /// Build the provider authorization URL for a fresh flow
    ///
    /// Pure apart from the nonce and timestamp minted inside the encoded
    /// state: no I/O is performed. The query carries `client_id`,
    /// `redirect_uri`, `response_type`, the space-joined scopes, the signed
    /// state, and `access_type`/`prompt` when the provider configuration
    /// specifies them.
    ///
    /// # Errors
    /// Returns an error if state encoding fails.
    pub fn authorization_url(&self, state: &OAuthState) -> Result<String, OAuthClientError> {
        let encoded_state = self.codec.encode(state).map_err(OAuthClientError::StateError)?;

        let mut params = vec![
            ("client_id".to_string(), self.config.client_id.clone()),
            ("redirect_uri".to_string(), self.config.redirect_uri.clone()),
            ("response_type".to_string(), self.config.response_type.clone()),
            ("scope".to_string(), self.config.scope_string()),
            ("state".to_string(), encoded_state),
        ];

        if let Some(access_type) = &self.config.access_type {
            params.push(("access_type".to_string(), access_type.clone()));
        }
        if let Some(prompt) = &self.config.prompt {
            params.push(("prompt".to_string(), prompt.clone()));
        }

        let query_string = params
            .iter()
            .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        Ok(format!("{}?{}", self.config.authorization_url, query_string))
    }

    /// Exchange an authorization code for tokens
    ///
    /// The encoded state from the callback is verified first; a state that
    /// fails verification aborts the flow locally, before any network call.
    ///
    /// # Arguments
    /// * `code` - Authorization code from the redirect callback
    /// * `encoded_state` - Opaque state parameter from the redirect callback
    ///
    /// # Errors
    /// Returns `InvalidState` on a corrupted, forged, or stale state, and
    /// `ExchangeFailed` with the provider's raw error body on a non-2xx
    /// response.
    pub async fn exchange_code_for_tokens(
        &self,
        code: &str,
        encoded_state: &str,
    ) -> Result<TokenSet, OAuthClientError> {
        let state = self.codec.decode(encoded_state).ok_or(OAuthClientError::InvalidState)?;

        let request_body = [
            ("grant_type".to_string(), "authorization_code".to_string()),
            ("client_id".to_string(), self.config.client_id.clone()),
            ("client_secret".to_string(), self.config.client_secret.clone()),
            ("redirect_uri".to_string(), self.config.redirect_uri.clone()),
            ("code".to_string(), code.to_string()),
        ];

        debug!(
            provider = %self.config.provider,
            integration_id = state.integration_id,
            "exchanging authorization code"
        );

        let response = self.client.post(&self.config.token_url).form(&request_body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log_provider_error(&self.config.provider, "code exchange", &body);
            return Err(OAuthClientError::ExchangeFailed { status: status.as_u16(), body });
        }

        let token_response: TokenResponse =
            response.json().await.map_err(|e| OAuthClientError::ParseError(e.to_string()))?;

        info!(
            provider = %self.config.provider,
            user_id = %state.user_id,
            integration_id = state.integration_id,
            "authorization code exchanged"
        );

        Ok(token_response.into())
    }

    /// Refresh the access token
    ///
    /// Providers that rotate refresh tokens return a new one; when the
    /// response omits it, the caller-supplied refresh token is preserved
    /// unchanged in the returned set.
    ///
    /// # Errors
    /// Returns `NoRefreshToken` for an empty input (no network call) and
    /// `RefreshFailed` with the provider's raw error body on a non-2xx
    /// response.
    pub async fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenSet, OAuthClientError> {
        if refresh_token.is_empty() {
            return Err(OAuthClientError::NoRefreshToken);
        }

        let params = [
            ("grant_type".to_string(), "refresh_token".to_string()),
            ("client_id".to_string(), self.config.client_id.clone()),
            ("client_secret".to_string(), self.config.client_secret.clone()),
            ("refresh_token".to_string(), refresh_token.to_string()),
        ];

        let response = self.client.post(&self.config.token_url).form(&params).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log_provider_error(&self.config.provider, "token refresh", &body);
            return Err(OAuthClientError::RefreshFailed { status: status.as_u16(), body });
        }

        let token_response: TokenResponse =
            response.json().await.map_err(|e| OAuthClientError::ParseError(e.to_string()))?;

        let mut tokens: TokenSet = token_response.into();
        if tokens.refresh_token.is_none() {
            tokens.refresh_token = Some(refresh_token.to_string());
        }

        info!(provider = %self.config.provider, "access token refreshed");

        Ok(tokens)
    }

    /// Revoke a token, best effort
    ///
    /// Revocation is advisory: any transport failure or provider rejection
    /// is reported as `false` so that a local disconnect always completes.
    pub async fn revoke_token(&self, token: &str, hint: TokenTypeHint) -> bool {
        let revoke_url = self.config.revoke_endpoint();

        let params = [
            ("token".to_string(), token.to_string()),
            ("token_type_hint".to_string(), hint.as_str().to_string()),
            ("client_id".to_string(), self.config.client_id.clone()),
            ("client_secret".to_string(), self.config.client_secret.clone()),
        ];

        match self.client.post(&revoke_url).form(&params).send().await {
            Ok(response) if response.status().is_success() => {
                info!(provider = %self.config.provider, hint = hint.as_str(), "token revoked");
                true
            }
            Ok(response) => {
                warn!(
                    provider = %self.config.provider,
                    status = %response.status(),
                    "token revocation rejected"
                );
                false
            }
            Err(err) => {
                warn!(provider = %self.config.provider, error = %err, "token revocation failed");
                false
            }
        }
    }

    /// Dispatch an authenticated request to the provider's API
    ///
    /// Injects `Authorization: Bearer <token>` plus JSON `Accept` and
    /// `Content-Type` defaults. Caller headers are merged over the defaults,
    /// but the injected `Authorization` header is applied after the merge
    /// and always wins; an `Authorization` entry in `headers` is ignored by
    /// construction. Callers that need a different credential pass it via
    /// the dedicated `authorization` override.
    ///
    /// # Errors
    /// Returns `RequestFailed` on transport errors. Status handling is the
    /// caller's: the response is returned as-is.
    pub async fn authenticated_request(
        &self,
        method: Method,
        url: &str,
        token: &TokenSet,
        headers: &[(String, String)],
        authorization: Option<String>,
    ) -> Result<Response, OAuthClientError> {
        let mut header_map = header::HeaderMap::new();
        header_map.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));
        header_map
            .insert(header::CONTENT_TYPE, header::HeaderValue::from_static("application/json"));

        for (name, value) in headers {
            if name.eq_ignore_ascii_case("authorization") {
                continue;
            }
            let name = header::HeaderName::from_bytes(name.as_bytes()).map_err(|err| {
                OAuthClientError::ConfigError(format!("invalid header name '{name}': {err}"))
            })?;
            let value = header::HeaderValue::from_str(value).map_err(|err| {
                OAuthClientError::ConfigError(format!("invalid value for header '{name}': {err}"))
            })?;
            header_map.insert(name, value);
        }

        let auth_value = authorization
            .unwrap_or_else(|| format!("{} {}", token.token_type, token.access_token));
        let auth_value = header::HeaderValue::from_str(&auth_value).map_err(|err| {
            OAuthClientError::ConfigError(format!("invalid authorization value: {err}"))
        })?;
        header_map.insert(header::AUTHORIZATION, auth_value);

        debug!(provider = %self.config.provider, %method, %url, "dispatching authenticated request");

        self.client
            .request(method, url)
            .headers(header_map)
            .send()
            .await
            .map_err(OAuthClientError::RequestFailed)
    }

    /// Get a reference to the provider configuration
    #[must_use]
    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Get a reference to the state codec
    #[must_use]
    pub fn codec(&self) -> &StateCodec {
        &self.codec
    }
}

// Implement OAuthClientTrait for OAuthClient
#[async_trait::async_trait]
impl super::traits::OAuthClientTrait for OAuthClient {
    fn authorization_url(&self, state: &OAuthState) -> Result<String, OAuthClientError> {
        self.authorization_url(state)
    }

    async fn exchange_code_for_tokens(
        &self,
        code: &str,
        encoded_state: &str,
    ) -> Result<TokenSet, OAuthClientError> {
        self.exchange_code_for_tokens(code, encoded_state).await
    }

    async fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenSet, OAuthClientError> {
        self.refresh_access_token(refresh_token).await
    }

    async fn revoke_token(&self, token: &str, hint: TokenTypeHint) -> bool {
        self.revoke_token(token, hint).await
    }
}

/// Log a structured provider error when the body parses as RFC 6749 §5.2.
///
/// The raw body still travels back to the caller inside the error variant;
/// this only improves operator diagnostics.
fn log_provider_error(provider: &str, operation: &str, body: &str) {
    if let Ok(oauth_error) = serde_json::from_str::<OAuthError>(body) {
        warn!(provider = %provider, error = %oauth_error, "provider rejected {operation}");
    }
}
