//! OAuth connection orchestration for third-party integrations.
//!
//! This module joins the static provider registry to the shared OAuth core
//! and exposes the operations the CRUD layer calls: start a connection,
//! complete the callback, refresh near expiry, disconnect, and proxy
//! authenticated API calls. The manager holds no per-flow state; everything
//! a callback needs travels inside the signed state parameter.

use finlink_common::auth::{
    OAuthClient, OAuthClientError, OAuthState, ProviderConfig, StateCodec, TokenSet,
    TokenTypeHint,
};
use finlink_domain::{ConnectedIntegration, FinlinkError, Result};
use reqwest::{Method, Response};
use tracing::info;

use super::registry::ProviderKind;

/// Credentials issued to the platform by a provider.
#[derive(Debug, Clone)]
pub struct IntegrationCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

/// Caller context for starting a connection attempt.
#[derive(Debug, Clone)]
pub struct ConnectionRequest {
    pub user_id: String,
    pub organization_id: Option<String>,
    pub integration_id: i64,
    pub return_url: Option<String>,
}

/// Authorization redirect handed back to the web layer.
#[derive(Debug, Clone)]
pub struct AuthorizationRedirect {
    pub provider: String,
    pub authorization_url: String,
}

/// Per-provider OAuth manager.
///
/// Construct one per `(provider, credentials)` pair via dependency
/// injection; instances are cheap and hold only read-only configuration, so
/// multi-tenant, multi-provider usage needs no coordination.
#[derive(Debug, Clone)]
pub struct IntegrationOAuthManager {
    kind: ProviderKind,
    client: OAuthClient,
}

impl IntegrationOAuthManager {
    /// Create a manager from a registry entry and caller credentials.
    ///
    /// # Errors
    /// Fails fast with `FinlinkError::Config` when a required credential is
    /// missing — before any authorization URL is ever generated.
    pub fn new(
        kind: ProviderKind,
        credentials: IntegrationCredentials,
        codec: StateCodec,
    ) -> Result<Self> {
        let entry = kind.entry();

        let mut builder = ProviderConfig::builder(kind.as_str())
            .client_id(credentials.client_id)
            .client_secret(credentials.client_secret)
            .redirect_uri(credentials.redirect_uri)
            .authorization_url(entry.authorization_url)
            .token_url(entry.token_url)
            .scopes(entry.default_scopes.iter().map(|s| (*s).to_string()).collect())
            .response_type(entry.response_type);

        if let Some(revoke_url) = entry.revoke_url {
            builder = builder.revoke_url(revoke_url);
        }
        if let Some(access_type) = entry.access_type {
            builder = builder.access_type(access_type);
        }
        if let Some(prompt) = entry.prompt {
            builder = builder.prompt(prompt);
        }

        let config = builder.build().map_err(FinlinkError::Config)?;

        Ok(Self { kind, client: OAuthClient::new(config, codec) })
    }

    /// Create a manager from an explicit configuration.
    ///
    /// Used by tests and for self-hosted deployments whose endpoints differ
    /// from the public registry entries.
    #[must_use]
    pub fn with_config(kind: ProviderKind, config: ProviderConfig, codec: StateCodec) -> Self {
        Self { kind, client: OAuthClient::new(config, codec) }
    }

    /// Start a connection attempt.
    ///
    /// Mints a fresh signed state for the request context and returns the
    /// authorization URL to redirect the user to.
    ///
    /// # Errors
    /// Returns `FinlinkError::Security` if state encoding fails.
    pub fn begin_connection(&self, request: ConnectionRequest) -> Result<AuthorizationRedirect> {
        let state = OAuthState::new(
            request.user_id,
            request.organization_id,
            request.integration_id,
            request.return_url,
        );

        let authorization_url =
            self.client.authorization_url(&state).map_err(map_oauth_client_error)?;

        info!(
            provider = %self.kind,
            integration_id = state.integration_id,
            "authorization flow started"
        );

        Ok(AuthorizationRedirect {
            provider: self.kind.as_str().to_string(),
            authorization_url,
        })
    }

    /// Complete a connection from the provider callback.
    ///
    /// Verifies the state, exchanges the code, and returns the decoded
    /// caller context together with the fresh token set. The caller persists
    /// the result; nothing is retained here.
    ///
    /// # Errors
    /// Returns `FinlinkError::Security` for an invalid state (no network
    /// call is made) and `FinlinkError::Auth` for a rejected exchange.
    pub async fn complete_connection(
        &self,
        code: &str,
        encoded_state: &str,
    ) -> Result<(OAuthState, TokenSet)> {
        let state = self
            .client
            .codec()
            .decode(encoded_state)
            .ok_or_else(|| map_oauth_client_error(OAuthClientError::InvalidState))?;

        let tokens = self
            .client
            .exchange_code_for_tokens(code, encoded_state)
            .await
            .map_err(map_oauth_client_error)?;

        info!(
            provider = %self.kind,
            user_id = %state.user_id,
            integration_id = state.integration_id,
            "integration connected"
        );

        Ok((state, tokens))
    }

    /// Refresh an access token near expiry.
    ///
    /// # Errors
    /// Returns `FinlinkError::Auth` when the provider rejects the refresh.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenSet> {
        self.client.refresh_access_token(refresh_token).await.map_err(map_oauth_client_error)
    }

    /// Disconnect an integration, best effort.
    ///
    /// Revokes the access token and, when present, the refresh token. A
    /// `false` result means at least one revocation did not go through; the
    /// local disconnect proceeds either way.
    pub async fn disconnect(&self, access_token: &str, refresh_token: Option<&str>) -> bool {
        let mut revoked = self.client.revoke_token(access_token, TokenTypeHint::AccessToken).await;

        if let Some(refresh_token) = refresh_token {
            revoked &=
                self.client.revoke_token(refresh_token, TokenTypeHint::RefreshToken).await;
        }

        info!(provider = %self.kind, revoked, "integration disconnected");

        revoked
    }

    /// Proxy an authenticated API call to the provider.
    ///
    /// # Errors
    /// Returns `FinlinkError::Network` on transport failure; HTTP status
    /// handling belongs to the caller.
    pub async fn api_request(
        &self,
        method: Method,
        url: &str,
        tokens: &TokenSet,
        headers: &[(String, String)],
    ) -> Result<Response> {
        self.client
            .authenticated_request(method, url, tokens, headers, None)
            .await
            .map_err(map_oauth_client_error)
    }

    /// Assemble the persisted record for a completed connection.
    #[must_use]
    pub fn connected_integration(
        &self,
        state: &OAuthState,
        tokens: &TokenSet,
    ) -> ConnectedIntegration {
        ConnectedIntegration {
            integration_id: state.integration_id,
            provider: self.kind.as_str().to_string(),
            access_token: tokens.access_token.clone(),
            refresh_token: tokens.refresh_token.clone(),
            expires_at: tokens.expires_at,
            scope: tokens.scope.clone(),
        }
    }

    /// Provider this manager is bound to.
    #[must_use]
    pub fn provider(&self) -> ProviderKind {
        self.kind
    }

    /// Underlying OAuth client, for advanced callers.
    #[must_use]
    pub fn client(&self) -> &OAuthClient {
        &self.client
    }
}

fn map_oauth_client_error(err: OAuthClientError) -> FinlinkError {
    match err {
        OAuthClientError::RequestFailed(e) => FinlinkError::Network(e.to_string()),
        OAuthClientError::InvalidState => {
            FinlinkError::Security("callback state failed verification".to_string())
        }
        OAuthClientError::ExchangeFailed { status, body } => {
            FinlinkError::Auth(format!("token exchange failed (status {status}): {body}"))
        }
        OAuthClientError::RefreshFailed { status, body } => {
            FinlinkError::Auth(format!("token refresh failed (status {status}): {body}"))
        }
        OAuthClientError::ParseError(msg) => FinlinkError::InvalidInput(msg),
        OAuthClientError::NoRefreshToken => {
            FinlinkError::Auth("no refresh token issued".to_string())
        }
        OAuthClientError::ConfigError(msg) => FinlinkError::Config(msg),
        OAuthClientError::StateError(msg) => FinlinkError::Security(msg),
    }
}
