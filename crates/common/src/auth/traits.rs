//! Traits for OAuth flow operations
//!
//! This trait abstracts the provider-facing flow to enable testing with mock
//! implementations and to let downstream callers accept any flow
//! implementation via dependency injection.

use async_trait::async_trait;

use super::client::{OAuthClientError, TokenTypeHint};
use super::state::OAuthState;
use super::types::TokenSet;

/// Trait for OAuth client operations
#[async_trait]
pub trait OAuthClientTrait: Send + Sync {
    /// Build the provider authorization URL for the given state
    ///
    /// # Errors
    /// Returns an error if state encoding fails.
    fn authorization_url(&self, state: &OAuthState) -> Result<String, OAuthClientError>;

    /// Exchange an authorization code for tokens
    ///
    /// # Arguments
    /// * `code` - Authorization code from the redirect callback
    /// * `encoded_state` - Opaque state parameter from the redirect callback
    ///
    /// # Errors
    /// Returns an error on state verification failure or a rejected
    /// exchange.
    async fn exchange_code_for_tokens(
        &self,
        code: &str,
        encoded_state: &str,
    ) -> Result<TokenSet, OAuthClientError>;

    /// Refresh the access token
    ///
    /// # Errors
    /// Returns an error if the provider rejects the refresh.
    async fn refresh_access_token(&self, refresh_token: &str)
        -> Result<TokenSet, OAuthClientError>;

    /// Revoke a token, best effort; `false` means the provider was not
    /// reachable or rejected the request
    async fn revoke_token(&self, token: &str, hint: TokenTypeHint) -> bool;
}
