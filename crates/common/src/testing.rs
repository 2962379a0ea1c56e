//! Testing utilities
//!
//! Mock implementation of the OAuth flow seam so downstream crates can
//! exercise connection logic without network access.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::auth::client::{OAuthClientError, TokenTypeHint};
use crate::auth::state::OAuthState;
use crate::auth::traits::OAuthClientTrait;
use crate::auth::types::TokenSet;

/// Mock OAuth client that simulates provider flows without network calls.
#[derive(Clone, Debug)]
pub struct MockOAuthClient {
    exchange_calls: Arc<Mutex<u32>>,
    refresh_called: Arc<Mutex<bool>>,
    refresh_response: Arc<Mutex<Option<TokenSet>>>,
    should_fail: Arc<Mutex<bool>>,
    revoke_result: Arc<Mutex<bool>>,
}

impl MockOAuthClient {
    /// Create a new mock OAuth client with default state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            exchange_calls: Arc::new(Mutex::new(0)),
            refresh_called: Arc::new(Mutex::new(false)),
            refresh_response: Arc::new(Mutex::new(None)),
            should_fail: Arc::new(Mutex::new(false)),
            revoke_result: Arc::new(Mutex::new(true)),
        }
    }

    /// Configure the response returned by `refresh_access_token`.
    pub fn set_refresh_response(&self, tokens: TokenSet) {
        *self.refresh_response.lock().expect("mock state poisoned") = Some(tokens);
    }

    /// Force exchange and refresh calls to fail.
    pub fn set_should_fail(&self, should_fail: bool) {
        *self.should_fail.lock().expect("mock state poisoned") = should_fail;
    }

    /// Configure the result of `revoke_token`.
    pub fn set_revoke_result(&self, result: bool) {
        *self.revoke_result.lock().expect("mock state poisoned") = result;
    }

    /// Number of exchange calls observed.
    #[must_use]
    pub fn exchange_call_count(&self) -> u32 {
        *self.exchange_calls.lock().expect("mock state poisoned")
    }

    /// Check whether refresh was called.
    #[must_use]
    pub fn was_refresh_called(&self) -> bool {
        *self.refresh_called.lock().expect("mock state poisoned")
    }
}

impl Default for MockOAuthClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OAuthClientTrait for MockOAuthClient {
    fn authorization_url(&self, state: &OAuthState) -> Result<String, OAuthClientError> {
        Ok(format!(
            "https://mock.provider.test/authorize?client_id=test&state=mock_{}",
            state.integration_id
        ))
    }

    async fn exchange_code_for_tokens(
        &self,
        _code: &str,
        _encoded_state: &str,
    ) -> Result<TokenSet, OAuthClientError> {
        *self.exchange_calls.lock().expect("mock state poisoned") += 1;

        if *self.should_fail.lock().expect("mock state poisoned") {
            return Err(OAuthClientError::ExchangeFailed {
                status: 400,
                body: r#"{"error":"invalid_grant"}"#.to_string(),
            });
        }

        Ok(TokenSet::new(
            "mock_access_token".to_string(),
            Some("mock_refresh_token".to_string()),
            Some(3600),
            Some("read write".to_string()),
            None,
        ))
    }

    async fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenSet, OAuthClientError> {
        *self.refresh_called.lock().expect("mock state poisoned") = true;

        if *self.should_fail.lock().expect("mock state poisoned") {
            return Err(OAuthClientError::RefreshFailed {
                status: 400,
                body: r#"{"error":"invalid_grant"}"#.to_string(),
            });
        }

        let response = self.refresh_response.lock().expect("mock state poisoned");
        if let Some(tokens) = response.as_ref() {
            Ok(tokens.clone())
        } else {
            Ok(TokenSet::new(
                "refreshed_access_token".to_string(),
                Some(refresh_token.to_string()),
                Some(3600),
                None,
                None,
            ))
        }
    }

    async fn revoke_token(&self, _token: &str, _hint: TokenTypeHint) -> bool {
        *self.revoke_result.lock().expect("mock state poisoned")
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for testing utilities.
    use super::*;

    #[tokio::test]
    async fn mock_counts_exchange_calls() {
        let mock = MockOAuthClient::new();
        assert_eq!(mock.exchange_call_count(), 0);

        let tokens =
            mock.exchange_code_for_tokens("code", "state").await.expect("mock exchange");
        assert_eq!(tokens.access_token, "mock_access_token");
        assert_eq!(mock.exchange_call_count(), 1);
    }

    #[tokio::test]
    async fn mock_refresh_reports_and_preserves_token() {
        let mock = MockOAuthClient::new();
        assert!(!mock.was_refresh_called());

        let tokens = mock.refresh_access_token("keep_me").await.expect("mock refresh");
        assert!(mock.was_refresh_called());
        assert_eq!(tokens.refresh_token.as_deref(), Some("keep_me"));
    }

    #[tokio::test]
    async fn mock_failure_modes() {
        let mock = MockOAuthClient::new();
        mock.set_should_fail(true);

        let result = mock.exchange_code_for_tokens("code", "state").await;
        assert!(matches!(result, Err(OAuthClientError::ExchangeFailed { status: 400, .. })));

        mock.set_revoke_result(false);
        assert!(!mock.revoke_token("token", TokenTypeHint::AccessToken).await);
    }
}
