//! Integration tests for the connection manager
//!
//! Drives the full connect → refresh → disconnect lifecycle against a mock
//! provider, and exercises the mocking seam downstream callers use.

use finlink_common::auth::{OAuthClientTrait, ProviderConfig, StateCodec};
use finlink_common::testing::MockOAuthClient;
use finlink_infra::integrations::manager::{ConnectionRequest, IntegrationOAuthManager};
use finlink_infra::integrations::registry::ProviderKind;
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn init_tracing() {
    tracing_subscriber::fmt().with_env_filter("info").with_test_writer().try_init().ok();
}

fn test_codec() -> StateCodec {
    StateCodec::new(b"connection-flow-test-secret".to_vec()).expect("codec")
}

fn manager_for(base_uri: &str) -> IntegrationOAuthManager {
    let config = ProviderConfig::builder("stripe")
        .client_id("client_id")
        .client_secret("client_secret")
        .redirect_uri("https://app.finlink.io/integrations/callback")
        .authorization_url(format!("{base_uri}/oauth/authorize"))
        .token_url(format!("{base_uri}/oauth/token"))
        .revoke_url(format!("{base_uri}/oauth/revoke"))
        .scopes(vec!["read_write".to_string()])
        .build()
        .expect("provider config");

    IntegrationOAuthManager::with_config(ProviderKind::Stripe, config, test_codec())
}

fn connection_request(user_id: &str, integration_id: i64) -> ConnectionRequest {
    ConnectionRequest {
        user_id: user_id.to_string(),
        organization_id: Some("org_1".to_string()),
        integration_id,
        return_url: Some("/dashboard/integrations".to_string()),
    }
}

fn state_param(authorization_url: &str) -> &str {
    authorization_url
        .split("state=")
        .nth(1)
        .and_then(|rest| rest.split('&').next())
        .expect("state parameter present")
}

/// The full lifecycle: begin → callback → persisted record → refresh →
/// disconnect, with the state round-tripping through the authorization URL
/// exactly as the web layer would see it.
#[tokio::test]
async fn full_connection_lifecycle() {
    init_tracing();

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "access_live",
            "refresh_token": "refresh_live",
            "expires_in": 3600,
            "scope": "read_write",
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "access_rotated",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/oauth/revoke"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&server)
        .await;

    let manager = manager_for(&server.uri());

    // Begin: the redirect carries a signed state for this exact request
    let redirect = manager.begin_connection(connection_request("u1", 7)).expect("redirect");
    assert!(redirect.authorization_url.contains("client_id=client_id"));

    // Callback: the provider sends code + state back through the user
    let encoded_state = state_param(&redirect.authorization_url);
    let (state, tokens) =
        manager.complete_connection("code123", encoded_state).await.expect("connection");

    assert_eq!(state.user_id, "u1");
    assert_eq!(state.integration_id, 7);
    assert_eq!(tokens.access_token, "access_live");

    // The caller persists this shape; the manager retains nothing
    let record = manager.connected_integration(&state, &tokens);
    assert_eq!(record.provider, "stripe");
    assert_eq!(record.integration_id, 7);
    assert!(record.expires_at.is_some());

    // Refresh near expiry: provider omits the refresh token, ours survives
    let refreshed = manager.refresh("refresh_live").await.expect("refresh");
    assert_eq!(refreshed.access_token, "access_rotated");
    assert_eq!(refreshed.refresh_token.as_deref(), Some("refresh_live"));

    // Disconnect revokes both credentials
    assert!(manager.disconnect(&refreshed.access_token, refreshed.refresh_token.as_deref()).await);
}

/// A replayed callback outside the freshness window, or a state minted for
/// another deployment, dies locally without touching the provider.
#[tokio::test]
async fn stale_or_foreign_state_never_reaches_the_provider() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let manager = manager_for(&server.uri());

    let foreign_codec = StateCodec::new(b"other-deployment-secret".to_vec()).expect("codec");
    let foreign = foreign_codec
        .encode(&finlink_common::auth::OAuthState::new("u9", None, 9, None))
        .expect("encode");

    let result = manager.complete_connection("code123", &foreign).await;
    assert!(result.is_err());

    let requests = server.received_requests().await.expect("request recording");
    assert!(requests.is_empty());
}

/// Disconnect is best effort: an unreachable revoke endpoint yields `false`
/// and never an error, so the local disconnect can proceed.
#[tokio::test]
async fn disconnect_is_best_effort_when_endpoint_unreachable() {
    init_tracing();

    let config = ProviderConfig::builder("stripe")
        .client_id("client_id")
        .client_secret("client_secret")
        .redirect_uri("https://app.finlink.io/integrations/callback")
        .authorization_url("https://connect.stripe.com/oauth/authorize")
        .token_url("https://connect.stripe.com/oauth/token")
        .revoke_url("http://127.0.0.1:9/oauth/revoke")
        .scopes(vec!["read_write".to_string()])
        .build()
        .expect("provider config");

    let manager = IntegrationOAuthManager::with_config(ProviderKind::Stripe, config, test_codec());

    assert!(!manager.disconnect("access_abc", Some("refresh_def")).await);
}

/// Downstream callers depend on the flow trait, not the concrete client, so
/// connection logic stays testable without any network.
#[tokio::test]
async fn downstream_callers_can_mock_the_flow() {
    async fn connect_with<C: OAuthClientTrait>(client: &C) -> Option<String> {
        let tokens = client.exchange_code_for_tokens("code", "state").await.ok()?;
        Some(tokens.access_token)
    }

    let mock = MockOAuthClient::new();
    let access_token = connect_with(&mock).await.expect("mocked exchange");

    assert_eq!(access_token, "mock_access_token");
    assert_eq!(mock.exchange_call_count(), 1);
}
