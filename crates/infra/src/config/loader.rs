//! Configuration loader
//!
//! Loads integration configuration from environment variables.
//!
//! ## Environment Variables
//! - `FINLINK_STATE_SECRET`: secret signing every OAuth state token.
//!   Required; its absence is a startup failure, never a silent fallback.
//! - `FINLINK_<PROVIDER>_CLIENT_ID`: OAuth client ID for a provider
//! - `FINLINK_<PROVIDER>_CLIENT_SECRET`: OAuth client secret
//! - `FINLINK_<PROVIDER>_REDIRECT_URI`: registered redirect URI
//!
//! `<PROVIDER>` is the uppercase registry key (`STRIPE`, `SLACK`,
//! `QUICKBOOKS`, `XERO`, `GOOGLE`, `MICROSOFT`).

use finlink_common::auth::StateCodec;
use finlink_domain::{FinlinkError, Result};

use crate::integrations::manager::{IntegrationCredentials, IntegrationOAuthManager};
use crate::integrations::registry::ProviderKind;

/// Environment variable holding the process-wide state-signing secret.
pub const STATE_SECRET_ENV: &str = "FINLINK_STATE_SECRET";

/// Load `.env` files for development environments.
///
/// Missing files are fine; explicit environment variables always win.
pub fn load_dotenv() {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "loaded environment from .env file");
    }
}

/// Load the state-signing secret.
///
/// # Errors
/// Returns `FinlinkError::Config` when the variable is missing. There is no
/// default secret.
pub fn load_state_secret() -> Result<String> {
    env_var(STATE_SECRET_ENV)
}

/// Build the process-wide state codec from the environment.
///
/// # Errors
/// Returns `FinlinkError::Config` when the secret is missing or empty.
pub fn state_codec_from_env() -> Result<StateCodec> {
    let secret = load_state_secret()?;
    StateCodec::new(secret.into_bytes()).map_err(FinlinkError::Config)
}

/// Load the OAuth credentials configured for a provider.
///
/// # Errors
/// Returns `FinlinkError::Config` when any of the three variables is
/// missing.
pub fn provider_credentials(kind: ProviderKind) -> Result<IntegrationCredentials> {
    let key = kind.env_key();

    Ok(IntegrationCredentials {
        client_id: env_var(&format!("FINLINK_{key}_CLIENT_ID"))?,
        client_secret: env_var(&format!("FINLINK_{key}_CLIENT_SECRET"))?,
        redirect_uri: env_var(&format!("FINLINK_{key}_REDIRECT_URI"))?,
    })
}

/// Build a fully configured manager for a provider from the environment.
///
/// # Errors
/// Returns `FinlinkError::Config` when the signing secret or any provider
/// credential is missing.
pub fn manager_from_env(kind: ProviderKind) -> Result<IntegrationOAuthManager> {
    let codec = state_codec_from_env()?;
    let credentials = provider_credentials(kind)?;
    IntegrationOAuthManager::new(kind, credentials, codec)
}

/// Get required environment variable
///
/// # Errors
/// Returns `FinlinkError::Config` if the variable is not set.
fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .map_err(|_| FinlinkError::Config(format!("Missing required environment variable: {key}")))
}
