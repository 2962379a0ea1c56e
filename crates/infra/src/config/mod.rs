//! Environment configuration for the integrations core.

pub mod loader;

pub use loader::{
    load_dotenv, load_state_secret, manager_from_env, provider_credentials, state_codec_from_env,
    STATE_SECRET_ENV,
};
