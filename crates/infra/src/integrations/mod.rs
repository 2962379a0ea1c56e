//! Third-party integration plumbing.
//!
//! - [`registry`]: static table of supported providers and their endpoints
//! - [`manager`]: per-provider connection orchestration for the CRUD layer

pub mod manager;
pub mod registry;

pub use manager::{
    AuthorizationRedirect, ConnectionRequest, IntegrationCredentials, IntegrationOAuthManager,
};
pub use registry::{ProviderKind, RegistryEntry};
