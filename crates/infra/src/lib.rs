//! Infrastructure for Finlink's third-party integrations.
//!
//! Wires the shared OAuth core (`finlink-common`) to the concrete providers
//! the platform connects to: the static provider registry, environment
//! configuration loading, and the connection manager the CRUD layer calls.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod config;
pub mod integrations;

// Re-export commonly used items
pub use integrations::manager::{
    AuthorizationRedirect, ConnectionRequest, IntegrationCredentials, IntegrationOAuthManager,
};
pub use integrations::registry::{ProviderKind, RegistryEntry};
