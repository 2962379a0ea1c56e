//! Core OAuth 2.0 integration infrastructure
//!
//! This module provides the OAuth 2.0 authorization-code implementation used
//! to connect Finlink to external services (payment processors, messaging
//! platforms, accounting software, mail/calendar providers) on a user's
//! behalf. Token persistence belongs to the calling layer; nothing here
//! retains credentials between calls.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │   OAuthClient    │  Stateless flow orchestrator (HTTP)
//! └────────┬─────────┘
//!          │
//!          ├──► StateCodec       (Signed, time-bounded state parameter)
//!          ├──► ProviderConfig   (Validated per-provider endpoints/scopes)
//!          └──► TokenSet         (Token model + expiry bookkeeping)
//! ```
//!
//! # Security Features
//!
//! - **Signed State**: CSRF defense across the redirect round-trip; caller
//!   context travels inside an HMAC-SHA256 envelope, never in shared memory
//! - **Constant-Time Comparison**: Prevents timing attacks on state
//!   verification
//! - **Freshness Window**: Signed states expire after ten minutes
//! - **Fail-Fast Configuration**: Missing credentials surface at construction
//!   time, not at the first network call
//!
//! # Module Organization
//!
//! - **[`types`]**: Provider configuration and token types (`ProviderConfig`,
//!   `TokenSet`, `OAuthError`)
//! - **[`state`]**: Signed state codec (`OAuthState`, `StateCodec`)
//! - **[`client`]**: OAuth HTTP client for exchange, refresh, revocation, and
//!   authenticated dispatch
//! - **[`traits`]**: Dependency-injection seam for mocking the flow

pub mod client;
pub mod state;
pub mod traits;
pub mod types;

// Re-export commonly used types and functions
pub use client::{OAuthClient, OAuthClientError, TokenTypeHint};
pub use state::{generate_nonce, OAuthState, StateCodec, STATE_FRESHNESS_WINDOW_SECS};
pub use traits::OAuthClientTrait;
pub use types::{OAuthError, ProviderConfig, ProviderConfigBuilder, TokenResponse, TokenSet};
