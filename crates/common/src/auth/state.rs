//! Signed state parameter codec for OAuth 2.0 redirects
//!
//! The `state` parameter binds a provider callback to the authorization
//! attempt that produced it, defending against CSRF across the redirect
//! round-trip. Caller context is serialized, signed with HMAC-SHA256 under a
//! process-wide secret, and base64-encoded into an opaque envelope. On
//! callback the envelope is verified in constant time and rejected once it
//! outlives a bounded freshness window.
//!
//! Because all per-flow context travels inside the signed token, the codec
//! needs no storage and any web node holding the secret can verify any
//! state.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Maximum age of a signed state before it is rejected.
pub const STATE_FRESHNESS_WINDOW_SECS: i64 = 600;

/// Caller context carried through the provider redirect.
///
/// Created fresh for every authorization attempt and never persisted by this
/// crate; it exists only inside the signed token traveling through the
/// third party.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthState {
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
    pub integration_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_url: Option<String>,
    /// Random value preventing signature precomputation
    pub nonce: String,
    /// Creation time, unix milliseconds
    pub timestamp: i64,
}

impl OAuthState {
    /// Create a state for a fresh authorization attempt
    ///
    /// Generates the nonce and stamps the current wall clock.
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        organization_id: Option<String>,
        integration_id: i64,
        return_url: Option<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            organization_id,
            integration_id,
            return_url,
            nonce: generate_nonce(),
            timestamp: Utc::now().timestamp_millis(),
        }
    }
}

/// Generate a cryptographically random nonce
///
/// Returns a URL-safe base64-encoded random string of 32 bytes (43
/// characters).
#[must_use]
pub fn generate_nonce() -> String {
    let mut rng = rand::thread_rng();
    let random_bytes: Vec<u8> = (0..32).map(|_| rng.gen()).collect();
    URL_SAFE_NO_PAD.encode(random_bytes)
}

/// Transport envelope wrapping a serialized state.
///
/// The signature covers `data`, `timestamp`, and `nonce`; the envelope
/// timestamp (not any field inside `data`) drives the freshness check.
#[derive(Debug, Serialize, Deserialize)]
struct StateEnvelope {
    data: String,
    timestamp: i64,
    nonce: String,
    signature: String,
}

/// Signs and verifies opaque state tokens.
///
/// One codec per process, keyed by a shared secret that is read-only after
/// construction. There is no default secret: construction fails rather than
/// falling back to a guessable value.
#[derive(Clone)]
pub struct StateCodec {
    secret: Vec<u8>,
}

impl StateCodec {
    /// Create a codec from an explicit secret
    ///
    /// # Errors
    /// Returns an error for an empty secret.
    pub fn new(secret: impl Into<Vec<u8>>) -> Result<Self, String> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err("state-signing secret must not be empty".to_string());
        }
        Ok(Self { secret })
    }

    /// Encode a state into an opaque signed token
    ///
    /// Serializes the state, mints a fresh envelope timestamp and nonce,
    /// signs the three with HMAC-SHA256, and base64url-encodes the result.
    ///
    /// # Errors
    /// Returns an error only when serialization fails.
    pub fn encode(&self, state: &OAuthState) -> Result<String, String> {
        let data = serde_json::to_string(state)
            .map_err(|err| format!("failed to serialize state: {err}"))?;
        let timestamp = Utc::now().timestamp_millis();
        let nonce = generate_nonce();
        let signature = self
            .sign(&data, timestamp, &nonce)
            .ok_or_else(|| "failed to initialize state signer".to_string())?;

        let envelope = StateEnvelope { data, timestamp, nonce, signature };
        let bytes = serde_json::to_vec(&envelope)
            .map_err(|err| format!("failed to serialize state envelope: {err}"))?;

        Ok(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// Decode and verify an opaque state token
    ///
    /// # Returns
    /// The embedded state when the signature matches and the envelope is
    /// within the freshness window; `None` for every other condition. There
    /// is no partially-trusted result and malformed input never panics.
    #[must_use]
    pub fn decode(&self, encoded: &str) -> Option<OAuthState> {
        self.decode_at(encoded, Utc::now())
    }

    /// Decode and verify against an injected clock
    ///
    /// Signature verification runs before the freshness check so that the
    /// age of a forged envelope is never observable.
    #[must_use]
    pub fn decode_at(&self, encoded: &str, now: DateTime<Utc>) -> Option<OAuthState> {
        let bytes = URL_SAFE_NO_PAD.decode(encoded).ok()?;
        let envelope: StateEnvelope = serde_json::from_slice(&bytes).ok()?;

        let expected = self.sign(&envelope.data, envelope.timestamp, &envelope.nonce)?;
        if !constant_time_eq(expected.as_bytes(), envelope.signature.as_bytes()) {
            return None;
        }

        let age_ms = now.timestamp_millis() - envelope.timestamp;
        if age_ms > STATE_FRESHNESS_WINDOW_SECS * 1000 {
            return None;
        }

        serde_json::from_str(&envelope.data).ok()
    }

    /// Compute the signature over `"{data}.{timestamp}.{nonce}"`.
    fn sign(&self, data: &str, timestamp: i64, nonce: &str) -> Option<String> {
        // Hmac accepts keys of any length; the fallible constructor cannot
        // actually fail here, but the lint policy forbids unwrapping it.
        let mut mac = HmacSha256::new_from_slice(&self.secret).ok()?;
        mac.update(data.as_bytes());
        mac.update(b".");
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(nonce.as_bytes());
        Some(URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes()))
    }
}

impl std::fmt::Debug for StateCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print the secret
        f.debug_struct("StateCodec").finish_non_exhaustive()
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}

#[cfg(test)]
mod tests {
    //! Unit tests for auth::state.
    use chrono::Duration;

    use super::*;

    fn test_codec() -> StateCodec {
        StateCodec::new(b"unit-test-signing-secret".to_vec()).expect("codec")
    }

    fn sample_state() -> OAuthState {
        OAuthState::new(
            "user_1",
            Some("org_9".to_string()),
            7,
            Some("/dashboard/integrations".to_string()),
        )
    }

    /// Validates the round-trip property: a state decoded within the
    /// freshness window equals the state that was encoded.
    #[test]
    fn test_encode_decode_round_trip() {
        let codec = test_codec();
        let state = sample_state();

        let encoded = codec.encode(&state).expect("encode");
        let decoded = codec.decode(&encoded).expect("decode within window");

        assert_eq!(decoded, state);
    }

    /// Flipping any single byte of the encoded token must yield `None`.
    #[test]
    fn test_tamper_detection() {
        let codec = test_codec();
        let encoded = codec.encode(&sample_state()).expect("encode");

        for index in 0..encoded.len() {
            let mut bytes = encoded.clone().into_bytes();
            bytes[index] = if bytes[index] == b'A' { b'B' } else { b'A' };
            let tampered = String::from_utf8(bytes).expect("ascii");
            if tampered == encoded {
                continue;
            }
            assert!(
                codec.decode(&tampered).is_none(),
                "tampered byte at {index} was accepted"
            );
        }
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let codec = test_codec();
        let other = StateCodec::new(b"a-different-secret".to_vec()).expect("codec");

        let encoded = codec.encode(&sample_state()).expect("encode");
        assert!(other.decode(&encoded).is_none());
    }

    /// Validates the freshness window with an injected clock: nine minutes
    /// is inside the window, eleven minutes is out.
    #[test]
    fn test_freshness_window() {
        let codec = test_codec();
        let encoded = codec.encode(&sample_state()).expect("encode");

        let nine_minutes_later = Utc::now() + Duration::minutes(9);
        assert!(codec.decode_at(&encoded, nine_minutes_later).is_some());

        let eleven_minutes_later = Utc::now() + Duration::minutes(11);
        assert!(codec.decode_at(&encoded, eleven_minutes_later).is_none());
    }

    /// Structurally invalid input is just another invalid input: `None`,
    /// never a panic.
    #[test]
    fn test_malformed_input_decodes_to_none() {
        let codec = test_codec();

        assert!(codec.decode("").is_none());
        assert!(codec.decode("not base64 !!!").is_none());
        assert!(codec.decode(&URL_SAFE_NO_PAD.encode(b"not json")).is_none());
        assert!(codec.decode(&URL_SAFE_NO_PAD.encode(br#"{"data":"{}"}"#)).is_none());
    }

    #[test]
    fn test_envelope_nonce_varies_between_encodings() {
        let codec = test_codec();
        let state = sample_state();

        let first = codec.encode(&state).expect("encode");
        let second = codec.encode(&state).expect("encode");
        assert_ne!(first, second);
    }

    #[test]
    fn test_nonce_is_base64url_without_padding() {
        let nonce = generate_nonce();
        assert!(nonce.len() >= 43);
        assert!(!nonce.contains('='));
        assert!(!nonce.contains('+'));
        assert!(!nonce.contains('/'));
    }

    #[test]
    fn test_states_generate_unique_nonces() {
        let state1 = OAuthState::new("u", None, 1, None);
        let state2 = OAuthState::new("u", None, 1, None);
        assert_ne!(state1.nonce, state2.nonce);
    }

    #[test]
    fn test_empty_secret_rejected() {
        assert!(StateCodec::new(Vec::new()).is_err());
    }
}
