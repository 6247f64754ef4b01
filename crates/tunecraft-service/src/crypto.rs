//! Session token signing.
//!
//! A session token is `<session-uuid>.<hex hmac-sha256(secret, session-uuid)>`.
//! Tokens that fail verification are treated as absent, so a client with a
//! forged or stale cookie simply starts a new session.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use tunecraft_core::SessionId;

type HmacSha256 = Hmac<Sha256>;

/// Compute HMAC-SHA256 and return hex-encoded result.
///
/// # Panics
///
/// This function will never panic in practice. The `expect` call is guarded by
/// the invariant that HMAC-SHA256 accepts keys of any size per RFC 2104.
#[must_use]
pub fn hmac_sha256_hex(secret: &str, message: &str) -> String {
    // INVARIANT: HMAC-SHA256 accepts keys of any size per RFC 2104, so
    // `new_from_slice` only fails if the Hmac implementation is broken.
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC-SHA256 accepts any key size");
    mac.update(message.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Constant-time string comparison.
#[must_use]
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}

/// Issues and verifies signed session tokens.
#[derive(Clone)]
pub struct SessionSigner {
    secret: String,
}

impl SessionSigner {
    /// Create a signer keyed by `secret`.
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Signed token for `session`.
    #[must_use]
    pub fn token_for(&self, session: &SessionId) -> String {
        let id = session.to_string();
        let signature = hmac_sha256_hex(&self.secret, &id);
        format!("{id}.{signature}")
    }

    /// Session carried by `token`, if the signature checks out.
    #[must_use]
    pub fn verify(&self, token: &str) -> Option<SessionId> {
        let (id, signature) = token.split_once('.')?;
        let expected = hmac_sha256_hex(&self.secret, id);
        if !constant_time_eq(&expected, signature) {
            return None;
        }
        id.parse().ok()
    }
}

impl std::fmt::Debug for SessionSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSigner").finish_non_exhaustive()
    }
}
