//! Session token generation and comparison.

use argon2::password_hash::rand_core::{OsRng, RngCore};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use sha2::{Digest, Sha256};

use journal_core::config::MIN_TOKEN_BYTES;
use journal_entity::session::SessionToken;

/// Generate a fresh token from `bytes` bytes of OS randomness.
///
/// Requests below the minimum entropy are raised to it. The encoding is
/// URL-safe base64 without padding so the token fits in a header.
pub fn generate_token(bytes: usize) -> SessionToken {
    let mut buf = vec![0u8; bytes.max(MIN_TOKEN_BYTES)];
    OsRng.fill_bytes(&mut buf);
    SessionToken::new(URL_SAFE_NO_PAD.encode(&buf))
}

/// SHA-256 of the token, hex-encoded. Used as the index key so raw tokens
/// are never map keys.
pub fn hash_token(token: &SessionToken) -> String {
    hex::encode(Sha256::digest(token.expose().as_bytes()))
}

/// Compare two byte strings without short-circuiting on the first
/// difference.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Whether two tokens are equal, compared in constant time.
pub fn tokens_match(a: &SessionToken, b: &SessionToken) -> bool {
    constant_time_eq(hash_token(a).as_bytes(), hash_token(b).as_bytes())
}
