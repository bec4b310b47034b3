//! Admin API token generation and verification. Tokens are shown to the
//! caller once, at creation time; only their SHA-256 hash is stored.

use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Generates a fresh opaque bearer token, `yae_` followed by 64 hex
/// characters of randomness drawn from two UUIDv4s.
pub fn generate_token() -> String {
    format!(
        "yae_{}{}",
        Uuid::new_v4().simple(),
        Uuid::new_v4().simple()
    )
}

/// Hashes a token for storage/comparison. Never store the plaintext token.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// Constant-time equality check over two hex hash strings, to avoid a
/// timing side-channel on token verification.
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    let mut diff: u8 = 0;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

/// Verifies `candidate_token` against a stored hash.
pub fn verify_token(candidate_token: &str, stored_hash: &str) -> bool {
    constant_time_eq(&hash_token(candidate_token), stored_hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: a freshly generated token verifies against its own hash.
    #[test]
    fn generated_token_verifies_against_its_hash() {
        let token = generate_token();
        let hash = hash_token(&token);
        assert!(verify_token(&token, &hash));
    }

    /// **Scenario**: a wrong token fails verification.
    #[test]
    fn wrong_token_fails_verification() {
        let hash = hash_token(&generate_token());
        assert!(!verify_token("not-the-token", &hash));
    }

    /// **Scenario**: constant_time_eq rejects differing lengths without panicking.
    #[test]
    fn constant_time_eq_handles_length_mismatch() {
        assert!(!constant_time_eq("abc", "abcd"));
    }
}
