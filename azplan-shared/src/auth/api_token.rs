/// API token utilities
///
/// Generation, hashing and format checks for the opaque tokens users create
/// for programmatic access. Persistence lives in `models::api_token`.
///
/// # Token Format
///
/// `azp_` followed by 32 base62 characters (36 chars total). Only the
/// SHA-256 hex digest is stored, together with a short display prefix.
///
/// # Example
///
/// ```
/// use azplan_shared::auth::api_token::{generate_api_token, verify_api_token, validate_api_token_format};
///
/// let (token, hash) = generate_api_token();
/// assert!(token.starts_with("azp_"));
/// assert!(validate_api_token_format(&token));
/// assert!(verify_api_token(&token, &hash));
/// ```

use rand::Rng;
use sha2::{Digest, Sha256};

const TOKEN_RANDOM_LENGTH: usize = 32;

/// Prefix identifying A-Z Plan API tokens
pub const TOKEN_PREFIX: &str = "azp_";

/// Total token length (prefix + random part)
pub const API_TOKEN_LENGTH: usize = TOKEN_PREFIX.len() + TOKEN_RANDOM_LENGTH;

/// Characters of the token kept for display (`azp_` plus 8)
pub const DISPLAY_PREFIX_LENGTH: usize = 12;

/// Generates a new token, returning `(plaintext, sha256_hex)`
pub fn generate_api_token() -> (String, String) {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();

    let random: String = (0..TOKEN_RANDOM_LENGTH)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect();

    let token = format!("{}{}", TOKEN_PREFIX, random);
    let hash = hash_api_token(&token);
    (token, hash)
}

/// Hex-encoded SHA-256 of the token (64 chars)
pub fn hash_api_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// The part of a token shown in listings
pub fn display_prefix(token: &str) -> String {
    token.chars().take(DISPLAY_PREFIX_LENGTH).collect()
}

/// Checks prefix, length and alphabet without touching the database
pub fn validate_api_token_format(token: &str) -> bool {
    token.len() == API_TOKEN_LENGTH
        && token
            .strip_prefix(TOKEN_PREFIX)
            .is_some_and(|rest| rest.chars().all(|c| c.is_ascii_alphanumeric()))
}

/// Compares a plaintext token with a stored hash in constant time
pub fn verify_api_token(token: &str, stored_hash: &str) -> bool {
    constant_time_compare(&hash_api_token(token), stored_hash)
}

/// Byte comparison whose running time does not depend on where inputs differ
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.bytes()
        .zip(b.bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_api_token() {
        let (token1, hash1) = generate_api_token();
        let (token2, hash2) = generate_api_token();

        assert!(token1.starts_with(TOKEN_PREFIX));
        assert_eq!(token1.len(), API_TOKEN_LENGTH);
        assert_ne!(token1, token2);
        assert_ne!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_hash_is_deterministic() {
        assert_eq!(hash_api_token("azp_abc"), hash_api_token("azp_abc"));
        assert_ne!(hash_api_token("azp_abc"), hash_api_token("azp_abd"));
    }

    #[test]
    fn test_validate_api_token_format() {
        assert!(validate_api_token_format("azp_abcdefghijklmnopqrstuvwxyz123456"));
        assert!(!validate_api_token_format("axp_abcdefghijklmnopqrstuvwxyz123456"));
        assert!(!validate_api_token_format("azp_short"));
        assert!(!validate_api_token_format("azp_abcdefghijklmnopqrstuvwxyz12345!"));
        assert!(!validate_api_token_format(""));
    }

    #[test]
    fn test_verify_api_token() {
        let (token, hash) = generate_api_token();
        assert!(verify_api_token(&token, &hash));

        let (other, _) = generate_api_token();
        assert!(!verify_api_token(&other, &hash));
        assert!(!verify_api_token("", &hash));
    }

    #[test]
    fn test_display_prefix() {
        assert_eq!(display_prefix("azp_abcdefghijklmnop"), "azp_abcdefgh");
        assert_eq!(display_prefix("azp_"), "azp_");
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("hello", "hello"));
        assert!(constant_time_compare("", ""));
        assert!(!constant_time_compare("hello", "world"));
        assert!(!constant_time_compare("hello", "hello2"));
    }
}
