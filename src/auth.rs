use argon2::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::Argon2;
use axum::http::{header, HeaderMap};
use regex::Regex;

use crate::errors::AppError;

/// Hash a password with a per-user random salt (argon2id, PHC string).
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::InternalError(format!("Password hashing failed: {}", e)))
}

/// Verify a password against a stored PHC hash. An unparseable hash counts
/// as a failed verification, not an error.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::error!("Stored password hash is unparseable: {}", e);
            false
        }
    }
}

/// Validate a username
///
/// Checks for:
/// - Length between 3 and 64 characters
/// - Letters, digits, underscore, dot, and dash only
pub fn is_valid_username(username: &str) -> bool {
    if username.len() < 3 || username.len() > 64 {
        return false;
    }

    let username_regex = Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.-]*$").unwrap();

    if !username_regex.is_match(username) {
        tracing::warn!("Invalid username format: {}", username);
        return false;
    }

    true
}

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 8;

pub fn is_valid_password(password: &str) -> bool {
    password.len() >= MIN_PASSWORD_LEN
}

/// Pull the bearer token out of the Authorization header, if any.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_round_trip() {
        let hash = hash_password("correct horse battery staple").unwrap();
        assert_ne!(hash, "correct horse battery staple");
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse battery staple", &hash));
        assert!(!verify_password("wrong password", &hash));
    }

    #[test]
    fn same_password_hashes_differently() {
        // Per-user salts mean equal passwords never share a hash.
        let first = hash_password("hunter22hunter22").unwrap();
        let second = hash_password("hunter22hunter22").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn unparseable_hash_fails_closed() {
        assert!(!verify_password("anything", "plaintext-from-old-system"));
        assert!(!verify_password("anything", ""));
    }

    #[test]
    fn valid_usernames() {
        assert!(is_valid_username("alice"));
        assert!(is_valid_username("bob_42"));
        assert!(is_valid_username("carol.d-e"));
    }

    #[test]
    fn invalid_usernames() {
        assert!(!is_valid_username(""));
        assert!(!is_valid_username("ab"));
        assert!(!is_valid_username("_leading"));
        assert!(!is_valid_username("has space"));
        assert!(!is_valid_username("semi;colon"));
        assert!(!is_valid_username(&"x".repeat(65)));
    }

    #[test]
    fn bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, "Bearer abc123".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("abc123"));

        headers.insert(header::AUTHORIZATION, "Basic abc123".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, "Bearer ".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);
    }
}
