//! Password hashing and verification utilities
//!
//! Configured identities may store either an Argon2 hash or a plaintext
//! password in the environment; verification prefers the hash.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::{debug, error};

/// Error types for password operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    HashingFailed(String),
    #[error("Failed to verify password: {0}")]
    VerificationFailed(String),
    #[error("Invalid password hash format")]
    InvalidHashFormat,
}

pub struct PasswordUtils;

impl PasswordUtils {
    /// Hashes the given password using the Argon2id algorithm
    pub fn hash_password(password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        match argon2.hash_password(password.as_bytes(), &salt) {
            Ok(hash) => {
                debug!("Password hashed successfully");
                Ok(hash.to_string())
            }
            Err(e) => {
                error!("Failed to hash password: {}", e);
                Err(PasswordError::HashingFailed(e.to_string()))
            }
        }
    }

    /// Verifies the given password against the stored hash
    pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
        let parsed_hash = PasswordHash::new(hash).map_err(|e| {
            error!("Invalid password hash format: {}", e);
            PasswordError::InvalidHashFormat
        })?;

        let argon2 = Argon2::default();
        match argon2.verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => {
                error!("Failed to verify password: {}", e);
                Err(PasswordError::VerificationFailed(e.to_string()))
            }
        }
    }

    /// Verify against a stored hash when present, otherwise compare with the
    /// configured plaintext password.
    pub fn verify_configured(
        password: &str,
        hash: Option<&str>,
        plaintext: Option<&str>,
    ) -> bool {
        if let Some(hash) = hash {
            return PasswordUtils::verify_password(password, hash).unwrap_or(false);
        }
        if let Some(plaintext) = plaintext {
            return password == plaintext;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_round_trip() {
        let hash = PasswordUtils::hash_password("s3cret").unwrap();
        assert!(PasswordUtils::verify_password("s3cret", &hash).unwrap());
        assert!(!PasswordUtils::verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn test_verify_configured_prefers_hash() {
        let hash = PasswordUtils::hash_password("hashed-pw").unwrap();
        assert!(PasswordUtils::verify_configured(
            "hashed-pw",
            Some(&hash),
            Some("other-pw")
        ));
        assert!(!PasswordUtils::verify_configured(
            "other-pw",
            Some(&hash),
            Some("other-pw")
        ));
    }

    #[test]
    fn test_verify_configured_plaintext_fallback() {
        assert!(PasswordUtils::verify_configured("pw", None, Some("pw")));
        assert!(!PasswordUtils::verify_configured("pw", None, None));
    }
}
