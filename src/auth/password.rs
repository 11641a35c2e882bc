//! Argon2 password hashing and verification.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::error::ServiceError;

/// Hash a plaintext password with a fresh random salt.
pub fn hash_password(plain: &str) -> Result<String, ServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| ServiceError::Internal(format!("password hashing failed: {err}")))
}

/// Verify a plaintext candidate against a stored hash.
///
/// The comparison inside the argon2 crate is constant-time; a malformed
/// stored hash is an internal fault, not a mismatch.
pub fn verify_password(plain: &str, hash: &str) -> Result<bool, ServiceError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|err| ServiceError::Internal(format!("stored password hash invalid: {err}")))?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_round_trip() {
        let hash = hash_password("s3cret-passphrase").unwrap();
        assert!(verify_password("s3cret-passphrase", &hash).unwrap());
    }

    #[test]
    fn wrong_password_is_rejected() {
        let hash = hash_password("correct-horse-battery-staple").unwrap();
        assert!(!verify_password("wrong-password", &hash).unwrap());
    }

    #[test]
    fn malformed_hash_is_a_fault_not_a_mismatch() {
        assert!(verify_password("anything", "not-a-valid-hash").is_err());
    }
}
