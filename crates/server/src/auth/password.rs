use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::rngs::OsRng;

use crate::error::RequestError;

/// Hashes `password` into a PHC string with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, RequestError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| RequestError::Internal(format!("password hashing failed: {e}")))
}

pub fn verify_password(password: &str, phc_hash: &str) -> Result<bool, RequestError> {
    let parsed = PasswordHash::new(phc_hash)
        .map_err(|e| RequestError::Internal(format!("stored password hash is unreadable: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifies_own_hash() {
        let hash = hash_password("kobrabor").unwrap();
        assert!(verify_password("kobrabor", &hash).unwrap());
        assert!(!verify_password("bobrabor", &hash).unwrap());
    }

    #[test]
    fn salts_differ() {
        assert_ne!(
            hash_password("kobrabor").unwrap(),
            hash_password("kobrabor").unwrap()
        );
    }

    #[test]
    fn garbage_hash_is_internal() {
        let err = verify_password("kobrabor", "not-a-phc-string").unwrap_err();
        assert!(matches!(err, RequestError::Internal(_)));
    }
}
