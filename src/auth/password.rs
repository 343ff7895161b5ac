// Password hashing and strength validation

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::auth::error::AuthError;

/// Hash a password with Argon2id and a random salt
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHashError)
}

/// Verify a password against a stored hash
///
/// A malformed stored hash is treated as a server error; a mismatched
/// password simply returns false.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::PasswordHashError)?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Validate password strength: at least 8 characters, one letter, one digit
pub fn validate_password_strength(password: &str) -> Result<(), AuthError> {
    if password.len() < 8 {
        return Err(AuthError::InvalidPasswordFormat(
            "Password must be at least 8 characters".to_string(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_alphabetic()) {
        return Err(AuthError::InvalidPasswordFormat(
            "Password must contain at least one letter".to_string(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(AuthError::InvalidPasswordFormat(
            "Password must contain at least one digit".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_hash_and_verify_round_trip() {
        let hash = hash_password("correct-horse-9").unwrap();

        assert!(verify_password("correct-horse-9", &hash).unwrap());
        assert!(!verify_password("wrong-password-1", &hash).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let first = hash_password("same-password-1").unwrap();
        let second = hash_password("same-password-1").unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn test_malformed_hash_is_rejected() {
        let result = verify_password("anything1", "not-a-phc-string");
        assert!(matches!(result, Err(AuthError::PasswordHashError)));
    }

    #[test]
    fn test_password_strength_rules() {
        assert!(validate_password_strength("abcdef12").is_ok());
        assert!(validate_password_strength("short1").is_err());
        assert!(validate_password_strength("12345678").is_err());
        assert!(validate_password_strength("abcdefgh").is_err());
    }

    proptest! {
        #[test]
        fn prop_valid_passwords_verify(
            password in "[a-zA-Z]{4,10}[0-9]{4,10}"
        ) {
            let hash = hash_password(&password).unwrap();
            prop_assert!(verify_password(&password, &hash).unwrap());
        }

        #[test]
        fn prop_strength_accepts_letter_digit_mix(
            password in "[a-z]{5,20}[0-9]{3,10}"
        ) {
            prop_assert!(validate_password_strength(&password).is_ok());
        }
    }
}
