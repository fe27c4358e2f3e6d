//! Password hashing and verification.
//!
//! New passwords are always hashed with bcrypt. Verification has two paths:
//! values carrying a bcrypt prefix (`$2a$`, `$2b$`, `$2x$`, `$2y$`) are checked
//! with bcrypt; anything else is legacy plaintext imported before hashing was
//! introduced and is compared directly. Both branches stay until every legacy row has been
//! re-hashed by a password change.

use bcrypt::{DEFAULT_COST, hash, verify};

use crate::errors::{AppError, FieldError};

/// Minimum accepted length for a new password.
pub const MIN_PASSWORD_LENGTH: usize = 6;

const BCRYPT_PREFIXES: [&str; 4] = ["$2a$", "$2b$", "$2x$", "$2y$"];

/// Reject passwords shorter than [`MIN_PASSWORD_LENGTH`] characters.
pub fn ensure_password_length(password: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AppError::validation(vec![FieldError::new(
            "password",
            format!("Password must be at least {} characters", MIN_PASSWORD_LENGTH),
        )]));
    }
    Ok(())
}

pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::internal_error(format!("Failed to hash password: {}", e)))
}

/// Whether a stored password value is a bcrypt hash.
pub fn is_hashed(stored: &str) -> bool {
    BCRYPT_PREFIXES.iter().any(|prefix| stored.starts_with(prefix))
}

pub fn verify_password(password: &str, stored: &str) -> Result<bool, AppError> {
    if is_hashed(stored) {
        verify(password, stored)
            .map_err(|e| AppError::internal_error(format!("Failed to verify password: {}", e)))
    } else {
        tracing::warn!("Verifying password against a legacy unhashed value");
        Ok(password == stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password_produces_bcrypt_hash() {
        let hash = hash_password("drive-safe-42").unwrap();
        assert!(is_hashed(&hash));
        assert_ne!(hash, "drive-safe-42");
    }

    #[test]
    fn test_round_trip_accepts_only_original() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("correct horsE", &hash).unwrap());
        assert!(!verify_password("", &hash).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let first = hash_password("same-password").unwrap();
        let second = hash_password("same-password").unwrap();
        assert_ne!(first, second);
        assert!(verify_password("same-password", &first).unwrap());
        assert!(verify_password("same-password", &second).unwrap());
    }

    #[test]
    fn test_ensure_password_length() {
        assert!(ensure_password_length("123456").is_ok());
        let err = ensure_password_length("12345").unwrap_err();
        assert_eq!(err.status.as_u16(), 400);
        assert_eq!(err.errors[0].field, "password");
    }

    #[test]
    fn test_legacy_plaintext_falls_back_to_equality() {
        assert!(!is_hashed("admin123"));
        assert!(verify_password("admin123", "admin123").unwrap());
        assert!(!verify_password("admin1234", "admin123").unwrap());
    }

    #[test]
    fn test_is_hashed_recognises_all_prefixes() {
        for prefix in BCRYPT_PREFIXES {
            assert!(is_hashed(&format!("{}10$abcdefghijklmnopqrstuv", prefix)));
        }
        assert!(!is_hashed("$argon2id$v=19$m=4096"));
    }
}
