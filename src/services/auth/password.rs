use crate::error::AppError;

/// One-way salted hash; `cost` is the bcrypt work factor.
pub fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    Ok(bcrypt::hash(password, cost)?)
}

/// Constant-time comparison against a stored hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    Ok(bcrypt::verify(password, hash)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_not_plaintext_and_verifies() {
        let hash = hash_password("secret123", 4).unwrap();

        assert_ne!(hash, "secret123");
        assert!(verify_password("secret123", &hash).unwrap());
        assert!(!verify_password("secret124", &hash).unwrap());
    }

    #[test]
    fn same_password_gets_different_salts() {
        let a = hash_password("secret123", 4).unwrap();
        let b = hash_password("secret123", 4).unwrap();

        assert_ne!(a, b);
    }

    #[test]
    fn corrupt_hash_is_an_internal_error() {
        assert!(matches!(
            verify_password("secret123", "not-a-bcrypt-hash"),
            Err(AppError::Internal)
        ));
    }
}
