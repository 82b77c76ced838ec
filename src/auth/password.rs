//! bcrypt password hashing. The work factor makes both operations CPU
//! heavy, so they run on the blocking thread pool rather than stalling
//! a request worker.

use bcrypt::{hash, verify, BcryptError, DEFAULT_COST};

pub async fn hash_password(password: &str) -> Result<String, BcryptError> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || hash(password, DEFAULT_COST))
        .await
        .map_err(|e| BcryptError::InvalidHash(e.to_string()))?
}

pub async fn verify_password(password: &str, hashed: &str) -> Result<bool, BcryptError> {
    let password = password.to_string();
    let hashed = hashed.to_string();
    tokio::task::spawn_blocking(move || verify(password, &hashed))
        .await
        .map_err(|e| BcryptError::InvalidHash(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hashes_and_verifies() {
        let hashed = hash_password("Passw0rd!").await.unwrap();
        // bcrypt-style hash, never the plaintext
        assert!(hashed.starts_with("$2"));
        assert_ne!(hashed, "Passw0rd!");
        assert!(verify_password("Passw0rd!", &hashed).await.unwrap());
        assert!(!verify_password("wrong", &hashed).await.unwrap());
    }
}
