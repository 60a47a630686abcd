//! Argon2id credential hashing.
//!
//! Argon2 is deliberately slow and memory-hard, so both directions run on
//! the blocking pool and never hold up the task that awaits them.

use argon2::Argon2;
use argon2::password_hash::{
    self, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString, rand_core::OsRng,
};

use eatfast_core::error::{AppError, ErrorKind};
use eatfast_core::result::AppResult;

/// Produces and checks PHC-format Argon2id hashes.
#[derive(Debug, Clone, Default)]
pub struct PasswordHasher;

impl PasswordHasher {
    pub fn new() -> Self {
        Self
    }

    /// Hash `password` under a fresh random salt.
    pub async fn hash(&self, password: &str) -> AppResult<String> {
        let password = password.to_owned();
        off_thread(move || {
            let salt = SaltString::generate(&mut OsRng);
            Argon2::default()
                .hash_password(password.as_bytes(), &salt)
                .map(|phc| phc.to_string())
                .map_err(|e| AppError::internal(format!("Could not hash password: {e}")))
        })
        .await
    }

    /// `Ok(false)` on a mismatch; a stored value that is not a PHC string
    /// is an internal fault, not a wrong password.
    pub async fn verify(&self, password: &str, stored: &str) -> AppResult<bool> {
        let password = password.to_owned();
        let stored = stored.to_owned();
        off_thread(move || {
            let phc = PasswordHash::new(&stored)
                .map_err(|e| AppError::internal(format!("Stored password hash is malformed: {e}")))?;
            match Argon2::default().verify_password(password.as_bytes(), &phc) {
                Ok(()) => Ok(true),
                Err(password_hash::Error::Password) => Ok(false),
                Err(e) => Err(AppError::internal(format!("Could not verify password: {e}"))),
            }
        })
        .await
    }
}

async fn off_thread<T, F>(work: F) -> AppResult<T>
where
    F: FnOnce() -> AppResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Internal, "Password hashing task failed", e))?
}
