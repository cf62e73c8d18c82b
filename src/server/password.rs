//! bcrypt password hashing with a fixed work factor.

use anyhow::{Context, Result};
use tracing::error;

/// bcrypt cost used for every stored digest.
pub const WORK_FACTOR: u32 = 10;

/// Hash a plaintext password with a fresh random salt.
///
/// # Errors
/// Returns an error if bcrypt rejects the input.
pub fn hash(plaintext: &str) -> Result<String> {
    bcrypt::hash(plaintext, WORK_FACTOR).context("failed to hash password")
}

/// Check a plaintext password against a stored digest.
///
/// A digest bcrypt cannot parse never matches.
#[must_use]
pub fn verify(plaintext: &str, digest: &str) -> bool {
    match bcrypt::verify(plaintext, digest) {
        Ok(matches) => matches,
        Err(e) => {
            error!("Error verifying password digest: {e}");
            false
        }
    }
}

/// [`hash`] on the blocking thread pool.
///
/// # Errors
/// Returns an error if hashing fails or the blocking task is cancelled.
pub async fn hash_blocking(plaintext: String) -> Result<String> {
    tokio::task::spawn_blocking(move || hash(&plaintext))
        .await
        .context("password hashing task failed")?
}

/// [`verify`] on the blocking thread pool.
pub async fn verify_blocking(plaintext: String, digest: String) -> bool {
    match tokio::task::spawn_blocking(move || verify(&plaintext, &digest)).await {
        Ok(matches) => matches,
        Err(e) => {
            error!("Password verification task failed: {e}");
            false
        }
    }
}
