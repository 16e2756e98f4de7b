//! bcrypt hashing, run on the blocking pool so request workers stay responsive.

use anyhow::Context as _;

use crate::error::AuthServiceError;

pub async fn hash_password(password: &str, cost: u32) -> Result<String, AuthServiceError> {
    let password = password.to_owned();
    let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .context("join password hash task")?
        .context("hash password")?;
    Ok(hash)
}

/// Constant-time comparison against a stored bcrypt hash.
pub async fn verify_password(password: &str, hash: &str) -> Result<bool, AuthServiceError> {
    let password = password.to_owned();
    let hash = hash.to_owned();
    let matches = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .context("join password verify task")?
        .context("verify password")?;
    Ok(matches)
}
