//! bcrypt password hashing, run on the blocking thread pool.

use actix_web::web;

use crate::error::AppResult;

/// Hash a password with the given bcrypt cost.
pub async fn hash(password: String, cost: u32) -> AppResult<String> {
    let hashed = web::block(move || bcrypt::hash(password, cost)).await??;
    Ok(hashed)
}

/// Check a password against a stored bcrypt hash.
pub async fn verify(password: String, hash: String) -> AppResult<bool> {
    let valid = web::block(move || bcrypt::verify(password, &hash)).await??;
    Ok(valid)
}
