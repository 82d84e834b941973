use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use tracing::error;

lazy_static! {
    /// Hash checked when a login names no account, so that path costs the
    /// same argon2 work as a wrong password.
    static ref DUMMY_HASH: Option<String> = hash_password("blogapi-no-such-account").ok();
}

fn argon2_failure(op: &'static str, e: password_hash::Error) -> anyhow::Error {
    error!(error = %e, op, "argon2 failure");
    anyhow::anyhow!("argon2 {op}: {e}")
}

/// Hashes a password into an Argon2 PHC string with a fresh random salt.
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| argon2_failure("hash", e))
}

/// `Ok(false)` for a mismatch; `Err` only when `hash` is not a PHC string.
pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| argon2_failure("parse", e))?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

/// Runs a verification against [`DUMMY_HASH`] and discards the result.
pub fn verify_without_account(plain: &str) {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = verify_password(plain, hash);
    }
}
