//! Password hashing and verification (Argon2id).

use std::sync::LazyLock;

use argon2::{
    Argon2,
    password_hash::{
        PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};

use crate::error::AppError;

// Stand-in hash for logins naming an unknown email, built with the same parameters as
// real hashes so both outcomes cost one full Argon2 verification.
static UNKNOWN_USER_HASH: LazyLock<String> = LazyLock::new(|| {
    hash_password("tenant-notes-unknown-user").unwrap_or_else(|e| {
        tracing::error!(error = %e, "could not build the unknown-user hash");
        String::new()
    })
});

/// Hashes a plaintext password with a fresh random salt. Used by seeding and invites.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))
}

/// Checks a plaintext password against a stored PHC-format hash.
///
/// Returns `false` on mismatch and also on a hash that cannot be parsed, so a corrupt
/// row can never authenticate. The comparison itself is delegated to `argon2`.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let parsed = match PasswordHash::new(stored_hash) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!(error = %e, "stored password hash could not be parsed");
            return false;
        }
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// The hash verified against when a login names no known user.
pub fn unknown_user_hash() -> &'static str {
    &UNKNOWN_USER_HASH
}

/// verify_login
///
/// Login-path check. A missing user is verified against [`unknown_user_hash`] and then
/// refused, so an unknown email takes as long as a wrong password.
pub fn verify_login(password: &str, stored_hash: Option<&str>) -> bool {
    match stored_hash {
        Some(hash) => verify_password(password, hash),
        None => {
            let _ = verify_password(password, unknown_user_hash());
            false
        }
    }
}
