//! argon2 password hashing.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use rand_core::OsRng;

use crate::error::ApiError;

/// Hash `password` into a PHC string with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| ApiError::Internal(format!("argon2 error: {e}")))
}

/// Whether `password` matches the stored PHC string. An unparseable hash
/// never matches and is logged as a corrupt account row.
pub fn verify_password(password: &str, phc: &str) -> bool {
  let parsed = match PasswordHash::new(phc) {
    Ok(parsed) => parsed,
    Err(e) => {
      tracing::error!(error = %e, "stored password hash is not a valid PHC string");
      return false;
    }
  };
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .is_ok()
}
