//! Password hashing for auth secrets.

use sha2::{Digest, Sha512};

/// Hash a password into the hex string used as a per-call auth secret.
///
/// Returns lowercase hex SHA-512 of the input. An empty password maps to an
/// empty string, the "no password set" sentinel; a box rejects it as an auth
/// secret unless built with `allow_empty_auth_secret`.
pub fn hash_password(password: &str) -> String {
    if password.is_empty() {
        return String::new();
    }
    hex::encode(Sha512::digest(password.as_bytes()))
}
