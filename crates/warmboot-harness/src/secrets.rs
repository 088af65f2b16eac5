//! Per-run secrets: the installation hash salt and the admin password.
//!
//! Both come from the operating-system RNG and are generated fresh for every
//! install or run. They are never derived from test input and never reused.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::rngs::OsRng;
use rand::{Rng, RngCore};

/// Raw byte length of the installation salt before encoding.
pub const SALT_BYTES: usize = 55;

/// Character length of generated admin passwords.
pub const PASSWORD_LEN: usize = 16;

/// Generate the installation hash salt: `SALT_BYTES` random bytes,
/// base64-encoded URL-safe without padding.
#[must_use]
pub fn random_salt() -> String {
    let mut bytes = [0_u8; SALT_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Generate a fresh alphanumeric admin password.
#[must_use]
pub fn random_password() -> String {
    OsRng
        .sample_iter(&rand::distributions::Alphanumeric)
        .take(PASSWORD_LEN)
        .map(char::from)
        .collect()
}
