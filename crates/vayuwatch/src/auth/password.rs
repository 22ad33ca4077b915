//! Password obfuscation.
//!
//! Passwords are stored as standard base64 of their UTF-8 bytes. This is a
//! reversible encoding for the demo account store, not a hash, and offers no
//! protection to anyone who can read the store.

use base64::{engine::general_purpose::STANDARD, Engine};
use rand::distr::{Alphanumeric, SampleString};
use rand::Rng;

/// Prefix of passwords generated for accounts created through OTP login.
pub const PLACEHOLDER_PREFIX: &str = "temp_";

const PLACEHOLDER_LEN: usize = 16;

/// Encode a password for storage.
#[must_use]
pub fn obfuscate(password: &str) -> String {
    STANDARD.encode(password.as_bytes())
}

/// Decode a stored password. `None` if the stored value is not valid base64
/// of UTF-8 text.
#[must_use]
pub fn reveal(stored: &str) -> Option<String> {
    let bytes = STANDARD.decode(stored).ok()?;
    String::from_utf8(bytes).ok()
}

/// Whether `candidate` is the password behind `stored`.
#[must_use]
pub fn matches(stored: &str, candidate: &str) -> bool {
    reveal(stored).is_some_and(|plain| plain == candidate)
}

/// A random password for an account nobody chose a password for.
pub fn placeholder<R: Rng + ?Sized>(rng: &mut R) -> String {
    let suffix = Alphanumeric.sample_string(rng, PLACEHOLDER_LEN);
    format!("{PLACEHOLDER_PREFIX}{suffix}")
}
