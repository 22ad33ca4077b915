//! One-time login codes.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;

/// Number of digits in a generated code.
pub const CODE_DIGITS: usize = 6;

/// The outstanding code for one phone number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Otp {
    /// The code itself.
    pub code: String,
    /// Phone number the code was issued to.
    pub phone: String,
    /// Last instant at which the code is accepted.
    pub expires_at: DateTime<Utc>,
}

impl Otp {
    /// Whether `code` for `phone` is accepted at `now`.
    ///
    /// A code is still good at exactly `expires_at`.
    #[must_use]
    pub fn accepts(&self, phone: &str, code: &str, now: DateTime<Utc>) -> bool {
        self.phone == phone && self.code == code && now <= self.expires_at
    }

    /// The part of the code handed back to the caller.
    #[must_use]
    pub fn grant(&self) -> OtpGrant {
        OtpGrant {
            code: self.code.clone(),
            expires_at: self.expires_at,
        }
    }
}

/// What `send_otp` returns: the code and when it stops working.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpGrant {
    /// The issued code.
    pub code: String,
    /// Last instant at which the code is accepted.
    pub expires_at: DateTime<Utc>,
}

/// A uniformly random zero-padded six digit code.
pub fn random_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    let n: u32 = rng.random_range(0..1_000_000);
    format!("{n:0width$}", width = CODE_DIGITS)
}
