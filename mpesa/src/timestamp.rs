//! Unix timestamp utilities for token expiry and Daraja transaction stamps.
//!
//! This module provides the [`UnixTimestamp`] type used for token expiry
//! comparisons, and the [`TransactionTimestamp`] type that renders the
//! `YYYYMMDDHHMMSS` wall-clock stamp Daraja expects in STK push requests
//! (the same stamp that feeds the Lipa na M-Pesa password).

use std::fmt::{Display, Formatter};
use std::ops::Add;
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A Unix timestamp representing seconds since the Unix epoch (1970-01-01T00:00:00Z).
///
/// Token expiry times are stored and compared as epoch seconds. The
/// comparison rule is strict: a token whose expiry equals the current
/// second is already considered expired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnixTimestamp(u64);

impl Display for UnixTimestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add<u64> for UnixTimestamp {
    type Output = Self;

    fn add(self, rhs: u64) -> Self::Output {
        Self(self.0.saturating_add(rhs))
    }
}

impl UnixTimestamp {
    /// The Unix epoch itself. Used as the expiry of seed tokens that arrive
    /// without one, so they always compare as expired.
    pub const EPOCH: Self = Self(0);

    /// Creates a new [`UnixTimestamp`] from a raw seconds value.
    #[must_use]
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    /// Returns the current system time as a [`UnixTimestamp`].
    ///
    /// # Panics
    ///
    /// Panics if the system clock is set to a time before the Unix epoch,
    /// which should never happen on properly configured systems.
    #[must_use]
    pub fn now() -> Self {
        let now = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .expect("SystemTime before UNIX epoch?!?")
            .as_secs();
        Self(now)
    }

    /// Returns the timestamp as raw seconds since the Unix epoch.
    #[must_use]
    pub const fn as_secs(&self) -> u64 {
        self.0
    }
}

/// A Daraja transaction timestamp in `YYYYMMDDHHMMSS` form.
///
/// Sent verbatim in the `Timestamp` field of an STK push request and
/// concatenated into the request password, so the same instance must be
/// used for both.
///
/// # Example
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use mpesa::timestamp::TransactionTimestamp;
///
/// let at = Utc.with_ymd_and_hms(2016, 2, 16, 16, 56, 27).unwrap();
/// assert_eq!(TransactionTimestamp::at(at).to_string(), "20160216165627");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionTimestamp(String);

impl TransactionTimestamp {
    /// Renders the current UTC time as a transaction timestamp.
    #[must_use]
    pub fn now() -> Self {
        Self::at(Utc::now())
    }

    /// Renders a specific instant as a transaction timestamp.
    #[must_use]
    pub fn at(instant: DateTime<Utc>) -> Self {
        Self(instant.format("%Y%m%d%H%M%S").to_string())
    }

    /// Returns the rendered `YYYYMMDDHHMMSS` string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for TransactionTimestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn add_is_saturating() {
        let ts = UnixTimestamp::from_secs(u64::MAX - 1);
        assert_eq!((ts + 10).as_secs(), u64::MAX);
    }

    #[test]
    fn ordering_is_by_seconds() {
        assert!(UnixTimestamp::from_secs(10) < UnixTimestamp::from_secs(11));
        assert_eq!(UnixTimestamp::EPOCH.as_secs(), 0);
    }

    #[test]
    fn transaction_timestamp_format() {
        let at = Utc.with_ymd_and_hms(2016, 2, 16, 16, 56, 27).unwrap();
        assert_eq!(TransactionTimestamp::at(at).as_str(), "20160216165627");
    }

    #[test]
    fn transaction_timestamp_zero_pads() {
        let at = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(TransactionTimestamp::at(at).as_str(), "20260102030405");
    }
}
