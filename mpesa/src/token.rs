//! OAuth token state, validity, and expiry normalization.
//!
//! Daraja issues short-lived bearer tokens through the client-credentials
//! flow. A token is usable only while it is non-empty and its expiry lies
//! strictly in the future; everything that decides whether a fetch is
//! needed funnels through [`AccessToken::is_valid`].

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::GatewayError;
use crate::timestamp::UnixTimestamp;

/// A bearer token together with its absolute expiry time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    value: String,
    expires_at: UnixTimestamp,
}

impl AccessToken {
    /// Creates a token with an absolute expiry.
    #[must_use]
    pub fn new(value: impl Into<String>, expires_at: UnixTimestamp) -> Self {
        Self {
            value: value.into(),
            expires_at,
        }
    }

    /// Creates a token that expires `expires_in` seconds after `now`.
    #[must_use]
    pub fn expiring_in(value: impl Into<String>, expires_in: u64, now: UnixTimestamp) -> Self {
        Self::new(value, now + expires_in)
    }

    /// Returns the raw bearer token value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns the absolute expiry time.
    #[must_use]
    pub const fn expires_at(&self) -> UnixTimestamp {
        self.expires_at
    }

    /// A token is valid iff it is non-empty and its expiry is strictly in
    /// the future.
    #[must_use]
    pub fn is_valid(&self, now: UnixTimestamp) -> bool {
        !self.value.is_empty() && now < self.expires_at
    }
}

/// A token expiry as supplied by the host configuration.
///
/// Hosts resuming a stored session may hand the expiry over as epoch
/// seconds or as a date string (RFC 3339, RFC 2822, or
/// `YYYY-MM-DD HH:MM:SS` interpreted as UTC). Both normalize to epoch
/// seconds here; anything unparseable is a reported error rather than an
/// always-false comparison.
///
/// # Example
///
/// ```
/// use mpesa::token::TokenExpiry;
///
/// let from_epoch: TokenExpiry = "1767225600".parse().unwrap();
/// let from_date: TokenExpiry = "2026-01-01T00:00:00Z".parse().unwrap();
/// assert_eq!(from_epoch, from_date);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenExpiry(UnixTimestamp);

impl TokenExpiry {
    /// Creates an expiry from raw epoch seconds.
    #[must_use]
    pub const fn from_epoch(secs: u64) -> Self {
        Self(UnixTimestamp::from_secs(secs))
    }

    /// Returns the normalized expiry timestamp.
    #[must_use]
    pub const fn as_timestamp(&self) -> UnixTimestamp {
        self.0
    }
}

impl From<UnixTimestamp> for TokenExpiry {
    fn from(ts: UnixTimestamp) -> Self {
        Self(ts)
    }
}

impl FromStr for TokenExpiry {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return trimmed
                .parse::<u64>()
                .map(Self::from_epoch)
                .map_err(|_| GatewayError::InvalidExpiry(s.to_owned()));
        }

        let parsed = DateTime::parse_from_rfc3339(trimmed)
            .map(|dt| dt.timestamp())
            .or_else(|_| DateTime::parse_from_rfc2822(trimmed).map(|dt| dt.timestamp()))
            .or_else(|_| {
                NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S")
                    .map(|dt| dt.and_utc().timestamp())
            })
            .map_err(|_| GatewayError::InvalidExpiry(s.to_owned()))?;

        u64::try_from(parsed)
            .map(Self::from_epoch)
            .map_err(|_| GatewayError::InvalidExpiry(s.to_owned()))
    }
}

impl Serialize for TokenExpiry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.0.as_secs())
    }
}

impl<'de> Deserialize<'de> for TokenExpiry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ExpiryVisitor;

        impl Visitor<'_> for ExpiryVisitor {
            type Value = TokenExpiry;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("epoch seconds or a parseable date string")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(TokenExpiry::from_epoch(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                u64::try_from(v)
                    .map(TokenExpiry::from_epoch)
                    .map_err(|_| E::custom("token expiry must not be negative"))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(ExpiryVisitor)
    }
}

/// Wire format of the OAuth token endpoint response.
///
/// # JSON Format
///
/// ```json
/// {
///   "access_token": "c9SQxWWhmdVRlyh0zh8gZDTkubVF",
///   "expires_in": "3599"
/// }
/// ```
///
/// Daraja serves `expires_in` as a decimal string; plain integers are
/// accepted as well.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    /// The issued bearer token.
    pub access_token: String,

    /// Token lifetime in seconds from the moment of issue.
    #[serde(with = "expires_in_secs")]
    pub expires_in: u64,
}

mod expires_in_secs {
    use super::{Deserializer, Serializer, Visitor, de, fmt};

    pub fn serialize<S: Serializer>(v: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&v.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        struct SecondsVisitor;

        impl Visitor<'_> for SecondsVisitor {
            type Value = u64;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("seconds as an integer or decimal string")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(v)
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                u64::try_from(v).map_err(|_| E::custom("expires_in must not be negative"))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                v.trim()
                    .parse()
                    .map_err(|_| E::custom("expires_in must be a whole number of seconds"))
            }
        }

        deserializer.deserialize_any(SecondsVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GatewayError;

    const NOW: UnixTimestamp = UnixTimestamp::from_secs(1_700_000_000);

    #[test]
    fn empty_token_is_never_valid() {
        let token = AccessToken::new("", NOW + 3600);
        assert!(!token.is_valid(NOW));
    }

    #[test]
    fn past_expiry_is_invalid_regardless_of_content() {
        let token = AccessToken::new("xyz", UnixTimestamp::from_secs(NOW.as_secs() - 10));
        assert!(!token.is_valid(NOW));
    }

    #[test]
    fn expiry_at_now_is_invalid() {
        let token = AccessToken::new("xyz", NOW);
        assert!(!token.is_valid(NOW));
    }

    #[test]
    fn future_expiry_with_content_is_valid() {
        let token = AccessToken::new("xyz", NOW + 1);
        assert!(token.is_valid(NOW));
    }

    #[test]
    fn expiring_in_adds_to_now() {
        let token = AccessToken::expiring_in("abc123", 3600, NOW);
        assert_eq!(token.expires_at(), NOW + 3600);
        assert!(token.is_valid(NOW));
    }

    #[test]
    fn expiry_parses_epoch_digits() {
        let expiry: TokenExpiry = "1767225600".parse().unwrap();
        assert_eq!(expiry.as_timestamp().as_secs(), 1_767_225_600);
    }

    #[test]
    fn expiry_parses_date_strings() {
        let rfc3339: TokenExpiry = "2026-01-01T00:00:00Z".parse().unwrap();
        let space_separated: TokenExpiry = "2026-01-01 00:00:00".parse().unwrap();
        assert_eq!(rfc3339, space_separated);
        assert_eq!(rfc3339.as_timestamp().as_secs(), 1_767_225_600);
    }

    #[test]
    fn garbage_expiry_is_reported() {
        let err = "not a date".parse::<TokenExpiry>().unwrap_err();
        assert_eq!(err, GatewayError::InvalidExpiry("not a date".to_owned()));
    }

    #[test]
    fn expiry_deserializes_from_number_or_string() {
        let from_number: TokenExpiry = serde_json::from_str("1767225600").unwrap();
        let from_string: TokenExpiry = serde_json::from_str("\"2026-01-01T00:00:00Z\"").unwrap();
        assert_eq!(from_number, from_string);
    }

    #[test]
    fn token_response_accepts_string_expires_in() {
        let response: TokenResponse = serde_json::from_str(
            r#"{"access_token": "c9SQxWWhmdVRlyh0zh8gZDTkubVF", "expires_in": "3599"}"#,
        )
        .unwrap();
        assert_eq!(response.access_token, "c9SQxWWhmdVRlyh0zh8gZDTkubVF");
        assert_eq!(response.expires_in, 3599);
    }

    #[test]
    fn token_response_accepts_integer_expires_in() {
        let response: TokenResponse =
            serde_json::from_str(r#"{"access_token": "abc123", "expires_in": 3600}"#).unwrap();
        assert_eq!(response.expires_in, 3600);
    }
}
