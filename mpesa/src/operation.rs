//! The closed catalog of gateway operations.
//!
//! The gateway advertises the full standard payment surface — purchase,
//! token creation, and the usual authorize/capture/refund/card family —
//! but only implements the subset Daraja actually serves through this
//! client. Representing the catalog as a closed enum keeps the advertised
//! surface explicit: dispatching an unimplemented variant yields
//! [`GatewayError::Unsupported`](crate::error::GatewayError::Unsupported)
//! instead of silently doing nothing.

use std::fmt;
use std::str::FromStr;

/// A logical gateway operation.
///
/// Wire names use the lowerCamelCase spelling shared with other gateway
/// integrations (`"purchase"`, `"createToken"`, `"completeAuthorize"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Lipa na M-Pesa Online (STK push) purchase. Implemented.
    Purchase,
    /// OAuth2 client-credentials token fetch. Implemented.
    CreateToken,
    /// Authorize a payment for later capture.
    Authorize,
    /// Complete a previously started authorization.
    CompleteAuthorize,
    /// Capture a previously authorized payment.
    Capture,
    /// Complete a previously started purchase.
    CompletePurchase,
    /// Refund a settled payment.
    Refund,
    /// Fetch the state of a transaction.
    FetchTransaction,
    /// Void an authorized, uncaptured payment.
    Void,
    /// Store a card with the provider.
    CreateCard,
    /// Update a stored card.
    UpdateCard,
    /// Delete a stored card.
    DeleteCard,
    /// Parse an incoming provider notification.
    AcceptNotification,
}

impl Operation {
    /// Every operation in the advertised catalog.
    pub const ALL: [Self; 13] = [
        Self::Purchase,
        Self::CreateToken,
        Self::Authorize,
        Self::CompleteAuthorize,
        Self::Capture,
        Self::CompletePurchase,
        Self::Refund,
        Self::FetchTransaction,
        Self::Void,
        Self::CreateCard,
        Self::UpdateCard,
        Self::DeleteCard,
        Self::AcceptNotification,
    ];

    /// Returns the canonical wire name of the operation.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Purchase => "purchase",
            Self::CreateToken => "createToken",
            Self::Authorize => "authorize",
            Self::CompleteAuthorize => "completeAuthorize",
            Self::Capture => "capture",
            Self::CompletePurchase => "completePurchase",
            Self::Refund => "refund",
            Self::FetchTransaction => "fetchTransaction",
            Self::Void => "void",
            Self::CreateCard => "createCard",
            Self::UpdateCard => "updateCard",
            Self::DeleteCard => "deleteCard",
            Self::AcceptNotification => "acceptNotification",
        }
    }

    /// Whether the gateway carries an implementation for this operation.
    #[must_use]
    pub const fn is_implemented(&self) -> bool {
        matches!(self, Self::Purchase | Self::CreateToken)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.name() == s)
            .ok_or_else(|| format!("unknown gateway operation '{s}'"))
    }
}

impl serde::Serialize for Operation {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> serde::Deserialize<'de> for Operation {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
