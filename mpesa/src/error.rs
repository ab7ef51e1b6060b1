//! Error types for gateway operations.

use crate::operation::Operation;

/// Errors raised by the gateway core, before any HTTP transport is involved.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// The operation is part of the advertised catalog but has no
    /// implementation. The original gateway absorbed these calls silently;
    /// here they fail loudly so callers are not left guessing.
    #[error("operation '{0}' is not supported by this gateway")]
    Unsupported(Operation),

    /// A purchase was attempted without a configured pass key. The pass key
    /// has no default and must be set explicitly on the configuration.
    #[error("purchase requires a pass key, but none is configured")]
    MissingPassKey,

    /// A token expiry value could not be normalized to epoch seconds.
    #[error("invalid token expiry value: '{0}'")]
    InvalidExpiry(String),
}
