//! Gateway configuration.
//!
//! [`GatewayConfig`] is the typed replacement for the host framework's
//! generic parameter bag: every recognized option is an explicit field.
//! Secrets never appear in `Debug` output.

use serde::Deserialize;

use crate::token::TokenExpiry;

/// Which Daraja environment the gateway talks to.
///
/// Selects the sandbox or production base URL in the transport layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Live Safaricom API. The default.
    #[default]
    Production,
    /// Safaricom developer sandbox.
    Sandbox,
}

impl Environment {
    /// Whether this is the test (sandbox) environment.
    #[must_use]
    pub const fn is_test(&self) -> bool {
        matches!(self, Self::Sandbox)
    }
}

/// Configuration for an M-Pesa gateway.
///
/// # Example
///
/// ```
/// use mpesa::config::GatewayConfig;
///
/// let config = GatewayConfig::new("174379", "key", "secret")
///     .sandbox()
///     .with_pass_key("bfb279f9aa9bdbcf158e97dd71a467cd2e0c893059b10f78e6b72ada1ed2c919");
/// assert!(config.environment().is_test());
/// ```
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct GatewayConfig {
    /// Merchant short code assigned by Safaricom.
    short_code: String,

    /// OAuth consumer key.
    consumer_key: String,

    /// OAuth consumer secret.
    consumer_secret: String,

    /// Lipa na M-Pesa pass key. Has no default; purchases fail without it.
    #[serde(default)]
    pass_key: Option<String>,

    /// Target environment. Defaults to [`Environment::Production`].
    #[serde(default)]
    environment: Environment,

    /// Seed bearer token from a previously stored session.
    #[serde(default)]
    token: Option<String>,

    /// Expiry of the seed token, as epoch seconds or a date string.
    #[serde(default)]
    token_expires: Option<TokenExpiry>,
}

impl GatewayConfig {
    /// Creates a configuration with the required merchant credentials.
    #[must_use]
    pub fn new(
        short_code: impl Into<String>,
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
    ) -> Self {
        Self {
            short_code: short_code.into(),
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            pass_key: None,
            environment: Environment::default(),
            token: None,
            token_expires: None,
        }
    }

    /// Sets the Lipa na M-Pesa pass key.
    #[must_use]
    pub fn with_pass_key(mut self, pass_key: impl Into<String>) -> Self {
        self.pass_key = Some(pass_key.into());
        self
    }

    /// Sets the target environment.
    #[must_use]
    pub const fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Targets the developer sandbox.
    #[must_use]
    pub const fn sandbox(self) -> Self {
        self.with_environment(Environment::Sandbox)
    }

    /// Seeds the gateway with a previously issued bearer token.
    ///
    /// Without a matching [`Self::with_token_expires`] the seed counts as
    /// already expired and the first operation will fetch a fresh token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Sets the expiry of the seed token.
    #[must_use]
    pub fn with_token_expires(mut self, expires: impl Into<TokenExpiry>) -> Self {
        self.token_expires = Some(expires.into());
        self
    }

    /// Returns the merchant short code.
    #[must_use]
    pub fn short_code(&self) -> &str {
        &self.short_code
    }

    /// Returns the OAuth consumer key.
    #[must_use]
    pub fn consumer_key(&self) -> &str {
        &self.consumer_key
    }

    /// Returns the OAuth consumer secret.
    #[must_use]
    pub fn consumer_secret(&self) -> &str {
        &self.consumer_secret
    }

    /// Returns the pass key, if one was configured.
    #[must_use]
    pub fn pass_key(&self) -> Option<&str> {
        self.pass_key.as_deref()
    }

    /// Returns the target environment.
    #[must_use]
    pub const fn environment(&self) -> Environment {
        self.environment
    }

    /// Returns the seed token, if one was configured.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Returns the seed token expiry, if one was configured.
    #[must_use]
    pub const fn token_expires(&self) -> Option<TokenExpiry> {
        self.token_expires
    }
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("short_code", &self.short_code)
            .field("consumer_key", &self.consumer_key)
            .field("has_consumer_secret", &!self.consumer_secret.is_empty())
            .field("has_pass_key", &self.pass_key.is_some())
            .field("environment", &self.environment)
            .field("has_token", &self.token.is_some())
            .field("token_expires", &self.token_expires)
            .finish()
    }
}
