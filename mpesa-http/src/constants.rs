//! HTTP constants for the Daraja API.

use mpesa::config::Environment;

/// Production Daraja base URL.
pub const PRODUCTION_BASE_URL: &str = "https://api.safaricom.co.ke/";

/// Developer sandbox base URL.
pub const SANDBOX_BASE_URL: &str = "https://sandbox.safaricom.co.ke/";

/// Path of the OAuth token endpoint, relative to the base URL.
pub const OAUTH_TOKEN_PATH: &str = "oauth/v1/generate";

/// Grant type query value for the token endpoint.
pub const OAUTH_GRANT_TYPE: &str = "client_credentials";

/// Path of the STK push endpoint, relative to the base URL.
pub const STK_PUSH_PATH: &str = "mpesa/stkpush/v1/processrequest";

/// Returns the base URL for an environment.
#[must_use]
pub const fn base_url(environment: Environment) -> &'static str {
    match environment {
        Environment::Production => PRODUCTION_BASE_URL,
        Environment::Sandbox => SANDBOX_BASE_URL,
    }
}
