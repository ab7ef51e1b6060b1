//! The Daraja gateway client.
//!
//! [`Gateway`] owns the merchant configuration, the shared token cache, and
//! a `reqwest` client with precomputed endpoint URLs. Every outgoing
//! operation except the token fetch itself passes through the dispatch
//! gate: ensure a valid bearer token, refreshing it lazily when the cached
//! one is missing or expired.

use std::time::Duration;

use http::{HeaderMap, StatusCode};
use mpesa::config::GatewayConfig;
use mpesa::error::GatewayError;
use mpesa::operation::Operation;
use mpesa::proto::{self, PurchaseParams, StkPushRequest, StkPushResponse};
use mpesa::timestamp::{TransactionTimestamp, UnixTimestamp};
use mpesa::token::{AccessToken, TokenResponse};
use reqwest::Client;
use url::Url;

use crate::constants;
use crate::error::ClientError;
use crate::token::TokenCache;

/// Context label for the token endpoint, used in errors and logs.
const TOKEN_CONTEXT: &str = "GET /oauth/v1/generate";

/// Context label for the STK push endpoint, used in errors and logs.
const STK_PUSH_CONTEXT: &str = "POST /mpesa/stkpush/v1/processrequest";

/// An async client for the M-Pesa Daraja gateway.
///
/// # Example
///
/// ```no_run
/// use mpesa::config::GatewayConfig;
/// use mpesa_http::gateway::Gateway;
///
/// let config = GatewayConfig::new("174379", "key", "secret")
///     .sandbox()
///     .with_pass_key("bfb279f9...");
/// let gateway = Gateway::try_new(config).unwrap();
/// ```
///
/// Cloning yields a client with an independent (empty) token cache; share
/// one instance behind an `Arc` to share the cache as well.
#[derive(Clone, Debug)]
pub struct Gateway {
    /// Merchant configuration.
    config: GatewayConfig,
    /// Base URL of the Daraja environment.
    base_url: Url,
    /// Full URL of the OAuth token endpoint, query string included.
    token_url: Url,
    /// Full URL of the STK push endpoint.
    stk_push_url: Url,
    /// Shared reqwest HTTP client.
    client: Client,
    /// Optional custom headers sent with each request.
    headers: HeaderMap,
    /// Optional request timeout.
    timeout: Option<Duration>,
    /// Cached bearer token state.
    tokens: TokenCache,
}

impl Gateway {
    /// Constructs a gateway for the environment named in the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::UrlParse`] if endpoint URL construction fails.
    pub fn try_new(config: GatewayConfig) -> Result<Self, ClientError> {
        let base_url = Url::parse(constants::base_url(config.environment())).map_err(|e| {
            ClientError::UrlParse {
                context: "Failed to parse environment base URL",
                source: e,
            }
        })?;
        Self::try_new_with_base(config, base_url)
    }

    /// Constructs a gateway against an explicit base URL.
    ///
    /// Useful for routing through a proxy or a test double instead of the
    /// environment's canonical host.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::UrlParse`] if endpoint URL construction fails.
    pub fn try_new_with_base(config: GatewayConfig, base_url: Url) -> Result<Self, ClientError> {
        let mut token_url =
            base_url
                .join(constants::OAUTH_TOKEN_PATH)
                .map_err(|e| ClientError::UrlParse {
                    context: "Failed to construct token endpoint URL",
                    source: e,
                })?;
        token_url.set_query(Some(&format!("grant_type={}", constants::OAUTH_GRANT_TYPE)));

        let stk_push_url =
            base_url
                .join(constants::STK_PUSH_PATH)
                .map_err(|e| ClientError::UrlParse {
                    context: "Failed to construct STK push endpoint URL",
                    source: e,
                })?;

        let tokens = match config.token() {
            Some(value) => {
                let expires_at = config
                    .token_expires()
                    .map_or(UnixTimestamp::EPOCH, |e| e.as_timestamp());
                TokenCache::seeded(AccessToken::new(value, expires_at))
            }
            None => TokenCache::new(),
        };

        Ok(Self {
            config,
            base_url,
            token_url,
            stk_push_url,
            client: Client::new(),
            headers: HeaderMap::new(),
            timeout: None,
            tokens,
        })
    }

    /// Attaches custom headers to all future requests.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Sets a timeout for all future requests.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns the merchant configuration.
    #[must_use]
    pub const fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Returns the base URL used by this gateway.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the computed token endpoint URL.
    #[must_use]
    pub const fn token_url(&self) -> &Url {
        &self.token_url
    }

    /// Returns the computed STK push endpoint URL.
    #[must_use]
    pub const fn stk_push_url(&self) -> &Url {
        &self.stk_push_url
    }

    /// Fetches a fresh OAuth token from the token endpoint.
    ///
    /// This is the one call that bypasses the dispatch gate — it is the
    /// request the gate itself relies on. Credentials travel as HTTP basic
    /// auth per the client-credentials flow.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on network failure, non-200 response, or a
    /// response body that is not a token.
    pub async fn create_token(&self) -> Result<TokenResponse, ClientError> {
        let request = self.client.get(self.token_url.clone()).basic_auth(
            self.config.consumer_key(),
            Some(self.config.consumer_secret()),
        );
        self.send_json(request, TOKEN_CONTEXT).await
    }

    /// Returns the current bearer token value.
    ///
    /// With `create_if_needed` false this never performs network I/O and
    /// returns the stored token verbatim — the empty string when none is
    /// stored. With `create_if_needed` true, a missing or expired token
    /// triggers exactly one fetch; on success the cache holds the new token
    /// and its absolute expiry. A failed fetch leaves the stored state
    /// untouched and returns it as-is (possibly empty), so the eventual
    /// operation surfaces the auth failure downstream; the failure is
    /// logged at `warn` level here.
    pub async fn access_token(&self, create_if_needed: bool) -> String {
        if !create_if_needed {
            return self
                .tokens
                .current()
                .await
                .map(|t| t.value().to_owned())
                .unwrap_or_default();
        }

        let now = UnixTimestamp::now();
        self.tokens
            .get_or_refresh(now, || self.fetch_token(now))
            .await
            .map(|t| t.value().to_owned())
            .unwrap_or_default()
    }

    /// Whether a non-empty, unexpired bearer token is currently stored.
    pub async fn has_valid_token(&self) -> bool {
        self.tokens.get_valid(UnixTimestamp::now()).await.is_some()
    }

    /// Runs the token endpoint call for the cache's refresh path.
    async fn fetch_token(&self, now: UnixTimestamp) -> Option<AccessToken> {
        match self.create_token().await {
            Ok(response) => {
                tracing::debug!(expires_in = response.expires_in, "obtained fresh bearer token");
                Some(AccessToken::expiring_in(
                    response.access_token,
                    response.expires_in,
                    now,
                ))
            }
            Err(error) => {
                tracing::warn!(%error, "token fetch failed; continuing with stored token");
                None
            }
        }
    }

    /// Initiates a Lipa na M-Pesa Online (STK push) purchase.
    ///
    /// Passes the dispatch gate first, then sends the push request carrying
    /// the configured short code, the derived password, and the bearer
    /// token. Caller parameters are forwarded unvalidated; Daraja rejects
    /// malformed values itself.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::MissingPassKey`] (wrapped) when no pass key
    /// is configured, or [`ClientError`] on transport failure.
    pub async fn purchase(&self, params: PurchaseParams) -> Result<StkPushResponse, ClientError> {
        let pass_key = self
            .config
            .pass_key()
            .ok_or(GatewayError::MissingPassKey)?
            .to_owned();

        let token = self.ensure_token().await;

        let timestamp = TransactionTimestamp::now();
        let short_code = self.config.short_code().to_owned();
        let push = StkPushRequest {
            password: proto::lipa_na_mpesa_password(&short_code, &pass_key, &timestamp),
            timestamp: timestamp.to_string(),
            transaction_type: proto::TRANSACTION_TYPE_PAY_BILL.to_owned(),
            business_short_code: short_code.clone(),
            party_a: params.phone_number.clone(),
            party_b: short_code,
            phone_number: params.phone_number,
            amount: params.amount,
            call_back_url: params.callback_url,
            account_reference: params.account_reference,
            transaction_desc: params.transaction_desc,
        };

        let request = self
            .client
            .post(self.stk_push_url.clone())
            .bearer_auth(token)
            .json(&push);
        self.send_json(request, STK_PUSH_CONTEXT).await
    }

    /// Executes a catalog operation by name.
    ///
    /// Implemented operations route to [`Self::purchase`] and
    /// [`Self::create_token`]; every other variant fails with
    /// [`GatewayError::Unsupported`] before any network traffic.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Gateway`] for unsupported operations or
    /// malformed parameters, otherwise whatever the routed operation
    /// returns.
    pub async fn execute(
        &self,
        operation: Operation,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, ClientError> {
        match operation {
            Operation::Purchase => {
                let params: PurchaseParams =
                    serde_json::from_value(params).map_err(|e| ClientError::Json {
                        context: "decode purchase parameters",
                        source: e,
                    })?;
                let response = self.purchase(params).await?;
                serde_json::to_value(response).map_err(|e| ClientError::Json {
                    context: "encode purchase response",
                    source: e,
                })
            }
            Operation::CreateToken => {
                let response = self.create_token().await?;
                serde_json::to_value(response).map_err(|e| ClientError::Json {
                    context: "encode token response",
                    source: e,
                })
            }
            unsupported => {
                tracing::debug!(operation = %unsupported, "refusing unimplemented operation");
                Err(GatewayError::Unsupported(unsupported).into())
            }
        }
    }

    /// The dispatch gate: returns a valid bearer token, fetching one if
    /// needed. When acquisition fails the stored (possibly empty or stale)
    /// value is returned and the operation proceeds; the HTTP call then
    /// fails downstream with the provider's auth error.
    async fn ensure_token(&self) -> String {
        let token = self.access_token(true).await;
        if token.is_empty() {
            tracing::debug!("dispatch gate proceeding without a bearer token");
        }
        token
    }

    /// Sends a prepared request and decodes the JSON response.
    ///
    /// Applies the gateway's custom headers and timeout, then maps
    /// transport, status, and decode failures onto [`ClientError`].
    /// `context` is a human-readable identifier used in errors and logs.
    async fn send_json<R>(
        &self,
        request: reqwest::RequestBuilder,
        context: &'static str,
    ) -> Result<R, ClientError>
    where
        R: serde::de::DeserializeOwned,
    {
        let mut request = request;
        for (key, value) in &self.headers {
            request = request.header(key, value);
        }
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ClientError::Http { context, source: e })?;

        if response.status() == StatusCode::OK {
            response
                .json::<R>()
                .await
                .map_err(|e| ClientError::JsonDeserialization { context, source: e })
        } else {
            let status = response.status();
            let body = response
                .text()
                .await
                .map_err(|e| ClientError::ResponseBodyRead { context, source: e })?;
            tracing::debug!(%status, context, "gateway request rejected");
            Err(ClientError::HttpStatus {
                context,
                status,
                body,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::prelude::*;
    use mpesa::token::TokenExpiry;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PASS_KEY: &str = "bfb279f9aa9bdbcf158e97dd71a467cd2e0c893059b10f78e6b72ada1ed2c919";

    fn test_config() -> GatewayConfig {
        GatewayConfig::new("174379", "key", "secret")
            .sandbox()
            .with_pass_key(PASS_KEY)
    }

    fn gateway_for(server: &MockServer, config: GatewayConfig) -> Gateway {
        let base = Url::parse(&server.uri()).unwrap();
        Gateway::try_new_with_base(config, base).unwrap()
    }

    fn purchase_params() -> PurchaseParams {
        PurchaseParams {
            amount: "100".to_owned(),
            phone_number: "254708374149".to_owned(),
            account_reference: "INV-42".to_owned(),
            transaction_desc: "order 42".to_owned(),
            callback_url: "https://example.com/callback".to_owned(),
        }
    }

    async fn mount_token_endpoint(server: &MockServer, token: &str, expires_in: &str) {
        Mock::given(method("GET"))
            .and(path("/oauth/v1/generate"))
            .and(query_param("grant_type", "client_credentials"))
            .and(header("Authorization", "Basic a2V5OnNlY3JldA=="))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": token,
                "expires_in": expires_in,
            })))
            .expect(1)
            .mount(server)
            .await;
    }

    #[test]
    fn endpoint_urls_follow_the_environment() {
        let gateway = Gateway::try_new(test_config()).unwrap();
        assert_eq!(
            gateway.token_url().as_str(),
            "https://sandbox.safaricom.co.ke/oauth/v1/generate?grant_type=client_credentials"
        );
        assert_eq!(
            gateway.stk_push_url().as_str(),
            "https://sandbox.safaricom.co.ke/mpesa/stkpush/v1/processrequest"
        );

        let live = Gateway::try_new(GatewayConfig::new("174379", "key", "secret")).unwrap();
        assert_eq!(live.base_url().as_str(), "https://api.safaricom.co.ke/");
    }

    #[tokio::test]
    async fn access_token_without_create_never_hits_network() {
        let server = MockServer::start().await;
        let gateway = gateway_for(&server, test_config());

        assert_eq!(gateway.access_token(false).await, "");
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn access_token_fetches_once_then_serves_from_cache() {
        let server = MockServer::start().await;
        mount_token_endpoint(&server, "abc123", "3600").await;
        let gateway = gateway_for(&server, test_config());

        let before = UnixTimestamp::now();
        assert!(!gateway.has_valid_token().await);
        assert_eq!(gateway.access_token(true).await, "abc123");
        assert_eq!(gateway.access_token(true).await, "abc123");
        assert_eq!(gateway.access_token(false).await, "abc123");
        assert!(gateway.has_valid_token().await);

        let stored = gateway.tokens.current().await.unwrap();
        assert!(stored.expires_at() >= before + 3600);
        assert!(stored.expires_at() <= UnixTimestamp::now() + 3600);
    }

    #[tokio::test]
    async fn seeded_valid_token_is_served_without_fetching() {
        let server = MockServer::start().await;
        let config = test_config()
            .with_token("xyz")
            .with_token_expires(TokenExpiry::from_epoch(UnixTimestamp::now().as_secs() + 600));
        let gateway = gateway_for(&server, config);

        assert_eq!(gateway.access_token(true).await, "xyz");
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn seeded_token_without_expiry_counts_as_expired() {
        let server = MockServer::start().await;
        mount_token_endpoint(&server, "abc123", "3599").await;
        let gateway = gateway_for(&server, test_config().with_token("xyz"));

        assert_eq!(gateway.access_token(true).await, "abc123");
    }

    #[tokio::test]
    async fn failed_fetch_returns_stored_token_unchanged() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/oauth/v1/generate"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Bad credentials"))
            .mount(&server)
            .await;

        let config = test_config()
            .with_token("xyz")
            .with_token_expires(TokenExpiry::from_epoch(1));
        let gateway = gateway_for(&server, config);

        assert!(!gateway.has_valid_token().await);
        assert_eq!(gateway.access_token(true).await, "xyz");
        assert_eq!(gateway.access_token(false).await, "xyz");

        let stored = gateway.tokens.current().await.unwrap();
        assert_eq!(stored.expires_at(), UnixTimestamp::from_secs(1));
        assert!(!gateway.has_valid_token().await);
    }

    #[tokio::test]
    async fn failed_fetch_on_an_empty_session_returns_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/oauth/v1/generate"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let gateway = gateway_for(&server, test_config());
        assert_eq!(gateway.access_token(true).await, "");
    }

    #[tokio::test]
    async fn purchase_fetches_a_token_then_pushes() {
        let server = MockServer::start().await;
        mount_token_endpoint(&server, "abc123", "3599").await;
        Mock::given(method("POST"))
            .and(path("/mpesa/stkpush/v1/processrequest"))
            .and(header("Authorization", "Bearer abc123"))
            .and(body_partial_json(json!({
                "BusinessShortCode": "174379",
                "PartyB": "174379",
                "PhoneNumber": "254708374149",
                "TransactionType": "CustomerPayBillOnline",
                "CallBackURL": "https://example.com/callback",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "MerchantRequestID": "29115-34620561-1",
                "CheckoutRequestID": "ws_CO_191220191020363925",
                "ResponseCode": "0",
                "ResponseDescription": "Success. Request accepted for processing",
                "CustomerMessage": "Success. Request accepted for processing",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let gateway = gateway_for(&server, test_config());
        let response = gateway.purchase(purchase_params()).await.unwrap();
        assert!(response.is_successful());
        assert_eq!(response.checkout_request_id, "ws_CO_191220191020363925");

        // The password must be derived from the short code, pass key, and
        // the same timestamp carried in the request body.
        let requests = server.received_requests().await.unwrap();
        let push = requests
            .iter()
            .find(|r| r.url.path().ends_with("processrequest"))
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&push.body).unwrap();
        let decoded = BASE64_STANDARD
            .decode(body["Password"].as_str().unwrap())
            .unwrap();
        let decoded = String::from_utf8(decoded).unwrap();
        let expected = format!("174379{PASS_KEY}{}", body["Timestamp"].as_str().unwrap());
        assert_eq!(decoded, expected);
    }

    #[tokio::test]
    async fn purchase_without_pass_key_fails_before_any_request() {
        let server = MockServer::start().await;
        let config = GatewayConfig::new("174379", "key", "secret").sandbox();
        let gateway = gateway_for(&server, config);

        let err = gateway.purchase(purchase_params()).await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Gateway(GatewayError::MissingPassKey)
        ));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn purchase_proceeds_with_empty_token_and_surfaces_the_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/oauth/v1/generate"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Bad credentials"))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/mpesa/stkpush/v1/processrequest"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Invalid Access Token"))
            .mount(&server)
            .await;

        let gateway = gateway_for(&server, test_config());
        let err = gateway.purchase(purchase_params()).await.unwrap_err();
        assert!(matches!(err, ClientError::HttpStatus { .. }));
    }

    #[tokio::test]
    async fn execute_routes_create_token() {
        let server = MockServer::start().await;
        mount_token_endpoint(&server, "abc123", "3599").await;
        let gateway = gateway_for(&server, test_config());

        let value = gateway
            .execute(Operation::CreateToken, json!({}))
            .await
            .unwrap();
        assert_eq!(value["access_token"], "abc123");
    }

    #[tokio::test]
    async fn unsupported_operations_fail_loudly_without_network() {
        let server = MockServer::start().await;
        let gateway = gateway_for(&server, test_config());

        for operation in Operation::ALL {
            if operation.is_implemented() {
                continue;
            }
            let err = gateway
                .execute(operation, json!({}))
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                ClientError::Gateway(GatewayError::Unsupported(op)) if op == operation
            ));
        }
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
