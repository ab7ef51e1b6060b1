//! Daraja wire format types and request password derivation.
//!
//! Daraja speaks PascalCase JSON. The types here cover the Lipa na M-Pesa
//! Online (STK push) request/response pair; the OAuth token response lives
//! in [`crate::token`].

use base64::prelude::*;
use serde::{Deserialize, Serialize};

use crate::timestamp::TransactionTimestamp;

/// Transaction type for pay-bill STK push requests.
pub const TRANSACTION_TYPE_PAY_BILL: &str = "CustomerPayBillOnline";

/// Derives the Lipa na M-Pesa request password.
///
/// The password is `base64(short_code ‖ pass_key ‖ timestamp)`, where the
/// timestamp must be the same `YYYYMMDDHHMMSS` value carried in the
/// request's `Timestamp` field.
///
/// # Example
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use mpesa::proto::lipa_na_mpesa_password;
/// use mpesa::timestamp::TransactionTimestamp;
///
/// let at = Utc.with_ymd_and_hms(2016, 2, 16, 16, 56, 27).unwrap();
/// let password = lipa_na_mpesa_password(
///     "174379",
///     "bfb279f9aa9bdbcf158e97dd71a467cd2e0c893059b10f78e6b72ada1ed2c919",
///     &TransactionTimestamp::at(at),
/// );
/// assert!(password.starts_with("MTc0Mzc5"));
/// ```
#[must_use]
pub fn lipa_na_mpesa_password(
    short_code: &str,
    pass_key: &str,
    timestamp: &TransactionTimestamp,
) -> String {
    let raw = format!("{short_code}{pass_key}{}", timestamp.as_str());
    BASE64_STANDARD.encode(raw)
}

/// Caller-supplied parameters for a purchase.
///
/// The gateway adds its own short code, password, timestamp, and bearer
/// token on top of these. No validation happens at this layer; Daraja
/// rejects malformed values itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseParams {
    /// Amount to charge, in whole KES.
    pub amount: String,

    /// Payer phone number in MSISDN form (e.g., `"254708374149"`).
    pub phone_number: String,

    /// Merchant-side reference shown on the customer's statement.
    pub account_reference: String,

    /// Short free-text description of the transaction.
    pub transaction_desc: String,

    /// URL Daraja calls back with the payment result.
    pub callback_url: String,
}

/// Wire format of an STK push request.
///
/// # JSON Format
///
/// ```json
/// {
///   "BusinessShortCode": "174379",
///   "Password": "MTc0Mzc5...",
///   "Timestamp": "20160216165627",
///   "TransactionType": "CustomerPayBillOnline",
///   "Amount": "100",
///   "PartyA": "254708374149",
///   "PartyB": "174379",
///   "PhoneNumber": "254708374149",
///   "CallBackURL": "https://example.com/callback",
///   "AccountReference": "INV-42",
///   "TransactionDesc": "order 42"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StkPushRequest {
    /// The merchant short code receiving the payment.
    pub business_short_code: String,

    /// Request password; see [`lipa_na_mpesa_password`].
    pub password: String,

    /// The `YYYYMMDDHHMMSS` stamp the password was derived from.
    pub timestamp: String,

    /// Transaction type, normally [`TRANSACTION_TYPE_PAY_BILL`].
    pub transaction_type: String,

    /// Amount to charge, in whole KES.
    pub amount: String,

    /// The paying party (the customer MSISDN).
    pub party_a: String,

    /// The receiving party (the merchant short code).
    pub party_b: String,

    /// Phone number prompted with the STK dialog.
    pub phone_number: String,

    /// Result callback URL.
    #[serde(rename = "CallBackURL")]
    pub call_back_url: String,

    /// Merchant-side reference.
    pub account_reference: String,

    /// Free-text description.
    pub transaction_desc: String,
}

/// Wire format of an STK push acknowledgement.
///
/// This is the synchronous acceptance of the push request; the payment
/// outcome arrives later on the callback URL.
///
/// # JSON Format
///
/// ```json
/// {
///   "MerchantRequestID": "29115-34620561-1",
///   "CheckoutRequestID": "ws_CO_191220191020363925",
///   "ResponseCode": "0",
///   "ResponseDescription": "Success. Request accepted for processing",
///   "CustomerMessage": "Success. Request accepted for processing"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StkPushResponse {
    /// Daraja's identifier for the merchant request.
    #[serde(rename = "MerchantRequestID")]
    pub merchant_request_id: String,

    /// Daraja's identifier for the checkout, used to query status later.
    #[serde(rename = "CheckoutRequestID")]
    pub checkout_request_id: String,

    /// `"0"` when the request was accepted for processing.
    pub response_code: String,

    /// Human-readable acceptance description.
    pub response_description: String,

    /// Message suitable for display to the paying customer.
    pub customer_message: String,
}

impl StkPushResponse {
    /// Whether Daraja accepted the push request for processing.
    #[must_use]
    pub fn is_successful(&self) -> bool {
        self.response_code == "0"
    }
}
