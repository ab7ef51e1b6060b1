//! Core types for the M-Pesa Daraja payment gateway.
//!
//! This crate provides the foundational types used by the M-Pesa gateway
//! client: typed configuration, OAuth token state, the operation catalog,
//! and the Daraja wire formats. It performs no network I/O — the HTTP
//! transport lives in the `mpesa-http` crate.
//!
//! # Overview
//!
//! The Daraja API authenticates every call with a short-lived OAuth2 bearer
//! token obtained through the client-credentials flow. A gateway holds its
//! merchant credentials in a [`config::GatewayConfig`], caches the current
//! [`token::AccessToken`], and refreshes it lazily when an outgoing operation
//! finds it missing or expired.
//!
//! # Modules
//!
//! - [`config`] - Gateway configuration and environment selection
//! - [`error`] - Gateway error taxonomy
//! - [`operation`] - The closed catalog of gateway operations
//! - [`proto`] - Daraja wire format types and password derivation
//! - [`timestamp`] - Unix and Daraja transaction timestamps
//! - [`token`] - OAuth token state, validity, and expiry normalization

pub mod config;
pub mod error;
pub mod operation;
pub mod proto;
pub mod timestamp;
pub mod token;

pub use config::{Environment, GatewayConfig};
pub use error::GatewayError;
pub use operation::Operation;
pub use timestamp::UnixTimestamp;
pub use token::{AccessToken, TokenExpiry, TokenResponse};
