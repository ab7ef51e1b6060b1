//! HTTP transport for the M-Pesa Daraja payment gateway.
//!
//! Provides the async [`gateway::Gateway`] client built on `reqwest`: OAuth
//! token acquisition and caching, the Lipa na M-Pesa Online purchase call,
//! and dispatch over the full operation catalog.
//!
//! # Modules
//!
//! - [`constants`] — base URLs and endpoint paths
//! - [`error`] — transport error types
//! - [`token`] — the shared token cache
//! - [`gateway`] — the gateway client

pub mod constants;
pub mod error;
pub mod gateway;
pub mod token;

pub use error::ClientError;
pub use gateway::Gateway;
pub use token::TokenCache;
