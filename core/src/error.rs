//! Error types for the ordering API client.
//!
//! # Design
//! `OrderRejected` gets a dedicated variant because callers present it
//! differently ("this store won't take that order") from a generic failure.
//! The upstream's `-1` status carries no further detail, so neither does the
//! variant. Currency failures keep the structured `CentsError` so callers can
//! tell a malformed amount from an overflowing one.

use thiserror::Error;

use crate::money::CentsError;

/// Errors returned by `OrderingClient` operations and `OrderingApi` parse
/// methods.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The HTTP exchange failed: connection refused, timeout, TLS failure, or
    /// an unreadable response body.
    #[error("transport failed: {0}")]
    TransportError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The response body was not JSON or did not match the expected shape.
    #[error("decoding response failed: {0}")]
    DecodeError(String),

    /// A currency amount in the response could not be converted to cents.
    #[error("currency conversion failed: {0}")]
    ConversionError(#[from] CentsError),

    /// The upstream answered with status -1 and declined to price the order.
    #[error("the store declined to price this order")]
    OrderRejected,

    /// A request URL could not be resolved against the base URL.
    #[error("invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}
