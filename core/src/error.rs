//! Error types for the web service helper.
//!
//! # Design
//! Transport failures and unexpected statuses are kept apart so a caller can
//! tell "the request never completed" from "the server answered with a
//! non-2xx status". Persistence errors carry a rendered message because the
//! storage backend is pluggable and its native error type is not ours to
//! expose.

use thiserror::Error;

/// Errors returned by the settings store, the request compiler and the
/// response helpers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The HTTP client could not complete the round-trip (connection refused,
    /// TLS failure, timeout).
    #[error("transport failed: {0}")]
    Transport(String),

    /// The server returned a non-2xx status.
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// The stored `method` setting is not a supported HTTP method.
    #[error("unsupported HTTP method: {0:?}")]
    InvalidMethod(String),

    /// The settings backend could not read or write a bundle.
    #[error("settings persistence failed: {0}")]
    Persistence(String),

    /// A settings bundle could not be (de)serialized.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
