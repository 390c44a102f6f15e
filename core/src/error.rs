//! Error types for the fetcher.
//!
//! # Design
//! A non-2xx response is reported as the bare `NotOk` variant: the status and
//! body are not carried in the error. The status does reach the diagnostic
//! log line emitted by `Fetcher::request`.

use thiserror::Error;

/// Failures raised while executing a request on the wire.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The caller's cancellation signal fired before a response arrived.
    #[error("request aborted")]
    Aborted,

    #[error("request timeout: {0}")]
    Timeout(String),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request failed: {0}")]
    Request(String),

    /// The underlying HTTP client could not be initialized.
    #[error("failed to build http client: {0}")]
    Client(String),

    /// `base_url + path` did not form a URL the transport can dial.
    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

/// Errors returned by `Fetcher` calls.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server answered with a status outside 200..=299.
    #[error("network response was not ok")]
    NotOk,

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Decode(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialize(String),
}
