//! JSON-over-HTTP client with a fixed base URL and default headers.
//!
//! # Overview
//! `Fetcher` exposes one async method per HTTP verb (GET, DELETE, HEAD,
//! OPTIONS, POST, PUT, PATCH). Each call concatenates the base URL with a
//! relative path, merges default and per-call headers, sends an optional JSON
//! body, and parses the JSON response into the caller's type.
//!
//! # Design
//! - `Fetcher` is immutable after construction; share it freely.
//! - Requests and responses are plain data (`HttpRequest`, `HttpResponse`).
//!   `build_request` and `parse_response` are pure, and a `Transport` does
//!   the I/O between them. `ReqwestTransport` is the production transport.
//! - Failures are logged once via `tracing` and returned unchanged; nothing
//!   is retried.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod transport;

pub use client::{Fetcher, BASE_URL_ENV, DEFAULT_BASE_URL};
pub use config::RequestConfig;
pub use error::{FetchError, TransportError};
pub use http::{Credentials, HttpMethod, HttpRequest, HttpResponse};
pub use transport::{ReqwestTransport, Transport};
