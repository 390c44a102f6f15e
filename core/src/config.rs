//! Per-call overrides accepted by every `Fetcher` verb.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::http::{Credentials, HttpMethod};

/// Caller-supplied options for a single request.
///
/// `headers` are merged over the fetcher's defaults, caller wins. Every other
/// field replaces the corresponding transport setting outright.
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    pub headers: Vec<(String, String)>,
    pub method: Option<HttpMethod>,
    pub credentials: Option<Credentials>,
    pub timeout: Option<Duration>,
    pub signal: Option<CancellationToken>,
}

impl RequestConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = Some(method);
        self
    }

    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn signal(mut self, signal: CancellationToken) -> Self {
        self.signal = Some(signal);
        self
    }
}
