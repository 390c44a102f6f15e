//! The `Fetcher`: a base URL, a set of default headers, and one method per
//! HTTP verb.
//!
//! # Design
//! Every verb forwards to a single `request` routine parameterized by
//! `HttpMethod`. That routine is split the same way as the transport types:
//! `build_request` produces an `HttpRequest`, the transport executes it, and
//! `parse_response` turns the `HttpResponse` into the caller's type. The two
//! pure halves are public so a host that does its own I/O can reuse them.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error};

use crate::config::RequestConfig;
use crate::error::FetchError;
use crate::http::{set_header, Credentials, HttpMethod, HttpRequest, HttpResponse};
use crate::transport::{ReqwestTransport, Transport};

/// Base URL used when none is given at construction.
pub const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com/";

/// Environment variable read by [`Fetcher::from_env`].
pub const BASE_URL_ENV: &str = "FETCHER_BASE_URL";

const CSRF_HEADER: &str = "csrf";
const CSRF_TOKEN: &str = "token";

/// JSON-over-HTTP client bound to one base URL.
///
/// Fields are fixed at construction, so a single instance can serve any
/// number of concurrent calls; each call owns its own request and response.
#[derive(Debug, Clone)]
pub struct Fetcher<C = ReqwestTransport> {
    base_url: String,
    headers: Vec<(String, String)>,
    transport: C,
}

impl Fetcher<ReqwestTransport> {
    pub fn new(base_url: Option<&str>) -> Result<Self, FetchError> {
        Ok(Self::with_transport(base_url, ReqwestTransport::new()?))
    }

    /// Build a fetcher from `FETCHER_BASE_URL`, falling back to
    /// [`DEFAULT_BASE_URL`] when it is unset.
    pub fn from_env() -> Result<Self, FetchError> {
        let base_url = std::env::var(BASE_URL_ENV).ok();
        Self::new(base_url.as_deref())
    }
}

impl<C: Transport> Fetcher<C> {
    pub fn with_transport(base_url: Option<&str>, transport: C) -> Self {
        let base_url = base_url.unwrap_or(DEFAULT_BASE_URL).to_string();
        let headers = vec![
            (CSRF_HEADER.to_string(), CSRF_TOKEN.to_string()),
            ("Referer".to_string(), base_url.clone()),
        ];
        Self {
            base_url,
            headers,
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Headers sent with every request unless overridden per call.
    pub fn default_headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn transport(&self) -> &C {
        &self.transport
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        config: Option<&RequestConfig>,
    ) -> Result<T, FetchError> {
        self.request::<(), T>(HttpMethod::Get, path, None, config).await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
        config: Option<&RequestConfig>,
    ) -> Result<T, FetchError> {
        self.request::<(), T>(HttpMethod::Delete, path, None, config).await
    }

    /// A successful HEAD response has no body; it reads as JSON `null`, so use
    /// `()` or an `Option` as `T`.
    pub async fn head<T: DeserializeOwned>(
        &self,
        path: &str,
        config: Option<&RequestConfig>,
    ) -> Result<T, FetchError> {
        self.request::<(), T>(HttpMethod::Head, path, None, config).await
    }

    pub async fn options<T: DeserializeOwned>(
        &self,
        path: &str,
        config: Option<&RequestConfig>,
    ) -> Result<T, FetchError> {
        self.request::<(), T>(HttpMethod::Options, path, None, config).await
    }

    pub async fn post<B, T>(
        &self,
        path: &str,
        body: Option<&B>,
        config: Option<&RequestConfig>,
    ) -> Result<T, FetchError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(HttpMethod::Post, path, body, config).await
    }

    pub async fn put<B, T>(
        &self,
        path: &str,
        body: Option<&B>,
        config: Option<&RequestConfig>,
    ) -> Result<T, FetchError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(HttpMethod::Put, path, body, config).await
    }

    pub async fn patch<B, T>(
        &self,
        path: &str,
        body: Option<&B>,
        config: Option<&RequestConfig>,
    ) -> Result<T, FetchError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(HttpMethod::Patch, path, body, config).await
    }

    /// Produce the outgoing request without touching the network.
    ///
    /// The URL is `base_url + path` with no normalization. Headers layer as
    /// defaults, then `Content-Type: application/json`, then the caller's
    /// headers; names compare case-insensitively and the later layer wins.
    /// A body that serializes to `null`, `false`, zero or `""` sends no
    /// payload.
    pub fn build_request<B: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&B>,
        config: Option<&RequestConfig>,
    ) -> Result<HttpRequest, FetchError> {
        let mut headers = self.headers.clone();
        set_header(&mut headers, "Content-Type", "application/json");

        let mut request = HttpRequest {
            method,
            url: format!("{}{path}", self.base_url),
            headers,
            body: None,
            credentials: Credentials::Include,
            timeout: None,
            signal: None,
        };

        if let Some(config) = config {
            for (name, value) in &config.headers {
                set_header(&mut request.headers, name, value);
            }
            if let Some(method) = config.method {
                request.method = method;
            }
            if let Some(credentials) = config.credentials {
                request.credentials = credentials;
            }
            request.timeout = config.timeout;
            request.signal = config.signal.clone();
        }

        if let Some(body) = body {
            let json =
                serde_json::to_string(body).map_err(|e| FetchError::Serialize(e.to_string()))?;
            if !is_falsy(&json) {
                request.body = Some(json);
            }
        }

        Ok(request)
    }

    /// Interpret a buffered response: non-2xx is `NotOk`, anything else is
    /// parsed as JSON.
    pub fn parse_response<T: DeserializeOwned>(
        &self,
        response: HttpResponse,
    ) -> Result<T, FetchError> {
        if !response.is_success() {
            return Err(FetchError::NotOk);
        }
        serde_json::from_str(&response.body).map_err(|e| FetchError::Decode(e.to_string()))
    }

    async fn request<B, T>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&B>,
        config: Option<&RequestConfig>,
    ) -> Result<T, FetchError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = match self.build_request(method, path, body, config) {
            Ok(request) => request,
            Err(err) => {
                let url = format!("{}{path}", self.base_url);
                error!(%method, %url, error = %err, "fetcher error");
                return Err(err);
            }
        };

        let method = request.method;
        let url = request.url.clone();
        let response = match self.transport.execute(request).await {
            Ok(response) => response,
            Err(err) => {
                let err = FetchError::from(err);
                error!(%method, %url, error = %err, "fetcher error");
                return Err(err);
            }
        };

        let status = response.status;
        debug!(%method, %url, status, "fetcher response");
        let parsed = if method == HttpMethod::Head && response.is_success() {
            serde_json::from_value(serde_json::Value::Null)
                .map_err(|e| FetchError::Decode(e.to_string()))
        } else {
            self.parse_response(response)
        };
        parsed.inspect_err(|err| {
            error!(%method, %url, status, error = %err, "fetcher error");
        })
    }
}

/// JSON text for the values a falsy check rejects: `null`, `false`, `""`
/// and any spelling of zero.
fn is_falsy(json: &str) -> bool {
    matches!(json, "null" | "false" | "\"\"") || json.parse::<f64>().is_ok_and(|n| n == 0.0)
}
