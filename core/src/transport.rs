//! The I/O half of the fetcher: executes an `HttpRequest` on the wire.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use reqwest::cookie::Jar;
use reqwest::{ClientBuilder, Method, Url};

use crate::error::TransportError;
use crate::http::{Credentials, HttpMethod, HttpRequest, HttpResponse};

/// Executes a fully built request and buffers the whole response.
///
/// Implementations must return non-2xx responses as data; status
/// interpretation belongs to `Fetcher::parse_response`.
pub trait Transport: Send + Sync {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + Send + 'a>>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + Send + 'a>> {
        (**self).execute(request)
    }
}

/// Production transport backed by `reqwest`.
///
/// Two clients share one connection policy but differ in cookie handling:
/// the `Include` client reads and writes the jar on every hop, redirects
/// included; the `Omit` client has no cookie store at all. Clones share the
/// jar, so every `Fetcher` built on clones of one transport sees the same
/// session.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    with_cookies: reqwest::Client,
    without_cookies: reqwest::Client,
    jar: Arc<Jar>,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, TransportError> {
        let jar = Arc::new(Jar::default());
        let with_cookies = client_builder()
            .cookie_provider(Arc::clone(&jar))
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;
        let without_cookies = client_builder()
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;
        Ok(Self {
            with_cookies,
            without_cookies,
            jar,
        })
    }

    pub fn cookie_jar(&self) -> &Arc<Jar> {
        &self.jar
    }

    async fn exchange(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = Url::parse(&request.url)
            .map_err(|e| TransportError::InvalidUrl(format!("{}: {e}", request.url)))?;

        let client = match request.credentials {
            Credentials::Include => &self.with_cookies,
            Credentials::Omit => &self.without_cookies,
        };
        let mut builder = client.request(to_reqwest_method(request.method), url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(classify)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Request(format!("failed to read response body: {e}")))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

impl Transport for ReqwestTransport {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + Send + 'a>> {
        Box::pin(async move {
            let signal = request.signal.clone();
            let exchange = self.exchange(request);
            match signal {
                Some(signal) => tokio::select! {
                    biased;
                    () = signal.cancelled() => Err(TransportError::Aborted),
                    result = exchange => result,
                },
                None => exchange.await,
            }
        })
    }
}

fn client_builder() -> ClientBuilder {
    reqwest::Client::builder()
        .user_agent(concat!("fetcher/", env!("CARGO_PKG_VERSION")))
}

fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Delete => Method::DELETE,
        HttpMethod::Head => Method::HEAD,
        HttpMethod::Options => Method::OPTIONS,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
    }
}

fn classify(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout(e.to_string())
    } else if e.is_connect() {
        TransportError::Connect(e.to_string())
    } else {
        TransportError::Request(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_util::sync::CancellationToken;

    fn request(url: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: url.to_string(),
            headers: Vec::new(),
            body: None,
            credentials: Credentials::Include,
            timeout: None,
            signal: None,
        }
    }

    #[test]
    fn every_method_maps_to_reqwest() {
        assert_eq!(to_reqwest_method(HttpMethod::Head), Method::HEAD);
        assert_eq!(to_reqwest_method(HttpMethod::Options), Method::OPTIONS);
        assert_eq!(to_reqwest_method(HttpMethod::Patch), Method::PATCH);
    }

    #[test]
    fn client_build_failure_is_reported_not_replaced() {
        let transport = ReqwestTransport::new();
        assert!(transport.is_ok());
        let err = TransportError::Client("no tls backend".to_string());
        assert_eq!(err.to_string(), "failed to build http client: no tls backend");
    }

    #[tokio::test]
    async fn malformed_url_is_rejected_before_dialing() {
        let transport = ReqwestTransport::new().unwrap();
        let err = transport
            .execute(request("api.example.com/users/1"))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn cancelled_signal_aborts() {
        let transport = ReqwestTransport::new().unwrap();
        let signal = CancellationToken::new();
        signal.cancel();
        let mut req = request("http://127.0.0.1:9/never");
        req.signal = Some(signal);
        let err = transport.execute(req).await.unwrap_err();
        assert!(matches!(err, TransportError::Aborted));
    }
}
