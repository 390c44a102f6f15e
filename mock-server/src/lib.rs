use std::collections::BTreeMap;

use axum::{
    body::Bytes,
    extract::Path,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::IntoResponse,
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// What the server saw, sent back verbatim by the fallback route.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Echo {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    /// Lowercased header names; repeated headers are joined with ", ".
    pub headers: BTreeMap<String, String>,
    /// Parsed JSON when possible, raw text otherwise, `null` when empty.
    pub body: Value,
}

pub fn app() -> Router {
    Router::new()
        .route("/status/{code}", any(status))
        .route("/cookies/set/{name}/{value}", get(set_cookie))
        .route("/cookies/redirect/{name}/{value}", get(set_cookie_and_redirect))
        .route("/text", get(text))
        .fallback(echo)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Json<Echo> {
    let mut seen: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in &headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        seen.entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }

    let body = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body).into_owned()))
    };

    tracing::debug!(%method, %uri, "echo");
    Json(Echo {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        headers: seen,
        body,
    })
}

async fn status(Path(code): Path<u16>) -> Result<impl IntoResponse, StatusCode> {
    let status = StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)?;
    Ok((status, Json(json!({ "status": code }))))
}

async fn set_cookie(Path((name, value)): Path<(String, String)>) -> impl IntoResponse {
    (
        [(header::SET_COOKIE, format!("{name}={value}; Path=/"))],
        Json(json!({ "set": name })),
    )
}

/// Sets the cookie on a 302 hop, then sends the client to the echo route.
async fn set_cookie_and_redirect(
    Path((name, value)): Path<(String, String)>,
) -> impl IntoResponse {
    (
        StatusCode::FOUND,
        [
            (header::SET_COOKIE, format!("{name}={value}; Path=/")),
            (header::LOCATION, "/whoami".to_string()),
        ],
    )
}

async fn text() -> &'static str {
    "not json"
}
