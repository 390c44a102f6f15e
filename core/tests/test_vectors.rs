//! Verify `build_request` / `parse_response` against JSON test vectors stored
//! in `test-vectors/`.
//!
//! Bodies are compared as parsed JSON (not raw strings) so field ordering in
//! the vector files does not matter. Header lists are compared exactly,
//! order and spelling included.

use fetcher_core::{Credentials, FetchError, Fetcher, HttpMethod, HttpResponse, RequestConfig};
use serde_json::Value;

fn pairs(value: &Value) -> Vec<(String, String)> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|h| {
            let arr = h.as_array().unwrap();
            (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
        })
        .collect()
}

fn parse_method(value: &Value) -> HttpMethod {
    value.as_str().unwrap().parse().unwrap()
}

fn parse_credentials(value: &Value) -> Credentials {
    match value.as_str().unwrap() {
        "include" => Credentials::Include,
        "omit" => Credentials::Omit,
        other => panic!("unknown credentials mode: {other}"),
    }
}

fn parse_config(value: &Value) -> RequestConfig {
    let mut config = RequestConfig::new();
    if let Some(headers) = value.get("headers") {
        config.headers = pairs(headers);
    }
    if let Some(method) = value.get("method") {
        config.method = Some(parse_method(method));
    }
    if let Some(credentials) = value.get("credentials") {
        config.credentials = Some(parse_credentials(credentials));
    }
    config
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[test]
fn request_test_vectors() {
    let raw = include_str!("../../test-vectors/requests.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let fetcher = Fetcher::new(case["base_url"].as_str()).unwrap();
        let config = case.get("config").map(parse_config);
        let body = case.get("body");
        let expected = &case["expected_request"];

        let method = parse_method(&case["method"]);
        let path = case["path"].as_str().unwrap();
        let req = fetcher
            .build_request(method, path, body, config.as_ref())
            .unwrap();

        assert_eq!(req.method, parse_method(&expected["method"]), "{name}: method");
        assert_eq!(req.url, expected["url"].as_str().unwrap(), "{name}: url");
        assert_eq!(req.headers, pairs(&expected["headers"]), "{name}: headers");
        let credentials = parse_credentials(&expected["credentials"]);
        assert_eq!(req.credentials, credentials, "{name}: credentials");

        match req.body.as_deref() {
            Some(text) => {
                let sent: Value = serde_json::from_str(text).unwrap();
                assert_eq!(sent, expected["body"], "{name}: body");
            }
            None => assert!(expected["body"].is_null(), "{name}: expected a payload"),
        }
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[test]
fn response_test_vectors() {
    let raw = include_str!("../../test-vectors/responses.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let fetcher = Fetcher::new(None).unwrap();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let sim = &case["simulated_response"];
        let response = HttpResponse {
            status: sim["status"].as_u64().unwrap() as u16,
            headers: Vec::new(),
            body: sim["body"].as_str().unwrap().to_string(),
        };
        let result = fetcher.parse_response::<Value>(response);

        if let Some(expected_error) = case.get("expected_error") {
            let err = result.unwrap_err();
            match expected_error.as_str().unwrap() {
                "NotOk" => assert!(matches!(err, FetchError::NotOk), "{name}: expected NotOk"),
                "Decode" => {
                    assert!(matches!(err, FetchError::Decode(_)), "{name}: expected Decode")
                }
                other => panic!("{name}: unknown expected_error: {other}"),
            }
        } else {
            assert_eq!(result.unwrap(), case["expected_result"], "{name}: parsed result");
        }
    }
}
