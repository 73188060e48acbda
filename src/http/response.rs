//! HTTP response building module
//!
//! JSON and header-only response builders shared by the router and handlers.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, ALLOW, CONTENT_LENGTH, CONTENT_TYPE};
use hyper::{Method, Response, StatusCode};
use serde::Serialize;

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Body used when the real payload cannot be serialized
const SERIALIZE_FALLBACK: &str =
    r#"{"status":"error","message":"Error interno del servidor","code":500}"#;

/// Build a JSON response with the given status
pub fn build_json_response<T: Serialize + ?Sized>(
    status: StatusCode,
    body: &T,
) -> Response<Full<Bytes>> {
    let (status, json) = match serde_json::to_vec(body) {
        Ok(json) => (status, json),
        Err(e) => {
            log_build_error("JSON", &e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                SERIALIZE_FALLBACK.as_bytes().to_vec(),
            )
        }
    };

    let content_length = json.len();
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
        .header(CONTENT_LENGTH, content_length)
        .body(Full::new(Bytes::from(json)))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(Full::new(Bytes::from_static(SERIALIZE_FALLBACK.as_bytes())))
        })
}

/// Build 204 No Content response advertising the allowed methods
pub fn build_options_response(allowed: &[Method]) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header(ALLOW, allow_header_value(allowed))
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("OPTIONS", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Comma-separated method list for `Allow`; GET implies HEAD, OPTIONS always present
pub fn allow_header_value(allowed: &[Method]) -> String {
    let mut names: Vec<&str> = allowed.iter().map(Method::as_str).collect();
    if allowed.contains(&Method::GET) && !allowed.contains(&Method::HEAD) {
        names.push(Method::HEAD.as_str());
    }
    if !allowed.contains(&Method::OPTIONS) {
        names.push(Method::OPTIONS.as_str());
    }
    names.join(", ")
}

/// Set the `Allow` header on an existing response
pub fn set_allow_header(response: &mut Response<Full<Bytes>>, allowed: &[Method]) {
    if let Ok(value) = HeaderValue::from_str(&allow_header_value(allowed)) {
        response.headers_mut().insert(ALLOW, value);
    }
}

/// Drop the body for a HEAD request, keeping status and headers
pub fn strip_body(response: Response<Full<Bytes>>) -> Response<Full<Bytes>> {
    let (parts, _) = response.into_parts();
    Response::from_parts(parts, Full::new(Bytes::new()))
}

/// Log response build error
fn log_build_error(kind: &str, error: &impl std::fmt::Display) {
    crate::logger::log_error(&format!("Failed to build {kind} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[tokio::test]
    async fn test_json_response_headers_and_body() {
        let resp = build_json_response(StatusCode::CREATED, &serde_json::json!({"a": 1}));
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(resp.headers()[CONTENT_TYPE], JSON_CONTENT_TYPE);
        assert_eq!(resp.headers()[CONTENT_LENGTH], "7");
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], br#"{"a":1}"#);
    }

    #[test]
    fn test_allow_header_value() {
        assert_eq!(allow_header_value(&[Method::GET]), "GET, HEAD, OPTIONS");
        assert_eq!(
            allow_header_value(&[Method::GET, Method::POST]),
            "GET, POST, HEAD, OPTIONS"
        );
        assert_eq!(allow_header_value(&[Method::POST]), "POST, OPTIONS");
    }

    #[tokio::test]
    async fn test_strip_body_keeps_headers() {
        let resp = strip_body(build_json_response(StatusCode::OK, &[1, 2, 3]));
        assert_eq!(resp.headers()[CONTENT_LENGTH], "7");
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert!(body.is_empty());
    }

    #[test]
    fn test_options_response() {
        let resp = build_options_response(&[Method::GET, Method::POST]);
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert_eq!(resp.headers()[ALLOW], "GET, POST, HEAD, OPTIONS");
    }
}
