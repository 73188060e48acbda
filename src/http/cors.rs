//! Cross-origin resource sharing
//!
//! Allow-list policy scoped to a path prefix. Requests from origins outside
//! the list, or to paths outside the prefix, get no CORS headers at all.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{
    HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE, VARY,
};
use hyper::Response;

use crate::config::CorsConfig;

/// Return the request origin if the policy accepts it for this path
pub fn allowed_origin<'a>(cors: &CorsConfig, path: &str, origin: Option<&'a str>) -> Option<&'a str> {
    if !cors.enabled || !path.starts_with(&cors.path_prefix) {
        return None;
    }
    let origin = origin?;
    cors.allowed_origins
        .iter()
        .any(|o| o == "*" || o.eq_ignore_ascii_case(origin))
        .then_some(origin)
}

/// Headers for an actual (non-preflight) request from an allowed origin
pub fn apply_cors_headers(response: &mut Response<Full<Bytes>>, origin: &str) {
    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(origin) {
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, value);
        headers.append(VARY, HeaderValue::from_static("Origin"));
    }
}

/// Headers for a preflight response from an allowed origin
pub fn apply_preflight_headers(response: &mut Response<Full<Bytes>>, cors: &CorsConfig, origin: &str) {
    apply_cors_headers(response, origin);
    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&cors.allowed_methods.join(", ")) {
        headers.insert(ACCESS_CONTROL_ALLOW_METHODS, value);
    }
    if let Ok(value) = HeaderValue::from_str(&cors.allowed_headers.join(", ")) {
        headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, value);
    }
    headers.insert(ACCESS_CONTROL_MAX_AGE, HeaderValue::from(cors.max_age));
}
