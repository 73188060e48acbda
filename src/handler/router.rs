//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: route matching, body limits,
//! endpoint dispatch, CORS headers and access logging.

use crate::api::{self, ApiError, ApiResult, EndpointInput, ROUTES};
use crate::config::AppState;
use crate::http::{self, cors};
use crate::logger::{self, AccessLogEntry};
use crate::routing::{allowed_methods, match_route, RouteMatch};
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::{CONTENT_LENGTH, ORIGIN, REFERER, USER_AGENT};
use hyper::{HeaderMap, Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let started = Instant::now();
    let (parts, body) = req.into_parts();
    let path = parts.uri.path().to_string();
    let origin = header_str(&parts.headers, ORIGIN.as_str()).map(ToString::to_string);
    let cors_origin = cors::allowed_origin(&state.config.http.cors, &path, origin.as_deref());

    let mut response = if parts.method == Method::OPTIONS {
        preflight(&path, &state, cors_origin)
    } else {
        let mut response = route_request(&parts.method, &path, &parts.headers, body, &state)
            .await
            .unwrap_or_else(ApiError::into_response);
        if let Some(origin) = cors_origin {
            cors::apply_cors_headers(&mut response, origin);
        }
        response
    };

    if parts.method == Method::HEAD {
        response = http::strip_body(response);
    }

    if state.access_log_enabled() {
        let mut entry = AccessLogEntry::new(
            remote_addr.ip().to_string(),
            parts.method.to_string(),
            path.clone(),
        );
        entry.query = parts.uri.query().map(ToString::to_string);
        entry.http_version = version_label(parts.version).to_string();
        entry.status = response.status().as_u16();
        entry.body_bytes = usize::try_from(response.body().size_hint().exact().unwrap_or(0))
            .unwrap_or(usize::MAX);
        entry.referer = header_str(&parts.headers, REFERER.as_str()).map(ToString::to_string);
        entry.user_agent = header_str(&parts.headers, USER_AGENT.as_str()).map(ToString::to_string);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Match the route, enforce the body limit and run the endpoint
async fn route_request<B>(
    method: &Method,
    path: &str,
    headers: &HeaderMap,
    body: B,
    state: &AppState,
) -> ApiResult
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    // HEAD is served by the GET route
    let route_method = if *method == Method::HEAD {
        &Method::GET
    } else {
        method
    };

    let (route, params) = match match_route(route_method, path, &ROUTES) {
        RouteMatch::Found { route, params } => (route, params),
        RouteMatch::MethodNotAllowed { allowed } => {
            logger::log_warning(&format!("Method not allowed: {method} {path}"));
            return Err(ApiError::MethodNotAllowed { allowed });
        }
        RouteMatch::NotFound => {
            logger::log_debug(&format!("No route for {method} {path}"));
            return Err(ApiError::EndpointNotFound);
        }
    };

    let max_body_size = state.config.http.max_body_size;
    check_body_size(headers, max_body_size)?;
    let body = read_body(body, max_body_size).await?;

    let input = EndpointInput {
        params: &params,
        body: &body,
        app: &state.config.app,
    };
    run_guarded(|| api::dispatch(route.handler, &input))
}

/// Answer OPTIONS for a known path, adding preflight headers for allowed origins
fn preflight(path: &str, state: &AppState, cors_origin: Option<&str>) -> Response<Full<Bytes>> {
    let allowed = allowed_methods(path, &ROUTES);
    if allowed.is_empty() {
        return ApiError::EndpointNotFound.into_response();
    }

    let mut response = http::build_options_response(&allowed);
    if let Some(origin) = cors_origin {
        cors::apply_preflight_headers(&mut response, &state.config.http.cors, origin);
    }
    response
}

/// Reject a declared `Content-Length` over the limit before reading anything
fn check_body_size(headers: &HeaderMap, max_body_size: u64) -> Result<(), ApiError> {
    let Some(value) = headers.get(CONTENT_LENGTH) else {
        return Ok(());
    };
    match value.to_str().ok().and_then(|s| s.parse::<u64>().ok()) {
        Some(size) if size > max_body_size => {
            logger::log_warning(&format!(
                "Request body too large: {size} bytes (max: {max_body_size})"
            ));
            Err(ApiError::PayloadTooLarge)
        }
        Some(_) => Ok(()),
        None => {
            logger::log_warning("Invalid Content-Length header, skipping size check");
            Ok(())
        }
    }
}

/// Collect the body, stopping at the limit
async fn read_body<B>(body: B, max_body_size: u64) -> Result<Bytes, ApiError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.is::<LengthLimitError>() => {
            logger::log_warning(&format!("Request body exceeded {max_body_size} bytes"));
            Err(ApiError::PayloadTooLarge)
        }
        Err(e) => {
            logger::log_error(&format!("Failed to read request body: {e}"));
            Err(ApiError::Internal)
        }
    }
}

/// Run an endpoint, turning a panic into an internal error
fn run_guarded<F>(endpoint: F) -> ApiResult
where
    F: FnOnce() -> ApiResult,
{
    match catch_unwind(AssertUnwindSafe(endpoint)) {
        Ok(Err(ApiError::Internal)) => {
            logger::log_error("Endpoint reported an internal error");
            Err(ApiError::Internal)
        }
        Ok(result) => result,
        Err(_) => {
            logger::log_error("Endpoint panicked");
            Err(ApiError::Internal)
        }
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

const fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
