// Endpoint handlers
// Pure functions from parsed request input to a JSON response or an ApiError

use chrono::{Local, SecondsFormat};
use hyper::body::Bytes;
use hyper::StatusCode;
use serde_json::Value;

use super::error::ApiError;
use super::fixtures::{self, CREATED_USER_ID, DEFAULT_ROLE, USERS};
use super::types::{
    CreatedUser, CreatedUserResponse, HealthResponse, MessageData, MessageResponse,
    NewUserRequest, UserListResponse, UserResponse, WelcomeResponse, STATUS_HEALTHY,
    STATUS_SUCCESS,
};
use super::ApiResult;
use crate::config::AppConfig;
use crate::http::build_json_response;
use crate::logger;

/// `GET /`
pub fn index(app: &AppConfig) -> ApiResult {
    Ok(build_json_response(
        StatusCode::OK,
        &WelcomeResponse {
            status: STATUS_SUCCESS,
            message: "Bienvenido a la API del Backend",
            version: &app.version,
        },
    ))
}

/// `GET /api/health`
pub fn health(app: &AppConfig) -> ApiResult {
    Ok(build_json_response(
        StatusCode::OK,
        &HealthResponse {
            status: STATUS_HEALTHY,
            service: &app.service_name,
        },
    ))
}

/// `GET /api/message`
pub fn message(app: &AppConfig) -> ApiResult {
    Ok(build_json_response(
        StatusCode::OK,
        &MessageResponse {
            status: STATUS_SUCCESS,
            message: "Hola desde el Backend con Docker!",
            data: MessageData {
                timestamp: Local::now().to_rfc3339_opts(SecondsFormat::Micros, false),
                backend: &app.backend_name,
                container: &app.container_name,
            },
        },
    ))
}

/// `GET /api/users`
pub fn list_users() -> ApiResult {
    logger::log_debug(&format!("Listing {} fixture users", USERS.len()));
    Ok(build_json_response(
        StatusCode::OK,
        &UserListResponse {
            status: STATUS_SUCCESS,
            count: USERS.len(),
            users: &USERS,
        },
    ))
}

/// `GET /api/users/{id}`
///
/// `id` is the captured digit text; ids too wide for `u64` are simply unknown.
pub fn get_user(id: &str) -> ApiResult {
    let user = id
        .parse::<u64>()
        .ok()
        .and_then(fixtures::find_user)
        .ok_or_else(|| ApiError::UserNotFound(id.to_string()))?;
    Ok(build_json_response(
        StatusCode::OK,
        &UserResponse {
            status: STATUS_SUCCESS,
            user,
        },
    ))
}

/// `POST /api/users`
///
/// Validates key presence only and echoes the submitted fields back.
pub fn create_user(body: &Bytes) -> ApiResult {
    let request = parse_new_user(body).unwrap_or_default();
    let user = validate_new_user(request)?;
    logger::log_info(&format!("Fabricated user {} (not persisted)", user.email));

    Ok(build_json_response(
        StatusCode::CREATED,
        &CreatedUserResponse {
            status: STATUS_SUCCESS,
            message: "Usuario creado exitosamente",
            user,
        },
    ))
}

/// Decode the body as a JSON object; anything else counts as no body
fn parse_new_user(body: &[u8]) -> Option<NewUserRequest> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(value @ Value::Object(_)) => serde_json::from_value(value).ok(),
        Ok(_) => None,
        Err(e) => {
            logger::log_debug(&format!("Rejected malformed JSON body: {e}"));
            None
        }
    }
}

fn validate_new_user(request: NewUserRequest) -> Result<CreatedUser, ApiError> {
    match (request.name, request.email) {
        (Some(name), Some(email)) => Ok(CreatedUser {
            id: CREATED_USER_ID,
            name,
            email,
            role: request.role.unwrap_or_else(|| Value::from(DEFAULT_ROLE)),
        }),
        (name, email) => {
            let missing = [("name", name.is_none()), ("email", email.is_none())]
                .into_iter()
                .filter_map(|(field, absent)| absent.then_some(field))
                .collect();
            Err(ApiError::MissingFields(missing))
        }
    }
}
