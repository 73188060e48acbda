// API type definitions
// Request and response envelopes for the JSON endpoints

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const STATUS_SUCCESS: &str = "success";
pub const STATUS_ERROR: &str = "error";
pub const STATUS_HEALTHY: &str = "healthy";

/// Fixture user record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: u64,
    pub name: &'static str,
    pub email: &'static str,
    pub role: &'static str,
}

/// `GET /`
#[derive(Debug, Serialize)]
pub struct WelcomeResponse<'a> {
    pub status: &'static str,
    pub message: &'static str,
    pub version: &'a str,
}

/// `GET /api/health`
#[derive(Debug, Serialize)]
pub struct HealthResponse<'a> {
    pub status: &'static str,
    pub service: &'a str,
}

/// `GET /api/message`
#[derive(Debug, Serialize)]
pub struct MessageResponse<'a> {
    pub status: &'static str,
    pub message: &'static str,
    pub data: MessageData<'a>,
}

#[derive(Debug, Serialize)]
pub struct MessageData<'a> {
    pub timestamp: String,
    pub backend: &'a str,
    pub container: &'a str,
}

/// `GET /api/users`
#[derive(Debug, Serialize)]
pub struct UserListResponse<'a> {
    pub status: &'static str,
    pub count: usize,
    pub users: &'a [User],
}

/// `GET /api/users/{id}`
#[derive(Debug, Serialize)]
pub struct UserResponse<'a> {
    pub status: &'static str,
    pub user: &'a User,
}

/// `POST /api/users` body
///
/// Each field is `Some` whenever its key is present, even with a `null` value.
#[derive(Debug, Default, Deserialize)]
pub struct NewUserRequest {
    #[serde(default, deserialize_with = "present")]
    pub name: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub email: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub role: Option<Value>,
}

fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

/// Echo of a creation request; never stored
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatedUser {
    pub id: u64,
    pub name: Value,
    pub email: Value,
    pub role: Value,
}

/// `POST /api/users` success
#[derive(Debug, Serialize)]
pub struct CreatedUserResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub user: CreatedUser,
}

/// Error envelope; `code` is only set for routing-level and internal errors
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_presence() {
        let req: NewUserRequest =
            serde_json::from_str(r#"{"name":null,"role":"admin","extra":1}"#).unwrap();
        assert_eq!(req.name, Some(Value::Null));
        assert_eq!(req.email, None);
        assert_eq!(req.role, Some(Value::from("admin")));
    }

    #[test]
    fn test_error_body_omits_missing_code() {
        let body = ErrorBody {
            status: STATUS_ERROR,
            message: "x".to_string(),
            code: None,
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"status":"error","message":"x"}"#
        );
    }
}
