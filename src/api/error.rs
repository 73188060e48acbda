// API error module
// Every failure the router or a handler can produce, rendered as one envelope

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Response, StatusCode};
use thiserror::Error;

use super::types::{ErrorBody, STATUS_ERROR};
use crate::http::{build_json_response, set_allow_header};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Valid route, unknown user id (the digits as requested)
    #[error("Usuario con ID {0} no encontrado")]
    UserNotFound(String),

    /// No route matches the path
    #[error("Endpoint no encontrado")]
    EndpointNotFound,

    #[error("Método HTTP no permitido para este endpoint")]
    MethodNotAllowed { allowed: Vec<Method> },

    /// Required body fields absent, in declaration order
    #[error("Campos requeridos faltantes: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Cuerpo de la petición demasiado grande")]
    PayloadTooLarge,

    #[error("Error interno del servidor")]
    Internal,
}

impl ApiError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::UserNotFound(_) | Self::EndpointNotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Self::MissingFields(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Handler-level errors omit `code`; routing-level and internal ones carry it
    const fn carries_code(&self) -> bool {
        !matches!(self, Self::UserNotFound(_) | Self::MissingFields(_))
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            status: STATUS_ERROR,
            message: self.to_string(),
            code: self.carries_code().then(|| self.status().as_u16()),
        }
    }

    pub fn into_response(self) -> Response<Full<Bytes>> {
        let mut response = build_json_response(self.status(), &self.body());
        if let Self::MethodNotAllowed { allowed } = &self {
            set_allow_header(&mut response, allowed);
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::header::ALLOW;

    #[test]
    fn test_messages() {
        assert_eq!(
            ApiError::UserNotFound("999".to_string()).to_string(),
            "Usuario con ID 999 no encontrado"
        );
        assert_eq!(
            ApiError::MissingFields(vec!["name", "email"]).to_string(),
            "Campos requeridos faltantes: name, email"
        );
        assert_eq!(
            ApiError::MissingFields(vec!["email"]).to_string(),
            "Campos requeridos faltantes: email"
        );
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::UserNotFound("1".to_string()).status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::EndpointNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::MethodNotAllowed { allowed: vec![] }.status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(ApiError::MissingFields(vec![]).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::PayloadTooLarge.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(ApiError::Internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_envelope_code_field() {
        let json = serde_json::to_value(ApiError::EndpointNotFound.body()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"status": "error", "message": "Endpoint no encontrado", "code": 404})
        );

        let json = serde_json::to_value(ApiError::UserNotFound("7".to_string()).body()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"status": "error", "message": "Usuario con ID 7 no encontrado"})
        );

        let json = serde_json::to_value(ApiError::Internal.body()).unwrap();
        assert_eq!(json["code"], 500);
        assert_eq!(json["message"], "Error interno del servidor");
    }

    #[test]
    fn test_method_not_allowed_sets_allow_header() {
        let resp = ApiError::MethodNotAllowed {
            allowed: vec![Method::GET],
        }
        .into_response();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.headers()[ALLOW], "GET, HEAD, OPTIONS");
    }
}
