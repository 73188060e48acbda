// API module entry
// Route table and endpoint dispatch for the JSON API

mod error;
mod fixtures;
mod handlers;
mod types;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Response};

use crate::config::AppConfig;
use crate::routing::{PathParams, Route, Segment};

pub use error::ApiError;

/// Handler outcome, converted to a response once by the router
pub type ApiResult = Result<Response<Full<Bytes>>, ApiError>;

/// Endpoints served by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Index,
    Health,
    Message,
    ListUsers,
    GetUser,
    CreateUser,
}

const ROOT: &[Segment] = &[];
const HEALTH: &[Segment] = &[Segment::Literal("api"), Segment::Literal("health")];
const MESSAGE: &[Segment] = &[Segment::Literal("api"), Segment::Literal("message")];
const USERS: &[Segment] = &[Segment::Literal("api"), Segment::Literal("users")];
const USER_BY_ID: &[Segment] = &[
    Segment::Literal("api"),
    Segment::Literal("users"),
    Segment::Int("id"),
];

/// Route table, matched in order
pub static ROUTES: [Route<Endpoint>; 6] = [
    Route { method: Method::GET, pattern: ROOT, handler: Endpoint::Index },
    Route { method: Method::GET, pattern: HEALTH, handler: Endpoint::Health },
    Route { method: Method::GET, pattern: MESSAGE, handler: Endpoint::Message },
    Route { method: Method::GET, pattern: USERS, handler: Endpoint::ListUsers },
    Route { method: Method::POST, pattern: USERS, handler: Endpoint::CreateUser },
    Route { method: Method::GET, pattern: USER_BY_ID, handler: Endpoint::GetUser },
];

/// Input available to a matched endpoint
pub struct EndpointInput<'a> {
    pub params: &'a PathParams,
    pub body: &'a Bytes,
    pub app: &'a AppConfig,
}

/// Run the handler for a matched endpoint
pub fn dispatch(endpoint: Endpoint, input: &EndpointInput<'_>) -> ApiResult {
    match endpoint {
        Endpoint::Index => handlers::index(input.app),
        Endpoint::Health => handlers::health(input.app),
        Endpoint::Message => handlers::message(input.app),
        Endpoint::ListUsers => handlers::list_users(),
        Endpoint::GetUser => {
            // Captured by USER_BY_ID
            let id = input.params.get("id").ok_or(ApiError::Internal)?;
            handlers::get_user(id)
        }
        Endpoint::CreateUser => handlers::create_user(input.body),
    }
}
