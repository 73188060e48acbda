//! Routing module
//!
//! Fixed route table matching:
//! - Literal path segments and integer captures
//! - Method dispatch with 405 detection

mod matcher;

pub use matcher::{allowed_methods, match_route, PathParams, Route, RouteMatch, Segment};
