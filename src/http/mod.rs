//! HTTP protocol layer module
//!
//! Response builders and the CORS policy, independent of the route handlers.

pub mod cors;
pub mod response;

// Re-export commonly used items
pub use response::{build_json_response, build_options_response, set_allow_header, strip_body};
