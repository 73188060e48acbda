//! Request handler module
//!
//! Responsible for request routing dispatch. Endpoint logic lives in `api`.

pub mod router;

// Re-export main entry point
pub use router::handle_request;
