//! HTTP protocol layer module
//!
//! Protocol-level helpers (response builders, CORS, path decoding) kept apart
//! from the route handlers.

pub mod cors;
pub mod path;
pub mod response;

// Re-export commonly used types
pub use path::percent_decode;
pub use response::{
    build_404_response, build_405_response, build_413_response, build_detail_response,
    build_json_response,
};
