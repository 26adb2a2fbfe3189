//! HTTP protocol layer module
//!
//! Response bodies, validator headers and status-specific response builders.
//! Nothing here knows how a variant was chosen.

pub mod body;
pub mod cache;
pub mod response;

// Re-export commonly used types
pub use body::{chunked, ResponseBody};
pub use response::{
    build_404_response, build_405_response, build_406_response, build_500_response,
    build_served_response,
};
