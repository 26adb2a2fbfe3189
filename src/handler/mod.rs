//! Request handler module
//!
//! Maps request paths into storage and dispatches them through negotiation
//! and resolution.

pub mod path;
pub mod router;

// Re-export main entry points
pub use path::map_request_path;
pub use router::{handle_fault, handle_request};
