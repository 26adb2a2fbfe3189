//! HTTP content negotiation over a directory of stored variants.
//!
//! A request for `/doc` is answered with whichever of `doc.html`, `doc.txt`,
//! ... best matches the client's Accept header. Client preference decides
//! first, the configured representation order second, and the first variant
//! that exists on disk is served.

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod negotiation;
pub mod resolver;
pub mod server;

pub use config::{Config, Settings};
pub use error::{ConfigError, ServeError};
pub use handler::handle_request;
pub use negotiation::{negotiate, AcceptHeader, Representation};
pub use resolver::{resolve, RequestMethod, ResolvedOutcome};
