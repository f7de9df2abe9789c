//! HTTP API layer.
//!
//! - [`routes`]: router construction and health check
//! - [`handlers`]: one handler per operation
//! - [`extract`]: bearer authentication and JSON-rejecting extractors
//! - [`dto`]: request and response bodies
//! - [`error`]: mapping of service failures to JSON error responses

pub mod dto;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod routes;

pub use error::{ApiError, ApiErrorResponse};
pub use extract::AuthenticatedUser;
pub use routes::create_router;
