//! API layer - HTTP handlers and middleware
//!
//! Routes, request handlers, the JWT middleware, the validated JSON
//! extractor and the OpenAPI document.

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use routes::create_router;
pub use state::AppState;
