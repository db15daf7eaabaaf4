//! HTTP request handlers.

pub mod auth_handler;
pub mod rate_handler;
pub mod transaction_handler;
pub mod user_handler;

pub use auth_handler::auth_routes;
pub use rate_handler::rate_routes;
pub use transaction_handler::transaction_routes;
pub use user_handler::user_routes;
