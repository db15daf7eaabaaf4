//! Commands module - CLI command implementations.
//!
//! Each command is implemented in its own module.

pub mod maintenance;
pub mod migrate;
pub mod push;
pub mod serve;

use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::Database;
use crate::services::Services;

/// Services for one-shot operator commands; the schema is left untouched.
async fn connect_services(config: Config) -> AppResult<Services> {
    let db = Database::connect_without_migrations(&config)
        .await
        .map_err(|e| AppError::internal(format!("Database connection failed: {}", e)))?;

    Ok(Services::from_connection(db.get_connection(), config, None))
}
