//! Remittance API - cross-border transfer backend
//!
//! Users send money along a currency pair at a rate maintained by admins,
//! vendors pay the transfers out, and senders are told about every status
//! change by push notification.
//!
//! # Layers
//!
//! - **cli** / **commands**: server and operator commands
//! - **config**: environment settings and constants
//! - **domain**: users, transactions, rates and push messages
//! - **services**: use cases behind trait objects
//! - **infra**: sea-orm persistence, migrations and the push transport
//! - **api**: axum handlers, middleware and routes
//! - **types**: pagination and shared responses
//! - **ui**: render models for the mobile client widgets
//! - **errors**: centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! remittance-api serve
//! remittance-api migrate up
//! remittance-api maintenance backfill-transaction-ids --dry-run
//! remittance-api push send --token 'ExponentPushToken[...]' --title Hi --body There
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;
pub mod types;
pub mod ui;

pub use api::AppState;
pub use config::Config;
pub use domain::{Transaction, TransactionStatus, User, UserRole};
pub use errors::{AppError, AppResult};
pub use infra::Database;
