//! CLI module - Command-line interface for the application.
//!
//! Provides commands for:
//! - `serve` - Start the HTTP server
//! - `migrate` - Database migrations
//! - `maintenance` - Data cleanup and backfills
//! - `push` - Manual push notifications

pub mod args;

pub use args::{Cli, Commands};
