//! CLI argument definitions.
//!
//! Uses clap derive macros for type-safe argument parsing.

use clap::{Parser, Subcommand};

use crate::config::{DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT, DEFAULT_TOKEN_DUMP_LIMIT};

/// Remittance API server and operator tooling
#[derive(Parser, Debug)]
#[command(name = "remittance-api")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve(ServeArgs),

    /// Run database migrations
    Migrate(MigrateArgs),

    /// One-off data maintenance tasks
    Maintenance(MaintenanceArgs),

    /// Push notification tools
    Push(PushArgs),
}

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Host to bind to
    #[arg(short = 'H', long, default_value = DEFAULT_SERVER_HOST, env = "SERVER_HOST")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = DEFAULT_SERVER_PORT, env = "SERVER_PORT")]
    pub port: u16,
}

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    #[command(subcommand)]
    pub action: MigrateAction,
}

/// Migration actions
#[derive(Subcommand, Debug)]
pub enum MigrateAction {
    /// Run pending migrations
    Up,
    /// Roll back applied migrations, newest first
    Down {
        /// Number of migrations to revert
        #[arg(short, long, default_value_t = 1)]
        steps: u32,
    },
    /// Show migration status
    Status,
    /// Drop everything and re-run all migrations
    Fresh,
}

#[derive(Parser, Debug)]
pub struct MaintenanceArgs {
    #[command(subcommand)]
    pub task: MaintenanceTask,
}

#[derive(Subcommand, Debug)]
pub enum MaintenanceTask {
    /// Delete users whose email repeats, keeping the oldest row
    DedupeUsers {
        /// Report duplicates without deleting
        #[arg(long)]
        dry_run: bool,
    },
    /// Print verification state of the newest users
    DumpTokens {
        #[arg(short, long, default_value_t = DEFAULT_TOKEN_DUMP_LIMIT)]
        limit: u64,
    },
    /// Assign public ids to transfers that lack one
    BackfillTransactionIds {
        /// Print the ids that would be assigned without writing
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Parser, Debug)]
pub struct PushArgs {
    #[command(subcommand)]
    pub action: PushAction,
}

#[derive(Subcommand, Debug)]
pub enum PushAction {
    /// Send one notification to one device
    Send {
        /// Expo push token of the device
        #[arg(long)]
        token: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        body: String,
        /// Extra payload as a JSON object
        #[arg(long)]
        data: Option<String>,
    },
}
