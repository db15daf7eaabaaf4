//! Maintenance command - operator data fixes.

use crate::cli::args::{MaintenanceArgs, MaintenanceTask};
use crate::config::Config;
use crate::errors::AppResult;
use crate::services::ServiceContainer;

pub async fn execute(args: MaintenanceArgs, config: Config) -> AppResult<()> {
    let services = super::connect_services(config).await?;
    let maintenance = services.maintenance();

    match args.task {
        MaintenanceTask::DedupeUsers { dry_run } => {
            let report = maintenance.dedupe_users(dry_run).await?;
            if report.duplicate_ids.is_empty() {
                println!("No duplicate users found");
            } else if dry_run {
                println!(
                    "Would delete {} duplicate users: {:?}",
                    report.duplicate_ids.len(),
                    report.duplicate_ids
                );
            } else {
                println!(
                    "Deleted {} duplicate users: {:?}",
                    report.deleted, report.duplicate_ids
                );
            }
        }
        MaintenanceTask::DumpTokens { limit } => {
            for entry in maintenance.dump_tokens(limit).await? {
                println!("{}", entry);
            }
        }
        MaintenanceTask::BackfillTransactionIds { dry_run } => {
            let report = maintenance.backfill_transaction_ids(dry_run).await?;
            for (id, transaction_id) in &report.assigned {
                println!("{} -> {}", id, transaction_id);
            }
            let verb = if dry_run { "Would assign" } else { "Assigned" };
            println!("{} {} transaction ids", verb, report.assigned.len());
        }
    }

    Ok(())
}
