//! Maintenance jobs run by operators from the CLI.
//!
//! Each job is a short sequence of store queries. Store errors abort the job
//! and propagate to the caller; nothing is retried.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::config::TOKEN_DUMP_PREVIEW_CHARS;
use crate::domain::{TransactionId, User};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;

/// Outcome of the duplicate-user cleanup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DedupeReport {
    /// Ids of the later duplicates, ascending
    pub duplicate_ids: Vec<i32>,
    /// Rows actually removed (0 on a dry run)
    pub deleted: u64,
}

/// One line of the verification-token dump
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenDumpEntry {
    pub email: String,
    pub verified: bool,
    pub token_preview: Option<String>,
    pub expires: Option<DateTime<Utc>>,
}

impl TokenDumpEntry {
    pub fn from_user(user: &User) -> Self {
        Self {
            email: user.email.clone(),
            verified: user.is_email_verified,
            token_preview: user
                .email_verification_token
                .as_deref()
                .map(token_preview),
            expires: user.email_verification_expires,
        }
    }
}

impl fmt::Display for TokenDumpEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | verified: {} | token: {} | expires: {}",
            self.email,
            self.verified,
            self.token_preview.as_deref().unwrap_or("none"),
            self.expires
                .map(|at| at.to_rfc3339())
                .unwrap_or_else(|| "none".to_string()),
        )
    }
}

/// Outcome of the transaction-id backfill
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackfillReport {
    /// `(row id, assigned transaction id)` in ascending row order
    pub assigned: Vec<(i32, String)>,
    pub dry_run: bool,
}

/// First characters of a token followed by `...`.
pub fn token_preview(token: &str) -> String {
    let head: String = token.chars().take(TOKEN_DUMP_PREVIEW_CHARS).collect();
    format!("{}...", head)
}

/// Ids to delete so that only the lowest-id row per email survives.
pub fn plan_duplicate_removal(users: &[User]) -> Vec<i32> {
    let mut ordered: Vec<&User> = users.iter().collect();
    ordered.sort_by_key(|u| u.id);

    let mut seen = HashSet::new();
    ordered
        .into_iter()
        .filter(|u| !seen.insert(u.email.as_str()))
        .map(|u| u.id)
        .collect()
}

#[async_trait]
pub trait MaintenanceService: Send + Sync {
    /// Keep the first occurrence of each email, delete the rest in one batch
    async fn dedupe_users(&self, dry_run: bool) -> AppResult<DedupeReport>;

    /// Verification state of the most recently created users
    async fn dump_tokens(&self, limit: u64) -> AppResult<Vec<TokenDumpEntry>>;

    /// Give every transfer without a public id one derived from its creation date
    async fn backfill_transaction_ids(&self, dry_run: bool) -> AppResult<BackfillReport>;
}

pub struct Maintenance<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> Maintenance<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> MaintenanceService for Maintenance<U> {
    async fn dedupe_users(&self, dry_run: bool) -> AppResult<DedupeReport> {
        let users = self.uow.users().list().await?;
        let duplicate_ids = plan_duplicate_removal(&users);

        tracing::info!(
            scanned = users.len(),
            duplicates = duplicate_ids.len(),
            dry_run,
            "Duplicate users found"
        );

        let deleted = if dry_run || duplicate_ids.is_empty() {
            0
        } else {
            self.uow.users().delete_many(duplicate_ids.clone()).await?
        };

        Ok(DedupeReport {
            duplicate_ids,
            deleted,
        })
    }

    async fn dump_tokens(&self, limit: u64) -> AppResult<Vec<TokenDumpEntry>> {
        let users = self.uow.users().list_recent(limit).await?;
        Ok(users.iter().map(TokenDumpEntry::from_user).collect())
    }

    async fn backfill_transaction_ids(&self, dry_run: bool) -> AppResult<BackfillReport> {
        let missing = self.uow.transactions().list_missing_transaction_id().await?;
        let mut assigned = Vec::with_capacity(missing.len());

        for tx in missing
            .iter()
            .filter(|tx| TransactionId::is_missing(tx.transaction_id.as_deref()))
        {
            let transaction_id = TransactionId::generate(tx.created_at.date_naive());

            if !dry_run {
                if let Err(e) = self
                    .uow
                    .transactions()
                    .set_transaction_id(tx.id, transaction_id.clone())
                    .await
                {
                    if matches!(e, AppError::Conflict(_)) {
                        tracing::error!(
                            transaction = tx.id,
                            transaction_id = %transaction_id,
                            "Transaction id collision, aborting backfill"
                        );
                    }
                    return Err(e);
                }
                tracing::debug!(transaction = tx.id, transaction_id = %transaction_id, "Backfilled");
            }

            assigned.push((tx.id, transaction_id));
        }

        tracing::info!(count = assigned.len(), dry_run, "Transaction id backfill finished");
        Ok(BackfillReport { assigned, dry_run })
    }
}
