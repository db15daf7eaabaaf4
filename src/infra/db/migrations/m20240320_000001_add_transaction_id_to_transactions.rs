//! Migration: Add the public transaction identifier.
//!
//! Existing rows stay NULL until `maintenance backfill-transaction-ids`
//! runs; the unique index tolerates multiple NULLs.

use sea_orm_migration::prelude::*;

use super::m20240101_000003_create_transactions_table::Transactions;

const INDEX_NAME: &str = "idx_transactions_transaction_id";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Transactions::Table)
                    .add_column(
                        ColumnDef::new(TransactionIdColumn::TransactionId)
                            .string_len(32)
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(INDEX_NAME)
                    .table(Transactions::Table)
                    .col(TransactionIdColumn::TransactionId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name(INDEX_NAME)
                    .table(Transactions::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(Transactions::Table)
                    .drop_column(TransactionIdColumn::TransactionId)
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
enum TransactionIdColumn {
    TransactionId,
}
