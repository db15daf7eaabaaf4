//! Migration: Add proof-of-payment columns to transactions.

use sea_orm_migration::prelude::*;

use super::m20240101_000003_create_transactions_table::Transactions;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Transactions::Table)
                    .add_column(ColumnDef::new(ProofColumns::ProofOfPaymentUrl).string().null())
                    .to_owned(),
            )
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(Transactions::Table)
                    .add_column(
                        ColumnDef::new(ProofColumns::ProofUploadedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Transactions::Table)
                    .drop_column(ProofColumns::ProofUploadedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(Transactions::Table)
                    .drop_column(ProofColumns::ProofOfPaymentUrl)
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
enum ProofColumns {
    ProofOfPaymentUrl,
    ProofUploadedAt,
}
