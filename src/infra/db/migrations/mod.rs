//! Database migrations.
//!
//! Each migration is a separate module following SeaORM conventions.
//! Migration names follow the pattern: m{YYYYMMDD}_{NNNNNN}_{description}
//!
//! Every `up` has a matching `down`, and column additions are issued one
//! column per `ALTER TABLE` and decimal precision stays at 16 or below so
//! the same set runs on SQLite.

use sea_orm_migration::prelude::*;

mod m20240101_000001_create_users_table;
mod m20240101_000002_create_rates_table;
mod m20240101_000003_create_transactions_table;
mod m20240215_000001_add_password_reset_to_users;
mod m20240301_000001_add_proof_of_payment_to_transactions;
mod m20240320_000001_add_transaction_id_to_transactions;
mod m20240402_000001_add_push_token_to_users;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_users_table::Migration),
            Box::new(m20240101_000002_create_rates_table::Migration),
            Box::new(m20240101_000003_create_transactions_table::Migration),
            Box::new(m20240215_000001_add_password_reset_to_users::Migration),
            Box::new(m20240301_000001_add_proof_of_payment_to_transactions::Migration),
            Box::new(m20240320_000001_add_transaction_id_to_transactions::Migration),
            Box::new(m20240402_000001_add_push_token_to_users::Migration),
        ]
    }
}
