//! Schema migrations on an in-memory SQLite database.

use sea_orm::{ConnectionTrait, DbErr, SqlErr};

use remittance_api::infra::Database;

const MIGRATION_COUNT: usize = 7;
const NOW: &str = "2026-02-24 09:30:00+00:00";

async fn migrated() -> Database {
    let db = Database::connect_url("sqlite::memory:").await.unwrap();
    db.run_migrations().await.unwrap();
    db
}

async fn insert_user(db: &Database, email: &str) -> Result<(), DbErr> {
    db.connection()
        .execute_unprepared(&format!(
            "INSERT INTO users (email, password_hash, balances, created_at, updated_at) \
             VALUES ('{email}', 'x', '{{}}', '{NOW}', '{NOW}')"
        ))
        .await
        .map(|_| ())
}

async fn insert_transaction(db: &Database, transaction_id: Option<&str>) -> Result<(), DbErr> {
    let transaction_id = transaction_id
        .map(|id| format!("'{id}'"))
        .unwrap_or_else(|| "NULL".to_string());

    db.connection()
        .execute_unprepared(&format!(
            "INSERT INTO transactions \
             (transaction_id, user_id, type, amount_sent, amount_received, exchange_rate, \
              recipient_details, created_at, updated_at) \
             VALUES ({transaction_id}, 1, 'USD_NGN', 100, 152000, 1520, '{{}}', '{NOW}', '{NOW}')"
        ))
        .await
        .map(|_| ())
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

#[tokio::test]
async fn up_applies_every_migration_in_order() {
    let db = migrated().await;
    let status = db.migration_status().await.unwrap();

    assert_eq!(status.len(), MIGRATION_COUNT);
    assert!(status.iter().all(|(_, applied)| *applied));
    assert_eq!(status[0].0, "m20240101_000001_create_users_table");

    let mut names: Vec<_> = status.iter().map(|(name, _)| name.clone()).collect();
    names.sort();
    assert_eq!(names, status.iter().map(|(name, _)| name.clone()).collect::<Vec<_>>());
}

#[tokio::test]
async fn up_is_idempotent() {
    let db = migrated().await;
    db.run_migrations().await.unwrap();

    let applied = db.migration_status().await.unwrap();
    assert!(applied.iter().all(|(_, applied)| *applied));
}

#[tokio::test]
async fn down_one_step_drops_push_token() {
    let db = migrated().await;
    db.rollback_migrations(1).await.unwrap();

    let status = db.migration_status().await.unwrap();
    assert_eq!(status.iter().filter(|(_, applied)| *applied).count(), MIGRATION_COUNT - 1);
    assert!(!status.last().unwrap().1);

    let err = db
        .connection()
        .execute_unprepared("SELECT push_token FROM users")
        .await;
    assert!(err.is_err());
}

#[tokio::test]
async fn down_all_then_up_restores_schema() {
    let db = migrated().await;
    db.rollback_migrations(MIGRATION_COUNT as u32).await.unwrap();

    let status = db.migration_status().await.unwrap();
    assert!(status.iter().all(|(_, applied)| !*applied));
    assert!(db
        .connection()
        .execute_unprepared("SELECT id FROM users")
        .await
        .is_err());

    db.run_migrations().await.unwrap();
    insert_user(&db, "ada@example.com").await.unwrap();
}

#[tokio::test]
async fn fresh_wipes_data() {
    let db = migrated().await;
    insert_user(&db, "ada@example.com").await.unwrap();

    db.fresh_migrations().await.unwrap();

    // The same email is accepted again because the old row is gone
    insert_user(&db, "ada@example.com").await.unwrap();
}

#[tokio::test]
async fn user_email_is_unique() {
    let db = migrated().await;
    insert_user(&db, "ada@example.com").await.unwrap();

    let err = insert_user(&db, "ada@example.com").await.unwrap_err();
    assert!(is_unique_violation(&err), "{err}");
}

#[tokio::test]
async fn rate_pair_is_unique() {
    let db = migrated().await;
    let insert = format!(
        "INSERT INTO rates (pair, rate, created_at, updated_at) VALUES ('USD_NGN', 1500, '{NOW}', '{NOW}')"
    );

    db.connection().execute_unprepared(&insert).await.unwrap();
    let err = db.connection().execute_unprepared(&insert).await.unwrap_err();

    assert!(is_unique_violation(&err), "{err}");
}

#[tokio::test]
async fn transaction_id_is_unique_but_nullable() {
    let db = migrated().await;
    insert_user(&db, "ada@example.com").await.unwrap();

    insert_transaction(&db, None).await.unwrap();
    insert_transaction(&db, None).await.unwrap();
    insert_transaction(&db, Some("QT-20260224-AB12")).await.unwrap();

    let err = insert_transaction(&db, Some("QT-20260224-AB12"))
        .await
        .unwrap_err();
    assert!(is_unique_violation(&err), "{err}");
}
