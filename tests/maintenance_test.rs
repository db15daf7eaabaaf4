//! Maintenance jobs against a migrated SQLite database.

use sea_orm::{ConnectionTrait, DbBackend, Statement};

use remittance_api::config::Config;
use remittance_api::domain::TransactionId;
use remittance_api::infra::Database;
use remittance_api::services::{Registration, ServiceContainer, Services};

const CREATED_AT: &str = "2026-02-24T09:30:00+00:00";

async fn setup() -> (Services, Database) {
    let config = Config::new("sqlite::memory:", "maintenance-test-secret-at-least-32-chars");
    let db = Database::connect(&config).await.unwrap();
    let services = Services::from_connection(db.get_connection(), config, None);
    (services, db)
}

async fn services() -> Services {
    setup().await.0
}

/// One sender plus transfers with a NULL, an empty and an assigned id.
async fn seed_transfers(db: &Database) {
    let conn = db.connection();
    conn.execute_unprepared(&format!(
        "INSERT INTO users (email, password_hash, balances, created_at, updated_at) \
         VALUES ('sender@example.com', 'x', '{{}}', '{CREATED_AT}', '{CREATED_AT}')"
    ))
    .await
    .unwrap();

    for transaction_id in ["NULL", "''", "'QT-20240101-KEEP'"] {
        conn.execute_unprepared(&format!(
            "INSERT INTO transactions \
             (transaction_id, user_id, type, amount_sent, amount_received, exchange_rate, \
              recipient_details, created_at, updated_at) \
             VALUES ({transaction_id}, 1, 'USD_NGN', '100.00', '152000.00', '1520.000000', \
                     '{{\"name\": \"Chidi Okafor\"}}', '{CREATED_AT}', '{CREATED_AT}')"
        ))
        .await
        .unwrap();
    }
}

async fn stored_ids(db: &Database) -> Vec<(i32, Option<String>)> {
    db.connection()
        .query_all(Statement::from_string(
            DbBackend::Sqlite,
            "SELECT id, transaction_id FROM transactions ORDER BY id",
        ))
        .await
        .unwrap()
        .iter()
        .map(|row| {
            (
                row.try_get("", "id").unwrap(),
                row.try_get("", "transaction_id").unwrap(),
            )
        })
        .collect()
}

fn registration(email: &str) -> Registration {
    Registration {
        email: email.to_string(),
        password: "SecurePass123!".to_string(),
        first_name: None,
        last_name: None,
    }
}

#[tokio::test]
async fn dump_lists_newest_users_with_token_preview() {
    let services = services().await;
    for email in ["first@example.com", "second@example.com", "third@example.com"] {
        services.auth().register(registration(email)).await.unwrap();
    }

    let entries = services.maintenance().dump_tokens(2).await.unwrap();

    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|e| e.email != "first@example.com"));
    for entry in &entries {
        assert!(!entry.verified);
        let preview = entry.token_preview.as_deref().unwrap();
        assert_eq!(preview.len(), 13);
        assert!(preview.ends_with("..."));
        assert!(entry.expires.is_some());
        assert!(entry.to_string().starts_with(&format!("{} | verified: false | token: ", entry.email)));
    }
}

#[tokio::test]
async fn dedupe_on_clean_table_deletes_nothing() {
    let services = services().await;
    services.auth().register(registration("a@example.com")).await.unwrap();
    services.auth().register(registration("b@example.com")).await.unwrap();

    let report = services.maintenance().dedupe_users(false).await.unwrap();

    assert!(report.duplicate_ids.is_empty());
    assert_eq!(report.deleted, 0);
    assert_eq!(services.users().list_users().await.unwrap().len(), 2);
}

#[tokio::test]
async fn backfill_fills_null_and_empty_ids_only() {
    let (services, db) = setup().await;
    seed_transfers(&db).await;

    let report = services.maintenance().backfill_transaction_ids(false).await.unwrap();

    let assigned_rows: Vec<i32> = report.assigned.iter().map(|(id, _)| *id).collect();
    assert_eq!(assigned_rows, vec![1, 2]);

    let stored = stored_ids(&db).await;
    assert_eq!(stored.len(), 3);
    for (id, transaction_id) in &stored[..2] {
        let transaction_id = transaction_id.as_deref().unwrap();
        assert!(transaction_id.starts_with("QT-20260224-"), "{transaction_id}");
        assert!(TransactionId::is_valid(transaction_id));
        assert!(report.assigned.contains(&(*id, transaction_id.to_string())));
    }
    assert_ne!(stored[0].1, stored[1].1);
    assert_eq!(stored[2].1.as_deref(), Some("QT-20240101-KEEP"));
}

#[tokio::test]
async fn backfill_dry_run_leaves_rows_untouched() {
    let (services, db) = setup().await;
    seed_transfers(&db).await;

    let report = services.maintenance().backfill_transaction_ids(true).await.unwrap();

    assert!(report.dry_run);
    assert_eq!(report.assigned.len(), 2);

    let stored = stored_ids(&db).await;
    assert_eq!(stored[0].1, None);
    assert_eq!(stored[1].1.as_deref(), Some(""));
    assert_eq!(stored[2].1.as_deref(), Some("QT-20240101-KEEP"));
}

#[tokio::test]
async fn backfill_on_empty_table_is_noop() {
    let services = services().await;
    let report = services.maintenance().backfill_transaction_ids(false).await.unwrap();

    assert!(report.assigned.is_empty());
    assert!(!report.dry_run);
}
