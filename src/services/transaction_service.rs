//! Transaction service - transfer lifecycle.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;

use super::NotificationService;
use crate::config::TRANSACTION_ID_ATTEMPTS;
use crate::domain::{
    max_amount, normalize_pair, Actor, NewTransaction, Transaction, TransactionId, TransactionStatus,
    VendorQueueEntry,
};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;
use crate::types::{Paginated, PaginationParams};

/// Transfer request submitted by a sender
#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub pair: String,
    pub amount_sent: Decimal,
    pub recipient_details: serde_json::Value,
    pub vendor_id: Option<i32>,
}

#[async_trait]
pub trait TransactionService: Send + Sync {
    /// Quote the pair, compute the payout and record a `pending` transfer
    async fn create_transfer(&self, actor: &Actor, request: TransferRequest)
        -> AppResult<Transaction>;

    /// Own transfers, or every transfer for admins, newest first
    async fn list_transfers(
        &self,
        actor: &Actor,
        params: &PaginationParams,
    ) -> AppResult<Paginated<Transaction>>;

    /// A transfer visible to its sender, its vendor and admins
    async fn get_transfer(&self, actor: &Actor, id: i32) -> AppResult<Transaction>;

    /// Move a transfer to a new status and notify the sender
    async fn update_status(
        &self,
        actor: &Actor,
        id: i32,
        status: TransactionStatus,
    ) -> AppResult<Transaction>;

    /// Attach the sender's proof of payment
    async fn attach_proof(&self, actor: &Actor, id: i32, url: String) -> AppResult<Transaction>;

    /// Transfers assigned to the calling vendor with each sender's email
    async fn vendor_queue(&self, actor: &Actor) -> AppResult<Vec<VendorQueueEntry>>;
}

pub struct TransferManager<U: UnitOfWork> {
    uow: Arc<U>,
    notifier: Arc<dyn NotificationService>,
}

impl<U: UnitOfWork> TransferManager<U> {
    pub fn new(uow: Arc<U>, notifier: Arc<dyn NotificationService>) -> Self {
        Self { uow, notifier }
    }

    async fn find(&self, id: i32) -> AppResult<Transaction> {
        self.uow
            .transactions()
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound)
    }

    async fn insert_with_fresh_id(&self, mut new_tx: NewTransaction) -> AppResult<Transaction> {
        let today = Utc::now().date_naive();
        let mut attempt = 1;

        loop {
            new_tx.transaction_id = TransactionId::generate(today);
            match self.uow.transactions().create(new_tx.clone()).await {
                Err(AppError::Conflict(_)) if attempt < TRANSACTION_ID_ATTEMPTS => {
                    tracing::warn!(
                        transaction_id = %new_tx.transaction_id,
                        attempt,
                        "Transaction id collision, drawing another"
                    );
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    /// Tell the sender about a status change. Never fails the caller.
    async fn notify_sender(&self, tx: &Transaction) {
        let sender = match self.uow.users().find_by_id(tx.user_id).await {
            Ok(Some(sender)) => sender,
            Ok(None) => return,
            Err(e) => {
                tracing::warn!(error = %e, transaction = tx.id, "Could not load sender for push");
                return;
            }
        };

        let Some(token) = sender.push_token.as_deref() else {
            return;
        };

        let body = format!("Your transfer {} is now {}", tx.reference(), tx.status);
        let data = serde_json::json!({
            "transaction_id": tx.id,
            "reference": tx.reference(),
            "status": tx.status.as_str(),
        });

        if self
            .notifier
            .send_push_notification(token, "Transfer update", &body, Some(data))
            .await
            .is_none()
        {
            tracing::warn!(transaction = tx.id, "Status push was not delivered");
        }
    }
}

#[async_trait]
impl<U: UnitOfWork> TransactionService for TransferManager<U> {
    async fn create_transfer(
        &self,
        actor: &Actor,
        request: TransferRequest,
    ) -> AppResult<Transaction> {
        if request.amount_sent <= Decimal::ZERO {
            return Err(AppError::validation("Amount must be positive"));
        }
        if request.amount_sent > max_amount() {
            return Err(AppError::validation("Amount is too large"));
        }
        if !request.recipient_details.is_object() {
            return Err(AppError::validation("Recipient details must be an object"));
        }

        let pair = normalize_pair(&request.pair)?;
        let rate = self
            .uow
            .rates()
            .find_by_pair(&pair)
            .await?
            .ok_or_else(|| AppError::bad_request(format!("No exchange rate for {}", pair)))?;
        let amount_received = rate
            .convert(request.amount_sent)
            .ok_or_else(|| AppError::validation("Amount is too large for this rate"))?;

        let tx = self
            .insert_with_fresh_id(NewTransaction {
                transaction_id: String::new(),
                user_id: actor.id,
                vendor_id: request.vendor_id,
                kind: pair,
                amount_sent: request.amount_sent,
                amount_received,
                exchange_rate: rate.customer_rate(),
                recipient_details: request.recipient_details,
            })
            .await?;

        tracing::info!(
            transaction = tx.id,
            reference = %tx.reference(),
            user_id = actor.id,
            "Transfer created"
        );
        Ok(tx)
    }

    async fn list_transfers(
        &self,
        actor: &Actor,
        params: &PaginationParams,
    ) -> AppResult<Paginated<Transaction>> {
        let (items, total) = if actor.is_admin() {
            self.uow.transactions().list_all(params).await?
        } else {
            self.uow.transactions().list_for_user(actor.id, params).await?
        };

        Ok(Paginated::new(items, params.page, params.limit(), total))
    }

    async fn get_transfer(&self, actor: &Actor, id: i32) -> AppResult<Transaction> {
        let tx = self.find(id).await?;
        if actor.is_admin() || tx.involves(actor.id) {
            Ok(tx)
        } else {
            Err(AppError::Forbidden)
        }
    }

    async fn update_status(
        &self,
        actor: &Actor,
        id: i32,
        status: TransactionStatus,
    ) -> AppResult<Transaction> {
        if !actor.role.can_process_transfers() {
            return Err(AppError::Forbidden);
        }
        if matches!(status, TransactionStatus::Other(_)) {
            return Err(AppError::validation(format!("Unknown status '{}'", status)));
        }

        let tx = self.find(id).await?;
        if tx.status.is_terminal() {
            return Err(AppError::bad_request(format!(
                "Transaction is already {}",
                tx.status
            )));
        }

        let vendor_id = if actor.is_admin() {
            None
        } else {
            match tx.vendor_id {
                Some(vendor) if vendor != actor.id => return Err(AppError::Forbidden),
                Some(_) => None,
                None => Some(actor.id),
            }
        };

        let updated = self
            .uow
            .transactions()
            .update_status(id, status, vendor_id)
            .await?;

        tracing::info!(
            transaction = id,
            from = %tx.status,
            to = %updated.status,
            by = actor.id,
            "Transfer status changed"
        );

        self.notify_sender(&updated).await;
        Ok(updated)
    }

    async fn attach_proof(&self, actor: &Actor, id: i32, url: String) -> AppResult<Transaction> {
        let tx = self.find(id).await?;
        if tx.user_id != actor.id {
            return Err(AppError::Forbidden);
        }
        if tx.status.is_terminal() {
            return Err(AppError::bad_request(format!(
                "Transaction is already {}",
                tx.status
            )));
        }

        self.uow
            .transactions()
            .attach_proof(id, url, Utc::now())
            .await
    }

    async fn vendor_queue(&self, actor: &Actor) -> AppResult<Vec<VendorQueueEntry>> {
        if !actor.role.can_process_transfers() {
            return Err(AppError::Forbidden);
        }

        let rows = self
            .uow
            .transactions()
            .list_for_vendor_with_sender(actor.id)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(tx, sender_email)| VendorQueueEntry {
                transaction: tx.into(),
                sender_email,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::transaction::fixtures::transaction;
    use crate::domain::user::fixtures::user;
    use crate::domain::{Rate, UserRole};
    use crate::infra::{MockRateRepository, MockTransactionRepository, MockUserRepository};
    use crate::services::test_support::TestUow;
    use crate::services::MockNotificationService;

    const PUSH_TOKEN: &str = "ExpoPushToken[device-1]";

    fn usd_ngn() -> Rate {
        let now = Utc::now();
        Rate {
            id: 1,
            pair: "USD_NGN".into(),
            rate: Decimal::from(1600),
            manual_rate: None,
            use_manual: false,
            spread: Decimal::from(5),
            created_at: now,
            updated_at: now,
        }
    }

    fn sender() -> Actor {
        Actor::new(10, UserRole::User)
    }

    fn vendor() -> Actor {
        Actor::new(20, UserRole::Vendor)
    }

    fn service(
        users: MockUserRepository,
        transactions: MockTransactionRepository,
        rates: MockRateRepository,
        notifier: MockNotificationService,
    ) -> TransferManager<TestUow> {
        TransferManager::new(
            Arc::new(TestUow::new(users, transactions, rates)),
            Arc::new(notifier),
        )
    }

    fn request(amount: i64) -> TransferRequest {
        TransferRequest {
            pair: "usd-ngn".into(),
            amount_sent: Decimal::from(amount),
            recipient_details: serde_json::json!({ "name": "Chidi Okafor" }),
            vendor_id: None,
        }
    }

    #[tokio::test]
    async fn create_quotes_customer_rate() {
        let mut rates = MockRateRepository::new();
        rates
            .expect_find_by_pair()
            .withf(|pair| pair == "USD_NGN")
            .returning(|_| Ok(Some(usd_ngn())));

        let mut transactions = MockTransactionRepository::new();
        transactions.expect_create().times(1).returning(|new_tx| {
            assert!(TransactionId::is_valid(&new_tx.transaction_id));
            assert_eq!(new_tx.exchange_rate, Decimal::from(1520));
            assert_eq!(new_tx.amount_received, Decimal::from(152000));
            assert_eq!(new_tx.kind, "USD_NGN");

            let mut tx = transaction(1, new_tx.user_id, Utc::now());
            tx.transaction_id = Some(new_tx.transaction_id);
            Ok(tx)
        });

        let tx = service(
            MockUserRepository::new(),
            transactions,
            rates,
            MockNotificationService::new(),
        )
        .create_transfer(&sender(), request(100))
        .await
        .unwrap();

        assert_eq!(tx.user_id, 10);
    }

    #[tokio::test]
    async fn create_retries_on_id_collision() {
        let mut rates = MockRateRepository::new();
        rates.expect_find_by_pair().returning(|_| Ok(Some(usd_ngn())));

        let mut transactions = MockTransactionRepository::new();
        let mut seq = mockall::Sequence::new();
        transactions
            .expect_create()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(AppError::conflict("Transaction")));
        transactions
            .expect_create()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|new_tx| Ok(transaction(2, new_tx.user_id, Utc::now())));

        let tx = service(
            MockUserRepository::new(),
            transactions,
            rates,
            MockNotificationService::new(),
        )
        .create_transfer(&sender(), request(50))
        .await
        .unwrap();

        assert_eq!(tx.id, 2);
    }

    #[tokio::test]
    async fn amount_beyond_column_range_is_rejected() {
        let mut rates = MockRateRepository::new();
        rates.expect_find_by_pair().never();
        let mut transactions = MockTransactionRepository::new();
        transactions.expect_create().never();

        let err = service(
            MockUserRepository::new(),
            transactions,
            rates,
            MockNotificationService::new(),
        )
        .create_transfer(
            &sender(),
            TransferRequest {
                amount_sent: Decimal::MAX,
                ..request(1)
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn received_amount_overflow_is_rejected() {
        let mut rates = MockRateRepository::new();
        rates.expect_find_by_pair().returning(|_| Ok(Some(usd_ngn())));
        let mut transactions = MockTransactionRepository::new();
        transactions.expect_create().never();

        let err = service(
            MockUserRepository::new(),
            transactions,
            rates,
            MockNotificationService::new(),
        )
        .create_transfer(
            &sender(),
            TransferRequest {
                amount_sent: max_amount(),
                ..request(1)
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn create_without_rate_is_bad_request() {
        let mut rates = MockRateRepository::new();
        rates.expect_find_by_pair().returning(|_| Ok(None));
        let mut transactions = MockTransactionRepository::new();
        transactions.expect_create().never();

        let err = service(
            MockUserRepository::new(),
            transactions,
            rates,
            MockNotificationService::new(),
        )
        .create_transfer(&sender(), request(100))
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn non_positive_amount_is_rejected() {
        let err = service(
            MockUserRepository::new(),
            MockTransactionRepository::new(),
            MockRateRepository::new(),
            MockNotificationService::new(),
        )
        .create_transfer(&sender(), request(0))
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn terminal_transfer_cannot_change_status() {
        let mut transactions = MockTransactionRepository::new();
        transactions.expect_find_by_id().returning(|id| {
            let mut tx = transaction(id, 10, Utc::now());
            tx.status = TransactionStatus::Sent;
            Ok(Some(tx))
        });
        transactions.expect_update_status().never();

        let err = service(
            MockUserRepository::new(),
            transactions,
            MockRateRepository::new(),
            MockNotificationService::new(),
        )
        .update_status(&vendor(), 1, TransactionStatus::Cancelled)
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn plain_users_cannot_change_status() {
        let err = service(
            MockUserRepository::new(),
            MockTransactionRepository::new(),
            MockRateRepository::new(),
            MockNotificationService::new(),
        )
        .update_status(&sender(), 1, TransactionStatus::Processing)
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Forbidden));
    }

    #[tokio::test]
    async fn vendor_claims_unassigned_transfer_and_sender_is_notified() {
        let mut transactions = MockTransactionRepository::new();
        transactions
            .expect_find_by_id()
            .returning(|id| Ok(Some(transaction(id, 10, Utc::now()))));
        transactions
            .expect_update_status()
            .withf(|id, status, vendor| {
                *id == 1 && *status == TransactionStatus::Processing && *vendor == Some(20)
            })
            .times(1)
            .returning(|id, status, vendor| {
                let mut tx = transaction(id, 10, Utc::now());
                tx.status = status;
                tx.vendor_id = vendor;
                tx.transaction_id = Some("QT-20260224-7K2Q".into());
                Ok(tx)
            });

        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|id| {
            let mut u = user(id, "sender@example.com");
            u.push_token = Some(PUSH_TOKEN.into());
            Ok(Some(u))
        });

        let mut notifier = MockNotificationService::new();
        notifier
            .expect_send_push_notification()
            .withf(|token, _title, body, data| {
                token == PUSH_TOKEN
                    && body.contains("QT-20260224-7K2Q")
                    && body.contains("processing")
                    && data.as_ref().map_or(false, |d| d["status"] == "processing")
            })
            .times(1)
            .returning(|_, _, _, _| Some(Default::default()));

        let tx = service(users, transactions, MockRateRepository::new(), notifier)
            .update_status(&vendor(), 1, TransactionStatus::Processing)
            .await
            .unwrap();

        assert_eq!(tx.vendor_id, Some(20));
    }

    #[tokio::test]
    async fn failed_push_does_not_fail_status_update() {
        let mut transactions = MockTransactionRepository::new();
        transactions
            .expect_find_by_id()
            .returning(|id| Ok(Some(transaction(id, 10, Utc::now()))));
        transactions
            .expect_update_status()
            .returning(|id, status, _| {
                let mut tx = transaction(id, 10, Utc::now());
                tx.status = status;
                Ok(tx)
            });

        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|id| {
            let mut u = user(id, "sender@example.com");
            u.push_token = Some(PUSH_TOKEN.into());
            Ok(Some(u))
        });

        let mut notifier = MockNotificationService::new();
        notifier
            .expect_send_push_notification()
            .times(1)
            .returning(|_, _, _, _| None);

        let admin = Actor::new(1, UserRole::Admin);
        let tx = service(users, transactions, MockRateRepository::new(), notifier)
            .update_status(&admin, 1, TransactionStatus::Sent)
            .await
            .unwrap();

        assert_eq!(tx.status, TransactionStatus::Sent);
    }

    #[tokio::test]
    async fn other_vendors_transfer_is_forbidden() {
        let mut transactions = MockTransactionRepository::new();
        transactions.expect_find_by_id().returning(|id| {
            let mut tx = transaction(id, 10, Utc::now());
            tx.vendor_id = Some(99);
            Ok(Some(tx))
        });
        transactions.expect_update_status().never();

        let err = service(
            MockUserRepository::new(),
            transactions,
            MockRateRepository::new(),
            MockNotificationService::new(),
        )
        .update_status(&vendor(), 1, TransactionStatus::Processing)
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Forbidden));
    }

    #[tokio::test]
    async fn only_sender_attaches_proof() {
        let mut transactions = MockTransactionRepository::new();
        transactions
            .expect_find_by_id()
            .returning(|id| Ok(Some(transaction(id, 10, Utc::now()))));
        transactions.expect_attach_proof().never();

        let err = service(
            MockUserRepository::new(),
            transactions,
            MockRateRepository::new(),
            MockNotificationService::new(),
        )
        .attach_proof(&Actor::new(11, UserRole::User), 1, "https://x.test/p.png".into())
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Forbidden));
    }

    #[tokio::test]
    async fn strangers_cannot_view_transfer() {
        let mut transactions = MockTransactionRepository::new();
        transactions
            .expect_find_by_id()
            .returning(|id| Ok(Some(transaction(id, 10, Utc::now()))));

        let svc = service(
            MockUserRepository::new(),
            transactions,
            MockRateRepository::new(),
            MockNotificationService::new(),
        );

        assert!(svc.get_transfer(&sender(), 1).await.is_ok());
        assert!(matches!(
            svc.get_transfer(&Actor::new(11, UserRole::User), 1).await,
            Err(AppError::Forbidden)
        ));
    }

    #[tokio::test]
    async fn admins_list_every_transfer() {
        let mut transactions = MockTransactionRepository::new();
        transactions.expect_list_for_user().never();
        transactions
            .expect_list_all()
            .times(1)
            .returning(|_| Ok((vec![transaction(1, 10, Utc::now())], 41)));

        let page = service(
            MockUserRepository::new(),
            transactions,
            MockRateRepository::new(),
            MockNotificationService::new(),
        )
        .list_transfers(&Actor::new(1, UserRole::Admin), &PaginationParams::default())
        .await
        .unwrap();

        assert_eq!(page.meta.total, 41);
        assert_eq!(page.meta.total_pages, 3);
    }

    #[tokio::test]
    async fn vendor_queue_carries_sender_email() {
        let mut transactions = MockTransactionRepository::new();
        transactions
            .expect_list_for_vendor_with_sender()
            .withf(|vendor_id| *vendor_id == 20)
            .returning(|_| {
                Ok(vec![(
                    transaction(1, 10, Utc::now()),
                    Some("sender@example.com".to_string()),
                )])
            });

        let queue = service(
            MockUserRepository::new(),
            transactions,
            MockRateRepository::new(),
            MockNotificationService::new(),
        )
        .vendor_queue(&vendor())
        .await
        .unwrap();

        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].sender_email.as_deref(), Some("sender@example.com"));
    }
}
