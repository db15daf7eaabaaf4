//! Transaction repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};

use super::entities::transaction::{self, ActiveModel, Entity as TransactionEntity};
use super::entities::user::Entity as UserEntity;
use crate::domain::{NewTransaction, Transaction, TransactionStatus};
use crate::errors::{AppError, AppResult};
use crate::types::PaginationParams;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Transaction repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    /// Find transfer by row ID
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Transaction>>;

    /// Insert a new transfer in `pending` status
    async fn create(&self, new_tx: NewTransaction) -> AppResult<Transaction>;

    /// Page through a sender's transfers, newest first
    async fn list_for_user(
        &self,
        user_id: i32,
        params: &PaginationParams,
    ) -> AppResult<(Vec<Transaction>, u64)>;

    /// Page through every transfer, newest first
    async fn list_all(&self, params: &PaginationParams) -> AppResult<(Vec<Transaction>, u64)>;

    /// Transfers assigned to a vendor joined with the sender's email
    async fn list_for_vendor_with_sender(
        &self,
        vendor_id: i32,
    ) -> AppResult<Vec<(Transaction, Option<String>)>>;

    /// Set status, assigning a vendor when one is given
    async fn update_status(
        &self,
        id: i32,
        status: TransactionStatus,
        vendor_id: Option<i32>,
    ) -> AppResult<Transaction>;

    /// Attach a proof-of-payment URL
    async fn attach_proof(
        &self,
        id: i32,
        url: String,
        uploaded_at: DateTime<Utc>,
    ) -> AppResult<Transaction>;

    /// Rows whose public id is NULL or empty, ascending by id
    async fn list_missing_transaction_id(&self) -> AppResult<Vec<Transaction>>;

    /// Write the public id of one row. Collisions yield `Conflict`.
    async fn set_transaction_id(&self, id: i32, transaction_id: String) -> AppResult<()>;
}

/// Concrete implementation of TransactionRepository
pub struct TransactionStore {
    db: DatabaseConnection,
}

impl TransactionStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_model(&self, id: i32) -> AppResult<transaction::Model> {
        TransactionEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }
}

#[async_trait]
impl TransactionRepository for TransactionStore {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Transaction>> {
        let result = TransactionEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(Transaction::from))
    }

    async fn create(&self, new_tx: NewTransaction) -> AppResult<Transaction> {
        let now = Utc::now();
        let active_model = ActiveModel {
            transaction_id: Set(Some(new_tx.transaction_id)),
            user_id: Set(new_tx.user_id),
            vendor_id: Set(new_tx.vendor_id),
            kind: Set(new_tx.kind),
            amount_sent: Set(new_tx.amount_sent),
            amount_received: Set(new_tx.amount_received),
            exchange_rate: Set(new_tx.exchange_rate),
            recipient_details: Set(new_tx.recipient_details),
            status: Set(TransactionStatus::Pending.as_str().to_string()),
            proof_of_payment_url: Set(None),
            proof_uploaded_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(|e| AppError::from_db(e, "Transaction"))?;

        Ok(Transaction::from(model))
    }

    async fn list_for_user(
        &self,
        user_id: i32,
        params: &PaginationParams,
    ) -> AppResult<(Vec<Transaction>, u64)> {
        let paginator = TransactionEntity::find()
            .filter(transaction::Column::UserId.eq(user_id))
            .order_by_desc(transaction::Column::CreatedAt)
            .paginate(&self.db, params.limit());

        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(params.page.saturating_sub(1)).await?;

        Ok((models.into_iter().map(Transaction::from).collect(), total))
    }

    async fn list_all(&self, params: &PaginationParams) -> AppResult<(Vec<Transaction>, u64)> {
        let paginator = TransactionEntity::find()
            .order_by_desc(transaction::Column::CreatedAt)
            .paginate(&self.db, params.limit());

        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(params.page.saturating_sub(1)).await?;

        Ok((models.into_iter().map(Transaction::from).collect(), total))
    }

    async fn list_for_vendor_with_sender(
        &self,
        vendor_id: i32,
    ) -> AppResult<Vec<(Transaction, Option<String>)>> {
        let rows = TransactionEntity::find()
            .filter(transaction::Column::VendorId.eq(vendor_id))
            .find_also_related(UserEntity)
            .order_by_desc(transaction::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(tx, sender)| (Transaction::from(tx), sender.map(|u| u.email)))
            .collect())
    }

    async fn update_status(
        &self,
        id: i32,
        status: TransactionStatus,
        vendor_id: Option<i32>,
    ) -> AppResult<Transaction> {
        let mut active: ActiveModel = self.find_model(id).await?.into();

        active.status = Set(status.as_str().to_string());
        if vendor_id.is_some() {
            active.vendor_id = Set(vendor_id);
        }
        active.updated_at = Set(Utc::now());

        let model = active.update(&self.db).await?;
        Ok(Transaction::from(model))
    }

    async fn attach_proof(
        &self,
        id: i32,
        url: String,
        uploaded_at: DateTime<Utc>,
    ) -> AppResult<Transaction> {
        let mut active: ActiveModel = self.find_model(id).await?.into();

        active.proof_of_payment_url = Set(Some(url));
        active.proof_uploaded_at = Set(Some(uploaded_at));
        active.updated_at = Set(Utc::now());

        let model = active.update(&self.db).await?;
        Ok(Transaction::from(model))
    }

    async fn list_missing_transaction_id(&self) -> AppResult<Vec<Transaction>> {
        let models = TransactionEntity::find()
            .filter(
                Condition::any()
                    .add(transaction::Column::TransactionId.is_null())
                    .add(transaction::Column::TransactionId.eq("")),
            )
            .order_by_asc(transaction::Column::Id)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Transaction::from).collect())
    }

    async fn set_transaction_id(&self, id: i32, transaction_id: String) -> AppResult<()> {
        let result = TransactionEntity::update_many()
            .col_expr(
                transaction::Column::TransactionId,
                sea_orm::sea_query::Expr::value(transaction_id),
            )
            .filter(transaction::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| AppError::from_db(e, "Transaction id"))?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }
}
