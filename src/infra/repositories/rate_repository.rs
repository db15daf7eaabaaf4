//! Rate repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use super::entities::rate::{self, ActiveModel, Entity as RateEntity};
use crate::config::DEFAULT_RATE_SPREAD_PERCENT;
use crate::domain::{Rate, RateUpsert};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Rate repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait RateRepository: Send + Sync {
    /// Find the rate row of a normalized pair
    async fn find_by_pair(&self, pair: &str) -> AppResult<Option<Rate>>;

    /// All pairs, alphabetically
    async fn list(&self) -> AppResult<Vec<Rate>>;

    /// Insert a new pair; an existing pair yields `Conflict`
    async fn create(&self, values: RateUpsert) -> AppResult<Rate>;

    /// Overwrite the values of an existing row
    async fn update(&self, id: i32, values: RateUpsert) -> AppResult<Rate>;
}

/// Concrete implementation of RateRepository
pub struct RateStore {
    db: DatabaseConnection,
}

impl RateStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RateRepository for RateStore {
    async fn find_by_pair(&self, pair: &str) -> AppResult<Option<Rate>> {
        let result = RateEntity::find()
            .filter(rate::Column::Pair.eq(pair))
            .one(&self.db)
            .await?;

        Ok(result.map(Rate::from))
    }

    async fn list(&self) -> AppResult<Vec<Rate>> {
        let models = RateEntity::find()
            .order_by_asc(rate::Column::Pair)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Rate::from).collect())
    }

    async fn create(&self, values: RateUpsert) -> AppResult<Rate> {
        let now = Utc::now();
        let active_model = ActiveModel {
            pair: Set(values.pair),
            rate: Set(values.rate),
            manual_rate: Set(values.manual_rate),
            use_manual: Set(values.use_manual),
            spread: Set(values
                .spread
                .unwrap_or_else(|| Decimal::from(DEFAULT_RATE_SPREAD_PERCENT))),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(|e| AppError::from_db(e, "Rate"))?;

        Ok(Rate::from(model))
    }

    async fn update(&self, id: i32, values: RateUpsert) -> AppResult<Rate> {
        let existing = RateEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: ActiveModel = existing.into();
        active.rate = Set(values.rate);
        active.manual_rate = Set(values.manual_rate);
        active.use_manual = Set(values.use_manual);
        if let Some(spread) = values.spread {
            active.spread = Set(spread);
        }
        active.updated_at = Set(Utc::now());

        let model = active.update(&self.db).await?;
        Ok(Rate::from(model))
    }
}
