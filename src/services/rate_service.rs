//! Rate service - exchange rate lookup and maintenance.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::domain::{normalize_pair, Rate, RateUpsert};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;

/// Values submitted for a pair
#[derive(Debug, Clone)]
pub struct RateInput {
    pub rate: Decimal,
    pub manual_rate: Option<Decimal>,
    pub use_manual: bool,
    pub spread: Option<Decimal>,
}

#[async_trait]
pub trait RateService: Send + Sync {
    async fn list_rates(&self) -> AppResult<Vec<Rate>>;

    /// Look up a pair in any accepted spelling (`usd-ngn`, `USD_NGN`)
    async fn get_rate(&self, pair: &str) -> AppResult<Rate>;

    /// Create the pair or overwrite its values
    async fn upsert_rate(&self, pair: &str, input: RateInput) -> AppResult<Rate>;
}

pub struct RateManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> RateManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

fn validate(input: &RateInput) -> AppResult<()> {
    if input.rate <= Decimal::ZERO {
        return Err(AppError::validation("Rate must be positive"));
    }
    if input.manual_rate.is_some_and(|m| m <= Decimal::ZERO) {
        return Err(AppError::validation("Manual rate must be positive"));
    }
    if input.use_manual && input.manual_rate.is_none() {
        return Err(AppError::validation("use_manual requires a manual rate"));
    }
    if let Some(spread) = input.spread {
        if spread < Decimal::ZERO || spread >= Decimal::ONE_HUNDRED {
            return Err(AppError::validation("Spread must be between 0 and 100"));
        }
    }
    Ok(())
}

#[async_trait]
impl<U: UnitOfWork> RateService for RateManager<U> {
    async fn list_rates(&self) -> AppResult<Vec<Rate>> {
        self.uow.rates().list().await
    }

    async fn get_rate(&self, pair: &str) -> AppResult<Rate> {
        let pair = normalize_pair(pair)?;
        self.uow
            .rates()
            .find_by_pair(&pair)
            .await?
            .ok_or(AppError::NotFound)
    }

    async fn upsert_rate(&self, pair: &str, input: RateInput) -> AppResult<Rate> {
        let pair = normalize_pair(pair)?;
        validate(&input)?;

        let values = RateUpsert {
            pair: pair.clone(),
            rate: input.rate,
            manual_rate: input.manual_rate,
            use_manual: input.use_manual,
            spread: input.spread,
        };

        let rates = self.uow.rates();
        let rate = match rates.find_by_pair(&pair).await? {
            Some(existing) => rates.update(existing.id, values).await?,
            None => rates.create(values).await?,
        };

        tracing::info!(pair = %rate.pair, rate = %rate.effective_rate(), "Rate saved");
        Ok(rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::MockRateRepository;
    use crate::services::test_support::TestUow;
    use chrono::Utc;

    fn stored(id: i32, pair: &str) -> Rate {
        let now = Utc::now();
        Rate {
            id,
            pair: pair.to_string(),
            rate: Decimal::from(1600),
            manual_rate: None,
            use_manual: false,
            spread: Decimal::from(5),
            created_at: now,
            updated_at: now,
        }
    }

    fn input() -> RateInput {
        RateInput {
            rate: Decimal::from(1650),
            manual_rate: None,
            use_manual: false,
            spread: None,
        }
    }

    fn service(rates: MockRateRepository) -> RateManager<TestUow> {
        RateManager::new(Arc::new(TestUow::with_rates(rates)))
    }

    #[tokio::test]
    async fn lookup_normalizes_pair() {
        let mut rates = MockRateRepository::new();
        rates
            .expect_find_by_pair()
            .withf(|pair| pair == "USD_NGN")
            .returning(|pair| Ok(Some(stored(1, pair))));

        let rate = service(rates).get_rate("usd-ngn").await.unwrap();
        assert_eq!(rate.pair, "USD_NGN");
    }

    #[tokio::test]
    async fn upsert_updates_existing_pair() {
        let mut rates = MockRateRepository::new();
        rates
            .expect_find_by_pair()
            .returning(|pair| Ok(Some(stored(3, pair))));
        rates.expect_create().never();
        rates
            .expect_update()
            .withf(|id, values| *id == 3 && values.rate == Decimal::from(1650))
            .times(1)
            .returning(|id, values| {
                let mut rate = stored(id, &values.pair);
                rate.rate = values.rate;
                Ok(rate)
            });

        let rate = service(rates).upsert_rate("USD_NGN", input()).await.unwrap();
        assert_eq!(rate.rate, Decimal::from(1650));
    }

    #[tokio::test]
    async fn upsert_creates_missing_pair() {
        let mut rates = MockRateRepository::new();
        rates.expect_find_by_pair().returning(|_| Ok(None));
        rates
            .expect_create()
            .times(1)
            .returning(|values| Ok(stored(1, &values.pair)));

        let rate = service(rates).upsert_rate("gbp_kes", input()).await.unwrap();
        assert_eq!(rate.pair, "GBP_KES");
    }

    #[tokio::test]
    async fn manual_selection_requires_manual_rate() {
        let mut rates = MockRateRepository::new();
        rates.expect_find_by_pair().never();

        let err = service(rates)
            .upsert_rate(
                "USD_NGN",
                RateInput {
                    use_manual: true,
                    ..input()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
    }
}
