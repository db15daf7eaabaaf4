//! Exchange rates keyed by currency pair.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::{AMOUNT_SCALE, RATE_SCALE};
use crate::domain::transaction::max_amount;
use crate::errors::{AppError, AppResult};

static PAIR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{3}_[A-Z]{3}$").expect("pair pattern is valid"));

/// Normalize a currency pair (`usd-ngn`, `USD_NGN`) to `USD_NGN`.
pub fn normalize_pair(raw: &str) -> AppResult<String> {
    let pair = raw.trim().to_uppercase().replace(['-', '/'], "_");
    if PAIR_PATTERN.is_match(&pair) {
        Ok(pair)
    } else {
        Err(AppError::validation(format!(
            "Invalid currency pair '{}', expected e.g. USD_NGN",
            raw
        )))
    }
}

/// Exchange rate domain entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rate {
    pub id: i32,
    pub pair: String,
    /// Rate from the automated feed
    pub rate: Decimal,
    /// Operator override
    pub manual_rate: Option<Decimal>,
    pub use_manual: bool,
    /// Spread in percent
    pub spread: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Rate {
    /// The mid rate currently in force.
    pub fn effective_rate(&self) -> Decimal {
        match (self.use_manual, self.manual_rate) {
            (true, Some(manual)) => manual,
            _ => self.rate,
        }
    }

    /// Rate offered to customers: the effective rate less the spread.
    pub fn customer_rate(&self) -> Decimal {
        let factor = Decimal::ONE - self.spread / Decimal::ONE_HUNDRED;
        (self.effective_rate() * factor)
            .round_dp_with_strategy(RATE_SCALE, RoundingStrategy::MidpointAwayFromZero)
    }

    /// Amount the recipient gets for `amount_sent` at the customer rate.
    ///
    /// `None` when the product overflows or exceeds [`max_amount`].
    pub fn convert(&self, amount_sent: Decimal) -> Option<Decimal> {
        amount_sent
            .checked_mul(self.customer_rate())
            .map(|v| v.round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::MidpointAwayFromZero))
            .filter(|v| *v <= max_amount())
    }

    pub fn source_currency(&self) -> &str {
        self.pair.split('_').next().unwrap_or(&self.pair)
    }
}

/// Values written by a rate upsert
#[derive(Debug, Clone)]
pub struct RateUpsert {
    pub pair: String,
    pub rate: Decimal,
    pub manual_rate: Option<Decimal>,
    pub use_manual: bool,
    pub spread: Option<Decimal>,
}

/// Rate as returned to clients
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RateResponse {
    #[schema(example = "USD_NGN")]
    pub pair: String,
    #[schema(value_type = String, example = "1600.00")]
    pub rate: Decimal,
    #[schema(value_type = Option<String>, example = "1580.00")]
    pub manual_rate: Option<Decimal>,
    pub use_manual: bool,
    #[schema(value_type = String, example = "5.0")]
    pub spread: Decimal,
    #[schema(value_type = String, example = "1501.000000")]
    pub effective_rate: Decimal,
    #[schema(value_type = String, example = "1425.950000")]
    pub customer_rate: Decimal,
    pub updated_at: DateTime<Utc>,
}

impl From<Rate> for RateResponse {
    fn from(rate: Rate) -> Self {
        Self {
            effective_rate: rate.effective_rate(),
            customer_rate: rate.customer_rate(),
            pair: rate.pair,
            rate: rate.rate,
            manual_rate: rate.manual_rate,
            use_manual: rate.use_manual,
            spread: rate.spread,
            updated_at: rate.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn rate(auto: &str, manual: Option<&str>, use_manual: bool, spread: &str) -> Rate {
        let now = Utc::now();
        Rate {
            id: 1,
            pair: "USD_NGN".into(),
            rate: Decimal::from_str(auto).unwrap(),
            manual_rate: manual.map(|m| Decimal::from_str(m).unwrap()),
            use_manual,
            spread: Decimal::from_str(spread).unwrap(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn pairs_are_normalized() {
        assert_eq!(normalize_pair("usd-ngn").unwrap(), "USD_NGN");
        assert_eq!(normalize_pair(" GBP/KES ").unwrap(), "GBP_KES");
        assert!(normalize_pair("USDNGN").is_err());
        assert!(normalize_pair("US_NGN").is_err());
    }

    #[test]
    fn manual_rate_wins_only_when_selected() {
        assert_eq!(
            rate("1600", Some("1580"), true, "5").effective_rate(),
            Decimal::from(1580)
        );
        assert_eq!(
            rate("1600", Some("1580"), false, "5").effective_rate(),
            Decimal::from(1600)
        );
        assert_eq!(
            rate("1600", None, true, "5").effective_rate(),
            Decimal::from(1600)
        );
    }

    #[test]
    fn customer_rate_applies_spread() {
        let r = rate("1600", None, false, "5.0");
        assert_eq!(r.customer_rate(), Decimal::from(1520));
        assert_eq!(r.convert(Decimal::from(100)), Some(Decimal::from(152000)));
    }

    #[test]
    fn conversion_rounds_to_cents() {
        let r = rate("0.0012345", None, false, "0");
        assert_eq!(
            r.convert(Decimal::from_str("10.00").unwrap()),
            Some(Decimal::from_str("0.01").unwrap())
        );
    }

    #[test]
    fn oversized_conversion_is_none() {
        let r = rate("1600", None, false, "5");
        assert_eq!(r.convert(Decimal::MAX), None);
        assert_eq!(r.convert(max_amount()), None);
        assert!(r.convert(Decimal::from(1_000_000)).is_some());
    }

    #[test]
    fn source_currency_is_first_leg() {
        assert_eq!(rate("1", None, false, "0").source_currency(), "USD");
    }
}
