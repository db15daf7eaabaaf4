//! Transfer records and their externally visible identifiers.

use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::{
    AMOUNT_SCALE, MAX_AMOUNT_CENTS, TRANSACTION_ID_PREFIX, TRANSACTION_ID_SUFFIX_LEN,
};

const BASE36_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

static TRANSACTION_ID_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^QT-\d{8}-[A-Z0-9]{4}$").expect("transaction id pattern is valid")
});

/// Largest amount sent or received that the store can hold.
pub fn max_amount() -> Decimal {
    Decimal::new(MAX_AMOUNT_CENTS, AMOUNT_SCALE)
}

/// Lifecycle status of a transfer.
///
/// Values the service does not know about are kept verbatim in `Other`
/// so rows written by other tools survive a read/write cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionStatus {
    Pending,
    Processing,
    Sent,
    Cancelled,
    Failed,
    Other(String),
}

impl TransactionStatus {
    pub fn as_str(&self) -> &str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Processing => "processing",
            TransactionStatus::Sent => "sent",
            TransactionStatus::Cancelled => "cancelled",
            TransactionStatus::Failed => "failed",
            TransactionStatus::Other(raw) => raw,
        }
    }

    /// Terminal transfers are immutable.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TransactionStatus::Sent | TransactionStatus::Cancelled | TransactionStatus::Failed
        )
    }

    /// Parse a status submitted by a client; only known values are accepted.
    pub fn parse_known(s: &str) -> Option<Self> {
        match TransactionStatus::from(s) {
            TransactionStatus::Other(_) => None,
            status => Some(status),
        }
    }
}

impl From<&str> for TransactionStatus {
    fn from(s: &str) -> Self {
        match s {
            "pending" => TransactionStatus::Pending,
            "processing" => TransactionStatus::Processing,
            "sent" => TransactionStatus::Sent,
            "cancelled" => TransactionStatus::Cancelled,
            "failed" => TransactionStatus::Failed,
            other => TransactionStatus::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TransactionStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TransactionStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(TransactionStatus::from(raw.as_str()))
    }
}

/// Generator for `QT-<yyyymmdd>-<XXXX>` identifiers.
pub struct TransactionId;

impl TransactionId {
    /// Build an identifier for a transfer created on `date`.
    ///
    /// The suffix is random base36; uniqueness is only enforced by the store.
    pub fn generate(date: NaiveDate) -> String {
        Self::generate_with(date, &mut rand::thread_rng())
    }

    pub fn generate_with<R: Rng + ?Sized>(date: NaiveDate, rng: &mut R) -> String {
        let suffix: String = (0..TRANSACTION_ID_SUFFIX_LEN)
            .map(|_| BASE36_ALPHABET[rng.gen_range(0..BASE36_ALPHABET.len())] as char)
            .collect();

        format!(
            "{}-{}-{}",
            TRANSACTION_ID_PREFIX,
            date.format("%Y%m%d"),
            suffix
        )
    }

    pub fn is_valid(id: &str) -> bool {
        TRANSACTION_ID_PATTERN.is_match(id)
    }

    /// True when a stored identifier is missing and needs to be backfilled.
    pub fn is_missing(id: Option<&str>) -> bool {
        id.map_or(true, |value| value.trim().is_empty())
    }
}

/// Transfer domain entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i32,
    pub transaction_id: Option<String>,
    /// Sender (users.id)
    pub user_id: i32,
    /// Payout vendor (users.id)
    pub vendor_id: Option<i32>,
    /// Transfer type, usually the currency pair (`USD_NGN`)
    pub kind: String,
    pub amount_sent: Decimal,
    pub amount_received: Decimal,
    pub exchange_rate: Decimal,
    pub recipient_details: serde_json::Value,
    pub status: TransactionStatus,
    pub proof_of_payment_url: Option<String>,
    pub proof_uploaded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    pub fn recipient_name(&self) -> Option<&str> {
        self.recipient_details
            .get("name")
            .and_then(|v| v.as_str())
            .filter(|name| !name.trim().is_empty())
    }

    /// Reference shown to users: the public id, or `#<row id>` before backfill.
    pub fn reference(&self) -> String {
        match self.transaction_id.as_deref() {
            Some(id) if !id.trim().is_empty() => id.to_string(),
            _ => format!("#{}", self.id),
        }
    }

    /// Whether `user_id` may view this transfer as its sender or vendor.
    pub fn involves(&self, user_id: i32) -> bool {
        self.user_id == user_id || self.vendor_id == Some(user_id)
    }
}

/// Data needed to insert a new transfer row
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub transaction_id: String,
    pub user_id: i32,
    pub vendor_id: Option<i32>,
    pub kind: String,
    pub amount_sent: Decimal,
    pub amount_received: Decimal,
    pub exchange_rate: Decimal,
    pub recipient_details: serde_json::Value,
}

/// Transfer as returned to clients
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TransactionResponse {
    #[schema(example = 1001)]
    pub id: i32,
    #[schema(example = "QT-20260224-7K2Q")]
    pub transaction_id: Option<String>,
    pub user_id: i32,
    pub vendor_id: Option<i32>,
    #[schema(example = "USD_NGN")]
    pub kind: String,
    #[schema(value_type = String, example = "100.00")]
    pub amount_sent: Decimal,
    #[schema(value_type = String, example = "152000.00")]
    pub amount_received: Decimal,
    #[schema(value_type = String, example = "1520.000000")]
    pub exchange_rate: Decimal,
    #[schema(value_type = Object)]
    pub recipient_details: serde_json::Value,
    #[schema(value_type = String, example = "pending")]
    pub status: TransactionStatus,
    pub proof_of_payment_url: Option<String>,
    pub proof_uploaded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Transaction> for TransactionResponse {
    fn from(tx: Transaction) -> Self {
        Self {
            id: tx.id,
            transaction_id: tx.transaction_id,
            user_id: tx.user_id,
            vendor_id: tx.vendor_id,
            kind: tx.kind,
            amount_sent: tx.amount_sent,
            amount_received: tx.amount_received,
            exchange_rate: tx.exchange_rate,
            recipient_details: tx.recipient_details,
            status: tx.status,
            proof_of_payment_url: tx.proof_of_payment_url,
            proof_uploaded_at: tx.proof_uploaded_at,
            created_at: tx.created_at,
        }
    }
}

/// Vendor queue entry: a transfer joined with its sender's email
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VendorQueueEntry {
    pub transaction: TransactionResponse,
    #[schema(example = "sender@example.com")]
    pub sender_email: Option<String>,
}
