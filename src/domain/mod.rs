//! Domain layer - Core business entities and logic
//!
//! Plain data structs for users, transfers, exchange rates and push
//! messages, plus the value objects that guard their invariants.
//! Nothing in here talks to the database or the network.

pub mod credentials;
pub mod push;
pub mod rate;
pub mod transaction;
pub mod user;

pub use credentials::{AccountToken, Password};
pub use push::{PushMessage, PushResponse, PushTicket, PushToken};
pub use rate::{normalize_pair, Rate, RateResponse, RateUpsert};
pub use transaction::{
    max_amount, NewTransaction, Transaction, TransactionId, TransactionResponse, TransactionStatus,
    VendorQueueEntry,
};
pub use user::{Actor, Balances, KycStatus, NewUser, ProfileUpdate, User, UserResponse, UserRole};
