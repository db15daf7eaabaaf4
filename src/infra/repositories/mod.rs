//! Repository layer - Data access abstraction
//!
//! One repository trait per table. Associations are plain foreign-key
//! fields on the domain structs; joins happen in the queries that need them.

pub(crate) mod entities;
mod rate_repository;
mod transaction_repository;
mod user_repository;

pub use rate_repository::{RateRepository, RateStore};
pub use transaction_repository::{TransactionRepository, TransactionStore};
pub use user_repository::{UserRepository, UserStore};

// Export mocks for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use rate_repository::MockRateRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use transaction_repository::MockTransactionRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
