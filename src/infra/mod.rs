//! Infrastructure layer - External systems integration
//!
//! - Database connection, migrations and repositories
//! - Expo push delivery client

pub mod db;
pub mod push;
pub mod repositories;
pub mod unit_of_work;

pub use db::{Database, Migrator};
pub use push::{ExpoPushClient, PushError, PushTransport};
pub use repositories::{
    RateRepository, RateStore, TransactionRepository, TransactionStore, UserRepository, UserStore,
};
pub use unit_of_work::{Persistence, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
pub use push::MockPushTransport;
#[cfg(any(test, feature = "test-utils"))]
pub use repositories::{MockRateRepository, MockTransactionRepository, MockUserRepository};
