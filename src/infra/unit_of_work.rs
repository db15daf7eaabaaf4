//! Repository hub shared by the services.
//!
//! Every repository is built once over the same connection pool and
//! handed out as a trait object, so services can be wired against mocks.

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use super::repositories::{
    RateRepository, RateStore, TransactionRepository, TransactionStore, UserRepository, UserStore,
};

/// Access to every repository.
pub trait UnitOfWork: Send + Sync {
    fn users(&self) -> Arc<dyn UserRepository>;

    fn transactions(&self) -> Arc<dyn TransactionRepository>;

    fn rates(&self) -> Arc<dyn RateRepository>;
}

/// Concrete implementation of UnitOfWork backed by the database
pub struct Persistence {
    users: Arc<UserStore>,
    transactions: Arc<TransactionStore>,
    rates: Arc<RateStore>,
}

impl Persistence {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            users: Arc::new(UserStore::new(db.clone())),
            transactions: Arc::new(TransactionStore::new(db.clone())),
            rates: Arc::new(RateStore::new(db)),
        }
    }
}

impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.users.clone()
    }

    fn transactions(&self) -> Arc<dyn TransactionRepository> {
        self.transactions.clone()
    }

    fn rates(&self) -> Arc<dyn RateRepository> {
        self.rates.clone()
    }
}
