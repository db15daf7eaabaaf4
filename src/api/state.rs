//! Application state - Dependency injection container.

use std::sync::Arc;

use crate::config::Config;
use crate::infra::{Database, PushTransport};
use crate::services::{
    AuthService, RateService, ServiceContainer, Services, TransactionService, UserService,
};

/// Services and infrastructure shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthService>,
    pub user_service: Arc<dyn UserService>,
    pub transaction_service: Arc<dyn TransactionService>,
    pub rate_service: Arc<dyn RateService>,
    pub database: Arc<Database>,
}

impl AppState {
    /// Wire the full service graph over `database`.
    pub fn from_config(
        database: Arc<Database>,
        config: Config,
        transport: Option<Arc<dyn PushTransport>>,
    ) -> Self {
        let services = Services::from_connection(database.get_connection(), config, transport);
        Self::from_container(&services, database)
    }

    /// Take the services out of any container.
    pub fn from_container(container: &dyn ServiceContainer, database: Arc<Database>) -> Self {
        Self {
            auth_service: container.auth(),
            user_service: container.users(),
            transaction_service: container.transactions(),
            rate_service: container.rates(),
            database,
        }
    }
}
