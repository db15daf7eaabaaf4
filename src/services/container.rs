//! Service Container - Centralized service access.

use std::sync::Arc;

use super::{
    AuthService, Authenticator, Maintenance, MaintenanceService, NotificationService,
    PushNotifier, RateManager, RateService, TransactionService, TransferManager, UserManager,
    UserService,
};
use crate::config::Config;
use crate::infra::{ExpoPushClient, Persistence, PushTransport};

/// Service container trait for dependency injection.
pub trait ServiceContainer: Send + Sync {
    fn auth(&self) -> Arc<dyn AuthService>;

    fn users(&self) -> Arc<dyn UserService>;

    fn transactions(&self) -> Arc<dyn TransactionService>;

    fn rates(&self) -> Arc<dyn RateService>;

    fn notifications(&self) -> Arc<dyn NotificationService>;

    fn maintenance(&self) -> Arc<dyn MaintenanceService>;
}

/// Concrete implementation of ServiceContainer
#[derive(Clone)]
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    user_service: Arc<dyn UserService>,
    transaction_service: Arc<dyn TransactionService>,
    rate_service: Arc<dyn RateService>,
    notification_service: Arc<dyn NotificationService>,
    maintenance_service: Arc<dyn MaintenanceService>,
}

impl Services {
    /// Wire every service over one database connection.
    ///
    /// The push transport is built from `config` unless one is given.
    pub fn from_connection(
        db: sea_orm::DatabaseConnection,
        config: Config,
        transport: Option<Arc<dyn PushTransport>>,
    ) -> Self {
        let transport =
            transport.unwrap_or_else(|| Arc::new(ExpoPushClient::from_config(&config)));
        let notifier: Arc<dyn NotificationService> = Arc::new(PushNotifier::new(transport));

        let uow = Arc::new(Persistence::new(db));

        Self {
            auth_service: Arc::new(Authenticator::new(uow.clone(), config)),
            user_service: Arc::new(UserManager::new(uow.clone())),
            transaction_service: Arc::new(TransferManager::new(uow.clone(), notifier.clone())),
            rate_service: Arc::new(RateManager::new(uow.clone())),
            notification_service: notifier,
            maintenance_service: Arc::new(Maintenance::new(uow)),
        }
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn users(&self) -> Arc<dyn UserService> {
        self.user_service.clone()
    }

    fn transactions(&self) -> Arc<dyn TransactionService> {
        self.transaction_service.clone()
    }

    fn rates(&self) -> Arc<dyn RateService> {
        self.rate_service.clone()
    }

    fn notifications(&self) -> Arc<dyn NotificationService> {
        self.notification_service.clone()
    }

    fn maintenance(&self) -> Arc<dyn MaintenanceService> {
        self.maintenance_service.clone()
    }
}
