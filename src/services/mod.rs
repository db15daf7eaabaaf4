//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure. They reach the
//! store through the Unit of Work and depend on traits, so every use case
//! can be exercised against mocks.

mod auth_service;
pub mod container;
mod maintenance_service;
mod notification_service;
mod rate_service;
mod transaction_service;
mod user_service;

pub use container::{ServiceContainer, Services};

pub use auth_service::{AuthService, Authenticator, Claims, Registration, TokenResponse};
pub use maintenance_service::{
    plan_duplicate_removal, token_preview, BackfillReport, DedupeReport, Maintenance,
    MaintenanceService, TokenDumpEntry,
};
pub use notification_service::{NotificationService, PushNotifier};
pub use rate_service::{RateInput, RateManager, RateService};
pub use transaction_service::{TransactionService, TransferManager, TransferRequest};
pub use user_service::{UserManager, UserService};

#[cfg(any(test, feature = "test-utils"))]
pub use notification_service::MockNotificationService;
