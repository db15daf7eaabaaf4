//! User service - profiles, KYC, push tokens and presence.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::{KycStatus, ProfileUpdate, PushToken, User};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    async fn get_user(&self, id: i32) -> AppResult<User>;

    /// All users, ascending by id
    async fn list_users(&self) -> AppResult<Vec<User>>;

    async fn update_profile(&self, id: i32, update: ProfileUpdate) -> AppResult<User>;

    /// Attach a KYC document and move the user to `pending` review
    async fn submit_kyc(&self, id: i32, document_url: String) -> AppResult<User>;

    /// Record a KYC review outcome
    async fn set_kyc_status(&self, id: i32, status: KycStatus) -> AppResult<User>;

    /// Register a device push token; `None` unregisters the device
    async fn set_push_token(&self, id: i32, token: Option<String>) -> AppResult<()>;

    async fn set_presence(&self, id: i32, online: bool) -> AppResult<()>;
}

/// Concrete implementation of UserService using Unit of Work.
pub struct UserManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> UserManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> UserService for UserManager<U> {
    async fn get_user(&self, id: i32) -> AppResult<User> {
        self.uow
            .users()
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound)
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        self.uow.users().list().await
    }

    async fn update_profile(&self, id: i32, update: ProfileUpdate) -> AppResult<User> {
        self.uow.users().update_profile(id, update).await
    }

    async fn submit_kyc(&self, id: i32, document_url: String) -> AppResult<User> {
        let user = self.get_user(id).await?;
        if user.kyc_status == KycStatus::Verified {
            return Err(AppError::bad_request("KYC is already verified"));
        }

        let user = self
            .uow
            .users()
            .set_kyc(id, KycStatus::Pending, Some(document_url))
            .await?;

        tracing::info!(user_id = id, "KYC document submitted");
        Ok(user)
    }

    async fn set_kyc_status(&self, id: i32, status: KycStatus) -> AppResult<User> {
        let user = self.uow.users().set_kyc(id, status, None).await?;
        tracing::info!(user_id = id, status = %status, "KYC status changed");
        Ok(user)
    }

    async fn set_push_token(&self, id: i32, token: Option<String>) -> AppResult<()> {
        if let Some(raw) = token.as_deref() {
            if !PushToken::is_valid(raw) {
                return Err(AppError::validation("Invalid push token"));
            }
        }

        self.uow.users().set_push_token(id, token).await
    }

    async fn set_presence(&self, id: i32, online: bool) -> AppResult<()> {
        self.uow.users().set_online(id, online).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::fixtures::user;
    use crate::infra::MockUserRepository;
    use crate::services::test_support::TestUow;

    fn service(users: MockUserRepository) -> UserManager<TestUow> {
        UserManager::new(Arc::new(TestUow::with_users(users)))
    }

    #[tokio::test]
    async fn missing_user_is_not_found() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|_| Ok(None));

        let err = service(users).get_user(9).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }

    #[tokio::test]
    async fn kyc_submission_moves_to_pending() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .returning(|id| Ok(Some(user(id, "ada@example.com"))));
        users
            .expect_set_kyc()
            .withf(|id, status, doc| {
                *id == 1
                    && *status == KycStatus::Pending
                    && doc.as_deref() == Some("https://files.example.com/id.png")
            })
            .times(1)
            .returning(|id, status, doc| {
                let mut u = user(id, "ada@example.com");
                u.kyc_status = status;
                u.kyc_document = doc;
                Ok(u)
            });

        let updated = service(users)
            .submit_kyc(1, "https://files.example.com/id.png".into())
            .await
            .unwrap();

        assert_eq!(updated.kyc_status, KycStatus::Pending);
    }

    #[tokio::test]
    async fn verified_users_cannot_resubmit_kyc() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|id| {
            let mut u = user(id, "ada@example.com");
            u.kyc_status = KycStatus::Verified;
            Ok(Some(u))
        });
        users.expect_set_kyc().never();

        let err = service(users)
            .submit_kyc(1, "https://files.example.com/id.png".into())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn malformed_push_token_is_not_stored() {
        let mut users = MockUserRepository::new();
        users.expect_set_push_token().never();

        let err = service(users)
            .set_push_token(1, Some("garbage".into()))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn push_token_can_be_cleared() {
        let mut users = MockUserRepository::new();
        users
            .expect_set_push_token()
            .withf(|id, token| *id == 1 && token.is_none())
            .times(1)
            .returning(|_, _| Ok(()));

        service(users).set_push_token(1, None).await.unwrap();
    }
}
