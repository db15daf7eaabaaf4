//! User repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use crate::config::ROLE_USER;
use crate::domain::{Balances, KycStatus, NewUser, ProfileUpdate, User};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: i32) -> AppResult<Option<User>>;

    /// Find user by email address
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Find the user holding an email verification token
    async fn find_by_verification_token(&self, token: &str) -> AppResult<Option<User>>;

    /// Find the user holding a password reset token
    async fn find_by_reset_token(&self, token: &str) -> AppResult<Option<User>>;

    /// Insert a new user; duplicate emails yield `Conflict`
    async fn create(&self, new_user: NewUser) -> AppResult<User>;

    /// Apply profile changes
    async fn update_profile(&self, id: i32, update: ProfileUpdate) -> AppResult<User>;

    /// Set KYC status, replacing the document when one is given
    async fn set_kyc(&self, id: i32, status: KycStatus, document: Option<String>)
        -> AppResult<User>;

    /// Register or clear the device push token
    async fn set_push_token(&self, id: i32, token: Option<String>) -> AppResult<()>;

    /// Set the online flag
    async fn set_online(&self, id: i32, online: bool) -> AppResult<()>;

    /// Mark the email verified and drop the verification token
    async fn mark_email_verified(&self, id: i32) -> AppResult<User>;

    /// Store (or clear) a password reset token
    async fn set_reset_token(
        &self,
        id: i32,
        token: Option<String>,
        expires: Option<DateTime<Utc>>,
    ) -> AppResult<()>;

    /// Replace the password hash and drop any reset token
    async fn update_password(&self, id: i32, password_hash: String) -> AppResult<()>;

    /// All users, ascending by id
    async fn list(&self) -> AppResult<Vec<User>>;

    /// Newest users first
    async fn list_recent(&self, limit: u64) -> AppResult<Vec<User>>;

    /// Delete every user whose id is in `ids` with a single statement.
    /// Returns the number of rows removed.
    async fn delete_many(&self, ids: Vec<i32>) -> AppResult<u64>;
}

/// Concrete implementation of UserRepository
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_model(&self, id: i32) -> AppResult<user::Model> {
        UserEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    async fn save(&self, active: ActiveModel) -> AppResult<User> {
        let model = active.update(&self.db).await?;
        Ok(User::from(model))
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<User>> {
        let result = UserEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .order_by_asc(user::Column::Id)
            .one(&self.db)
            .await?;

        Ok(result.map(User::from))
    }

    async fn find_by_verification_token(&self, token: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::EmailVerificationToken.eq(token))
            .one(&self.db)
            .await?;

        Ok(result.map(User::from))
    }

    async fn find_by_reset_token(&self, token: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::ResetPasswordToken.eq(token))
            .one(&self.db)
            .await?;

        Ok(result.map(User::from))
    }

    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        let now = Utc::now();
        let balances = serde_json::to_value(Balances::new())
            .map_err(|e| AppError::internal(e.to_string()))?;

        let active_model = ActiveModel {
            email: Set(new_user.email),
            password_hash: Set(new_user.password_hash),
            role: Set(ROLE_USER.to_string()),
            kyc_status: Set(KycStatus::Unverified.as_str().to_string()),
            kyc_document: Set(None),
            first_name: Set(new_user.first_name),
            last_name: Set(new_user.last_name),
            phone: Set(None),
            country: Set(None),
            balances: Set(balances),
            is_email_verified: Set(false),
            email_verification_token: Set(new_user.email_verification_token),
            email_verification_expires: Set(new_user.email_verification_expires),
            reset_password_token: Set(None),
            reset_password_expires: Set(None),
            push_token: Set(None),
            online: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(|e| AppError::from_db(e, "User"))?;

        Ok(User::from(model))
    }

    async fn update_profile(&self, id: i32, update: ProfileUpdate) -> AppResult<User> {
        let mut active: ActiveModel = self.find_model(id).await?.into();

        if let Some(first_name) = update.first_name {
            active.first_name = Set(Some(first_name));
        }
        if let Some(last_name) = update.last_name {
            active.last_name = Set(Some(last_name));
        }
        if let Some(phone) = update.phone {
            active.phone = Set(Some(phone));
        }
        if let Some(country) = update.country {
            active.country = Set(Some(country.to_uppercase()));
        }
        active.updated_at = Set(Utc::now());

        self.save(active).await
    }

    async fn set_kyc(
        &self,
        id: i32,
        status: KycStatus,
        document: Option<String>,
    ) -> AppResult<User> {
        let mut active: ActiveModel = self.find_model(id).await?.into();

        active.kyc_status = Set(status.as_str().to_string());
        if document.is_some() {
            active.kyc_document = Set(document);
        }
        active.updated_at = Set(Utc::now());

        self.save(active).await
    }

    async fn set_push_token(&self, id: i32, token: Option<String>) -> AppResult<()> {
        let mut active: ActiveModel = self.find_model(id).await?.into();
        active.push_token = Set(token);
        active.updated_at = Set(Utc::now());
        self.save(active).await.map(|_| ())
    }

    async fn set_online(&self, id: i32, online: bool) -> AppResult<()> {
        let mut active: ActiveModel = self.find_model(id).await?.into();
        active.online = Set(online);
        self.save(active).await.map(|_| ())
    }

    async fn mark_email_verified(&self, id: i32) -> AppResult<User> {
        let mut active: ActiveModel = self.find_model(id).await?.into();

        active.is_email_verified = Set(true);
        active.email_verification_token = Set(None);
        active.email_verification_expires = Set(None);
        active.updated_at = Set(Utc::now());

        self.save(active).await
    }

    async fn set_reset_token(
        &self,
        id: i32,
        token: Option<String>,
        expires: Option<DateTime<Utc>>,
    ) -> AppResult<()> {
        let mut active: ActiveModel = self.find_model(id).await?.into();

        active.reset_password_token = Set(token);
        active.reset_password_expires = Set(expires);
        active.updated_at = Set(Utc::now());

        self.save(active).await.map(|_| ())
    }

    async fn update_password(&self, id: i32, password_hash: String) -> AppResult<()> {
        let mut active: ActiveModel = self.find_model(id).await?.into();

        active.password_hash = Set(password_hash);
        active.reset_password_token = Set(None);
        active.reset_password_expires = Set(None);
        active.updated_at = Set(Utc::now());

        self.save(active).await.map(|_| ())
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        let models = UserEntity::find()
            .order_by_asc(user::Column::Id)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(User::from).collect())
    }

    async fn list_recent(&self, limit: u64) -> AppResult<Vec<User>> {
        let models = UserEntity::find()
            .order_by_desc(user::Column::CreatedAt)
            .order_by_desc(user::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(User::from).collect())
    }

    async fn delete_many(&self, ids: Vec<i32>) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = UserEntity::delete_many()
            .filter(user::Column::Id.is_in(ids))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected)
    }
}
