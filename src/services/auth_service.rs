//! Authentication service - registration, login and account tokens.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::config::{
    Config, EMAIL_VERIFICATION_TTL_HOURS, PASSWORD_RESET_TTL_HOURS, SECONDS_PER_HOUR,
    TOKEN_TYPE_BEARER,
};
use crate::domain::{AccountToken, NewUser, Password, User};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;

/// Well-formed Argon2 hash checked against when the email is unknown, so a
/// failed login costs the same either way.
const DUMMY_PASSWORD_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$YWJjZGVmZ2hpamtsbW5vcA$3Xq8n2Xf3y6oJqk1Jb3m8cT0m1wWq5c2pD9bL0fYk1A";

/// JWT claims payload
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i32,
    pub email: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

/// Token response returned after successful authentication
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    /// JWT access token
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access_token: String,
    /// Token type (always "Bearer")
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Token expiration time in seconds
    #[schema(example = 86400)]
    pub expires_in: i64,
}

/// Registration input
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Create an account and issue its email verification token
    async fn register(&self, registration: Registration) -> AppResult<User>;

    /// Check credentials, mark the user online and return a JWT
    async fn login(&self, email: String, password: String) -> AppResult<TokenResponse>;

    /// Consume an email verification token
    async fn verify_email(&self, token: &str) -> AppResult<User>;

    /// Issue a password reset token. Unknown emails succeed silently.
    async fn forgot_password(&self, email: String) -> AppResult<()>;

    /// Consume a reset token and set a new password
    async fn reset_password(&self, token: &str, new_password: &str) -> AppResult<()>;

    /// Verify JWT token and extract claims
    fn verify_token(&self, token: &str) -> AppResult<Claims>;
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn generate_token(user: &User, config: &Config) -> AppResult<TokenResponse> {
    let now = Utc::now();
    let expires_at = now + Duration::hours(config.jwt_expiration_hours);

    let claims = Claims {
        sub: user.id,
        email: user.email.clone(),
        role: user.role.to_string(),
        exp: expires_at.timestamp(),
        iat: now.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret_bytes()),
    )?;

    Ok(TokenResponse {
        access_token: token,
        token_type: TOKEN_TYPE_BEARER.to_string(),
        expires_in: config.jwt_expiration_hours * SECONDS_PER_HOUR,
    })
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    config: Config,
}

impl<U: UnitOfWork> Authenticator<U> {
    pub fn new(uow: Arc<U>, config: Config) -> Self {
        Self { uow, config }
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn register(&self, registration: Registration) -> AppResult<User> {
        let email = normalize_email(&registration.email);

        if self.uow.users().find_by_email(&email).await?.is_some() {
            return Err(AppError::conflict("User"));
        }

        let password_hash = Password::new(&registration.password)?.into_string();
        let verification = AccountToken::issue(EMAIL_VERIFICATION_TTL_HOURS);

        let user = self
            .uow
            .users()
            .create(NewUser {
                email,
                password_hash,
                first_name: registration.first_name,
                last_name: registration.last_name,
                email_verification_token: Some(verification.value),
                email_verification_expires: Some(verification.expires_at),
            })
            .await?;

        tracing::info!(user_id = user.id, "User registered");
        Ok(user)
    }

    async fn login(&self, email: String, password: String) -> AppResult<TokenResponse> {
        let user = self.uow.users().find_by_email(&normalize_email(&email)).await?;

        let stored_hash = user
            .as_ref()
            .map_or(DUMMY_PASSWORD_HASH, |u| u.password_hash.as_str());
        let password_valid = Password::from_hash(stored_hash.to_string()).verify(&password);

        let user = match user {
            Some(user) if password_valid => user,
            _ => return Err(AppError::InvalidCredentials),
        };

        self.uow.users().set_online(user.id, true).await?;
        generate_token(&user, &self.config)
    }

    async fn verify_email(&self, token: &str) -> AppResult<User> {
        let invalid = || AppError::validation("Invalid or expired verification token");

        let user = self
            .uow
            .users()
            .find_by_verification_token(token)
            .await?
            .ok_or_else(invalid)?;

        if !AccountToken::matches(
            user.email_verification_token.as_deref(),
            user.email_verification_expires,
            token,
            Utc::now(),
        ) {
            return Err(invalid());
        }

        self.uow.users().mark_email_verified(user.id).await
    }

    async fn forgot_password(&self, email: String) -> AppResult<()> {
        let Some(user) = self.uow.users().find_by_email(&normalize_email(&email)).await? else {
            tracing::debug!("Password reset requested for unknown email");
            return Ok(());
        };

        let reset = AccountToken::issue(PASSWORD_RESET_TTL_HOURS);
        self.uow
            .users()
            .set_reset_token(user.id, Some(reset.value), Some(reset.expires_at))
            .await?;

        tracing::info!(user_id = user.id, "Password reset token issued");
        Ok(())
    }

    async fn reset_password(&self, token: &str, new_password: &str) -> AppResult<()> {
        let invalid = || AppError::validation("Invalid or expired reset token");

        let user = self
            .uow
            .users()
            .find_by_reset_token(token)
            .await?
            .ok_or_else(invalid)?;

        if !AccountToken::matches(
            user.reset_password_token.as_deref(),
            user.reset_password_expires,
            token,
            Utc::now(),
        ) {
            return Err(invalid());
        }

        let password_hash = Password::new(new_password)?.into_string();
        self.uow.users().update_password(user.id, password_hash).await?;

        tracing::info!(user_id = user.id, "Password reset");
        Ok(())
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }
}
