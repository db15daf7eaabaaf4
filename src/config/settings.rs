//! Application settings loaded from environment variables.

use std::env;

use crate::errors::{AppError, AppResult};

use super::constants::{
    DEFAULT_DATABASE_URL, DEFAULT_EXPO_PUSH_URL, DEFAULT_JWT_EXPIRATION_HOURS,
    DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT, MIN_JWT_SECRET_LENGTH,
};

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub server_host: String,
    pub server_port: u16,
    pub expo_push_url: String,
    expo_access_token: Option<String>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_expiration_hours", &self.jwt_expiration_hours)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("expo_push_url", &self.expo_push_url)
            .field(
                "expo_access_token",
                &self.expo_access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Fails with `AppError::Config` if JWT_SECRET is missing outside debug
    /// builds or shorter than the minimum length.
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let jwt_secret = resolve_jwt_secret(env::var("JWT_SECRET").ok())?;

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            jwt_secret,
            jwt_expiration_hours: env::var("JWT_EXPIRATION_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_JWT_EXPIRATION_HOURS),
            server_host: env::var("SERVER_HOST")
                .unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_SERVER_PORT),
            expo_push_url: env::var("EXPO_PUSH_URL")
                .unwrap_or_else(|_| DEFAULT_EXPO_PUSH_URL.to_string()),
            expo_access_token: env::var("EXPO_ACCESS_TOKEN")
                .ok()
                .filter(|v| !v.is_empty()),
        })
    }

    /// Build a configuration by hand (tests, embedding).
    pub fn new(database_url: impl Into<String>, jwt_secret: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            jwt_secret: jwt_secret.into(),
            jwt_expiration_hours: DEFAULT_JWT_EXPIRATION_HOURS,
            server_host: DEFAULT_SERVER_HOST.to_string(),
            server_port: DEFAULT_SERVER_PORT,
            expo_push_url: DEFAULT_EXPO_PUSH_URL.to_string(),
            expo_access_token: None,
        }
    }

    /// Override the push delivery endpoint.
    pub fn with_expo_push_url(mut self, url: impl Into<String>) -> Self {
        self.expo_push_url = url.into();
        self
    }

    /// Get JWT secret bytes for token signing/verification.
    pub fn jwt_secret_bytes(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }

    /// Expo access token, when push security is enabled on the project.
    pub fn expo_access_token(&self) -> Option<&str> {
        self.expo_access_token.as_deref()
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

/// Pick the signing secret, falling back to a development default in
/// debug builds only.
fn resolve_jwt_secret(raw: Option<String>) -> AppResult<String> {
    let secret = match raw {
        Some(secret) => secret,
        None if cfg!(debug_assertions) => {
            tracing::warn!("JWT_SECRET not set, using insecure default for development");
            DEV_JWT_SECRET.to_string()
        }
        None => {
            return Err(AppError::Config(
                "JWT_SECRET environment variable must be set in production".to_string(),
            ))
        }
    };

    if secret.len() < MIN_JWT_SECRET_LENGTH {
        return Err(AppError::Config(format!(
            "JWT_SECRET must be at least {} characters long",
            MIN_JWT_SECRET_LENGTH
        )));
    }

    Ok(secret)
}

const DEV_JWT_SECRET: &str = "dev-secret-key-minimum-32-chars!!";
