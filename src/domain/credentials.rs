//! Credential value objects: hashed passwords and one-time account tokens.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;

use crate::config::{ACCOUNT_TOKEN_BYTES, MIN_PASSWORD_LENGTH};
use crate::errors::{AppError, AppResult};

/// Argon2 password hash.
#[derive(Clone, PartialEq, Eq)]
pub struct Password {
    hash: String,
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Password")
            .field("hash", &"[REDACTED]")
            .finish()
    }
}

impl Password {
    /// Hash a plain text password.
    ///
    /// # Errors
    /// Returns a validation error when the password is shorter than
    /// `MIN_PASSWORD_LENGTH` characters.
    pub fn new(plain_text: &str) -> AppResult<Self> {
        if plain_text.chars().count() < MIN_PASSWORD_LENGTH as usize {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(plain_text.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hash failed: {}", e)))?
            .to_string();

        Ok(Self { hash })
    }

    /// Wrap a hash loaded from the users table.
    pub fn from_hash(hash: String) -> Self {
        Self { hash }
    }

    pub fn as_str(&self) -> &str {
        &self.hash
    }

    pub fn into_string(self) -> String {
        self.hash
    }

    /// Check a plain text password. Malformed stored hashes never verify.
    pub fn verify(&self, plain_text: &str) -> bool {
        match PasswordHash::new(&self.hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(plain_text.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                tracing::warn!("Stored password hash is malformed: {}", e);
                false
            }
        }
    }
}

/// One-time token mailed to a user (email verification, password reset).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountToken {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

impl AccountToken {
    /// Issue a fresh random token valid for `ttl_hours`.
    pub fn issue(ttl_hours: i64) -> Self {
        let mut bytes = [0u8; ACCOUNT_TOKEN_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);

        let value = bytes.iter().map(|b| format!("{:02x}", b)).collect();

        Self {
            value,
            expires_at: Utc::now() + Duration::hours(ttl_hours),
        }
    }

    /// True when `candidate` matches a stored token that has not expired yet.
    pub fn matches(
        stored: Option<&str>,
        expires_at: Option<DateTime<Utc>>,
        candidate: &str,
        now: DateTime<Utc>,
    ) -> bool {
        match (stored, expires_at) {
            (Some(token), Some(expiry)) => !candidate.is_empty() && token == candidate && expiry > now,
            _ => false,
        }
    }
}
