//! Expo push delivery client.

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use thiserror::Error;

use crate::config::Config;
use crate::domain::{PushMessage, PushResponse};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[derive(Debug, Error)]
pub enum PushError {
    #[error("request to push service failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("push service rejected the batch with status {status}: {body}")]
    Rejected { status: StatusCode, body: String },
}

/// Sends message batches to a push delivery service.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait PushTransport: Send + Sync {
    async fn send(&self, messages: Vec<PushMessage>) -> Result<PushResponse, PushError>;
}

/// HTTP client for the Expo push API.
#[derive(Clone)]
pub struct ExpoPushClient {
    client: Client,
    url: String,
    access_token: Option<String>,
}

impl ExpoPushClient {
    pub fn new(url: impl Into<String>, access_token: Option<String>) -> Self {
        Self {
            client: Client::builder()
                .user_agent(concat!("remittance-api/", env!("CARGO_PKG_VERSION")))
                .build()
                .unwrap_or_else(|_| Client::new()),
            url: url.into(),
            access_token,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.expo_push_url.clone(),
            config.expo_access_token().map(str::to_string),
        )
    }
}

#[async_trait]
impl PushTransport for ExpoPushClient {
    async fn send(&self, messages: Vec<PushMessage>) -> Result<PushResponse, PushError> {
        tracing::debug!(count = messages.len(), url = %self.url, "Sending push batch");

        let mut request = self
            .client
            .post(&self.url)
            .header(header::ACCEPT, "application/json")
            .json(&messages);

        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PushError::Rejected { status, body });
        }

        Ok(response.json::<PushResponse>().await?)
    }
}
