//! Push notification sender.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::{PushMessage, PushResponse, PushToken};
use crate::infra::PushTransport;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Sends single push notifications.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait NotificationService: Send + Sync {
    /// Deliver one notification to one device.
    ///
    /// Returns the delivery API response, or `None` when the token is
    /// malformed or delivery failed. Failures are logged, never raised.
    async fn send_push_notification(
        &self,
        token: &str,
        title: &str,
        body: &str,
        data: Option<serde_json::Value>,
    ) -> Option<PushResponse>;
}

/// NotificationService over an injected push transport.
pub struct PushNotifier {
    transport: Arc<dyn PushTransport>,
}

impl PushNotifier {
    pub fn new(transport: Arc<dyn PushTransport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl NotificationService for PushNotifier {
    async fn send_push_notification(
        &self,
        token: &str,
        title: &str,
        body: &str,
        data: Option<serde_json::Value>,
    ) -> Option<PushResponse> {
        let Some(token) = PushToken::parse(token) else {
            tracing::warn!("Refusing to send push to malformed token");
            return None;
        };

        let message = PushMessage::new(&token, title, body, data);

        match self.transport.send(vec![message]).await {
            Ok(response) => {
                for ticket in response.data.iter().filter(|t| !t.is_ok()) {
                    tracing::warn!(
                        message = ?ticket.message,
                        details = ?ticket.details,
                        "Push ticket reported an error"
                    );
                }
                Some(response)
            }
            Err(e) => {
                tracing::error!(error = %e, "Push delivery failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PushTicket;
    use crate::infra::{MockPushTransport, PushError};
    use reqwest::StatusCode;

    const TOKEN: &str = "ExponentPushToken[xxxxxxxxxxxxxxxxxxxxxx]";

    #[tokio::test]
    async fn malformed_token_never_reaches_transport() {
        let mut transport = MockPushTransport::new();
        transport.expect_send().never();

        let notifier = PushNotifier::new(Arc::new(transport));
        let result = notifier
            .send_push_notification("bogus", "Hi", "There", None)
            .await;

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn sends_single_message_batch() {
        let mut transport = MockPushTransport::new();
        transport
            .expect_send()
            .withf(|batch| {
                batch.len() == 1
                    && batch[0].to == TOKEN
                    && batch[0].sound == "default"
                    && batch[0].data == serde_json::json!({ "transaction_id": 7 })
            })
            .times(1)
            .returning(|_| {
                Ok(PushResponse {
                    data: vec![PushTicket {
                        status: "ok".into(),
                        id: Some("ticket-1".into()),
                        message: None,
                        details: None,
                    }],
                    errors: None,
                })
            });

        let notifier = PushNotifier::new(Arc::new(transport));
        let response = notifier
            .send_push_notification(
                TOKEN,
                "Transfer sent",
                "Your money is on its way",
                Some(serde_json::json!({ "transaction_id": 7 })),
            )
            .await
            .unwrap();

        assert!(response.data[0].is_ok());
    }

    #[tokio::test]
    async fn transport_failure_collapses_to_none() {
        let mut transport = MockPushTransport::new();
        transport.expect_send().returning(|_| {
            Err(PushError::Rejected {
                status: StatusCode::BAD_GATEWAY,
                body: "upstream down".into(),
            })
        });

        let notifier = PushNotifier::new(Arc::new(transport));
        assert!(notifier
            .send_push_notification(TOKEN, "Hi", "There", None)
            .await
            .is_none());
    }
}
