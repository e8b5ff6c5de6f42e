//! Notifier seam and its `reqwest` implementation.

use crate::{PublishDispatch, TeamEvent, WebhookConfig, WebhookError, WebhookErrorKind};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Transport for automation notifications.
///
/// Both methods are single-attempt; retrying a webhook would re-trigger
/// the automation flow behind it.
#[async_trait]
pub trait AutomationNotifier: Send + Sync {
    /// Notify the automation system of a publish fan-out batch.
    async fn dispatch_publish(&self, dispatch: &PublishDispatch) -> Result<(), WebhookError>;

    /// Notify the automation system of a team or approval event.
    async fn dispatch_event(&self, event: &TeamEvent) -> Result<(), WebhookError>;
}

/// `reqwest`-backed notifier for the configured automation endpoints.
#[derive(Debug, Clone)]
pub struct AutomationClient {
    config: WebhookConfig,
    client: reqwest::Client,
}

impl AutomationClient {
    /// Create a client for the given endpoints.
    pub fn new(config: WebhookConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    async fn post_json<T: serde::Serialize + Sync>(
        &self,
        url: &str,
        body: &T,
    ) -> Result<(), WebhookError> {
        let mut request = self.client.post(url).json(body);
        if let Some(token) = self.config.auth_token() {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| WebhookError::new(WebhookErrorKind::Dispatch(e.to_string())))?;

        let status = response.status();
        if !status.is_success() {
            return Err(WebhookError::new(WebhookErrorKind::Status {
                status: status.as_u16(),
                url: url.to_string(),
            }));
        }

        debug!(url, status = status.as_u16(), "webhook dispatched");
        Ok(())
    }
}

#[async_trait]
impl AutomationNotifier for AutomationClient {
    #[instrument(skip(self, dispatch), fields(post_id = %dispatch.post_id, rows = dispatch.social_posts.len()))]
    async fn dispatch_publish(&self, dispatch: &PublishDispatch) -> Result<(), WebhookError> {
        self.post_json(self.config.publish_url(), dispatch).await
    }

    #[instrument(skip(self, event), fields(event = %event.event))]
    async fn dispatch_event(&self, event: &TeamEvent) -> Result<(), WebhookError> {
        self.post_json(self.config.events_url(), event).await
    }
}
