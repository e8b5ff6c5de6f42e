//! Webhook endpoint configuration.

use cadence_error::ConfigError;
use derive_getters::Getters;

/// Endpoints and credentials for the automation webhook.
///
/// Components receive this at construction time; nothing reads the process
/// environment after startup.
#[derive(Debug, Clone, PartialEq, Eq, Getters, derive_builder::Builder)]
#[builder(setter(into))]
pub struct WebhookConfig {
    /// Endpoint receiving publish fan-out dispatches.
    publish_url: String,
    /// Endpoint receiving team and approval events.
    events_url: String,
    /// Optional bearer token attached to every dispatch.
    #[builder(default)]
    auth_token: Option<String>,
}

impl WebhookConfig {
    /// Create config from environment variables.
    ///
    /// Reads:
    /// - `AUTOMATION_PUBLISH_URL` (required)
    /// - `AUTOMATION_EVENTS_URL` (required)
    /// - `AUTOMATION_AUTH_TOKEN` (optional)
    pub fn from_env() -> Result<Self, ConfigError> {
        let publish_url = std::env::var("AUTOMATION_PUBLISH_URL")
            .map_err(|_| ConfigError::missing_var("AUTOMATION_PUBLISH_URL"))?;
        let events_url = std::env::var("AUTOMATION_EVENTS_URL")
            .map_err(|_| ConfigError::missing_var("AUTOMATION_EVENTS_URL"))?;
        let auth_token = std::env::var("AUTOMATION_AUTH_TOKEN").ok();

        WebhookConfigBuilder::default()
            .publish_url(publish_url)
            .events_url(events_url)
            .auth_token(auth_token)
            .build()
            .map_err(|e| ConfigError::new(e.to_string()))
    }
}
