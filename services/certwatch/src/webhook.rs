//! Webhook alert sender

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::WebhookConfig;
use crate::io::HttpClient;
use crate::notifier::{Alert, Notifier};

/// Posts alerts as JSON to a configured URL
pub struct WebhookNotifier {
    url: String,
    http: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for WebhookNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookNotifier").finish_non_exhaustive()
    }
}

impl WebhookNotifier {
    pub fn new(config: &WebhookConfig, http: Arc<dyn HttpClient>) -> Self {
        tracing::debug!("Created WebhookNotifier");
        Self {
            url: config.url.clone(),
            http,
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    fn type_name(&self) -> &str {
        "webhook"
    }

    async fn notify(&self, alert: &Alert) -> crate::Result<()> {
        let payload = serde_json::to_value(alert)?;

        tracing::debug!(
            "Sending webhook alert: title='{}', {} records",
            alert.title,
            alert.records.len()
        );

        let response = self.http.post_json(&self.url, &payload).await?;

        if !response.is_success() {
            return Err(crate::CertwatchError::Notifier(format!(
                "Webhook returned status {}: {}",
                response.status, response.body
            )));
        }

        tracing::debug!("Webhook alert sent successfully");
        Ok(())
    }
}
