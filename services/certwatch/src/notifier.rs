//! Notifier trait and alert selection

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::WebhookConfig;
use crate::expiry::{CertStatus, CertificateRecord};
use crate::report::Summary;

const ALERT_TITLE: &str = "Certificate expiry alert";

/// An alert to be sent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub title: String,
    /// Rendered as `text` so chat-style webhooks display it directly
    #[serde(rename = "text")]
    pub message: String,
    pub summary: Summary,
    pub records: Vec<CertificateRecord>,
}

/// Trait for sending alerts
#[async_trait]
pub trait Notifier: Send + Sync + std::fmt::Debug {
    /// Get the notifier type name (e.g. "webhook")
    fn type_name(&self) -> &str;

    /// Send an alert
    async fn notify(&self, alert: &Alert) -> crate::Result<()>;
}

/// Pick the records worth alerting on. `None` when the webhook is disabled
/// or nothing qualifies.
pub fn build_alert(records: &[CertificateRecord], config: &WebhookConfig) -> Option<Alert> {
    if !config.enabled {
        return None;
    }

    let selected: Vec<CertificateRecord> = records
        .iter()
        .filter(|r| match r.status {
            CertStatus::Critical | CertStatus::Expired => config.send_on_critical,
            CertStatus::Warning => config.send_on_warning,
            CertStatus::Ok | CertStatus::Error => false,
        })
        .cloned()
        .collect();

    if selected.is_empty() {
        return None;
    }

    let summary = Summary::tally(&selected);
    let mut message = format!(
        "{} certificate(s) need attention: {} expired, {} critical, {} warning",
        selected.len(),
        summary.expired,
        summary.critical,
        summary.warning
    );
    for record in &selected {
        let days = record
            .days_until_expiry
            .map(|d| format!("{} days", d))
            .unwrap_or_else(|| "N/A".to_string());
        message.push_str(&format!("\n- {}: {} ({})", record.url, record.status, days));
    }

    Some(Alert {
        title: ALERT_TITLE.to_string(),
        message,
        summary,
        records: selected,
    })
}
