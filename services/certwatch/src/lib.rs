//! Certwatch - TLS certificate expiry checker
//!
//! Probes the certificate of every configured website, classifies how close
//! each is to expiry, and reports the results as a table, a JSON file and an
//! optional webhook alert.

pub mod config;
pub mod endpoint;
pub mod error;
pub mod expiry;
pub mod io;
pub mod notifier;
pub mod orchestrator;
pub mod probe;
pub mod report;
pub mod tls_probe;
pub mod webhook;

pub use config::{load_config, Config, ThresholdSet};
pub use error::{CertwatchError, Result};
pub use expiry::{CertStatus, CertificateRecord};
pub use orchestrator::Orchestrator;

use std::sync::Arc;

use crate::io::{HttpClient, ReqwestHttpClient};
use crate::notifier::Notifier;
use crate::probe::Prober;
use crate::tls_probe::TlsProber;
use crate::webhook::WebhookNotifier;

/// Run one check over the configured websites with the production prober
/// and HTTP client
pub async fn run(config: &Config, save: bool) -> Result<Vec<CertificateRecord>> {
    let prober: Arc<dyn Prober> = Arc::new(TlsProber::new()?);
    let http: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::default());
    run_with(config, prober, http, save).await
}

/// Check, print the report, then save and alert as configured.
///
/// Saving and alerting failures are logged; they do not fail the run.
pub async fn run_with(
    config: &Config,
    prober: Arc<dyn Prober>,
    http: Arc<dyn HttpClient>,
    save: bool,
) -> Result<Vec<CertificateRecord>> {
    let orchestrator = Orchestrator::from_config(prober, config);
    let records = orchestrator.run(&config.websites).await;

    print!(
        "{}",
        report::render_report(&records, orchestrator.thresholds())
    );

    if save {
        if let Err(e) = report::save_results(&config.output_file, &records, &config.thresholds) {
            tracing::error!("Error saving results to file: {}", e);
        }
    }

    if let Some(webhook_config) = &config.webhook {
        match notifier::build_alert(&records, webhook_config) {
            Some(alert) => {
                let notifier = WebhookNotifier::new(webhook_config, http);
                match notifier.notify(&alert).await {
                    Ok(()) => tracing::info!(
                        "Webhook alert sent for {} certificates",
                        alert.records.len()
                    ),
                    Err(e) => tracing::warn!(
                        "Webhook alert via '{}' failed: {}",
                        notifier.type_name(),
                        e
                    ),
                }
            }
            None => tracing::debug!("No certificates qualify for a webhook alert"),
        }
    }

    Ok(records)
}
