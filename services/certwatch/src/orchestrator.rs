//! Orchestrator: fans probes out over a bounded pool and gathers records

use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{mpsc, Semaphore};

use crate::config::{Config, ThresholdSet};
use crate::endpoint;
use crate::expiry::{self, CertStatus, CertificateRecord};
use crate::probe::{FailureKind, ProbeFailure, Prober};

/// Hostname reported when the entry could not be resolved at all
pub const UNKNOWN_HOSTNAME: &str = "Unknown";

/// Runs one probe per website with at most `concurrency` in flight
pub struct Orchestrator {
    prober: Arc<dyn Prober>,
    thresholds: ThresholdSet,
    timeout: Duration,
    concurrency: usize,
}

impl Orchestrator {
    pub fn new(
        prober: Arc<dyn Prober>,
        thresholds: ThresholdSet,
        timeout: Duration,
        concurrency: usize,
    ) -> Self {
        Self {
            prober,
            thresholds,
            timeout,
            concurrency: concurrency.max(1),
        }
    }

    pub fn from_config(prober: Arc<dyn Prober>, config: &Config) -> Self {
        Self::new(
            prober,
            config.thresholds,
            config.probe_timeout(),
            config.concurrency,
        )
    }

    pub fn thresholds(&self) -> &ThresholdSet {
        &self.thresholds
    }

    /// Check every website and return records, most urgent first.
    ///
    /// Returns once every probe has finished or timed out. A probe task that
    /// panics is reported as an ERROR record for its website.
    pub async fn run(&self, websites: &[String]) -> Vec<CertificateRecord> {
        if websites.is_empty() {
            tracing::warn!("No websites found in configuration");
            return Vec::new();
        }

        tracing::info!(
            "Starting certificate checks for {} websites ({} concurrent)",
            websites.len(),
            self.concurrency
        );

        let pool = Arc::new(Semaphore::new(self.concurrency));
        let (tx, mut rx) = mpsc::channel(websites.len());
        let mut handles = Vec::with_capacity(websites.len());

        for url in websites {
            let pool = Arc::clone(&pool);
            let prober = Arc::clone(&self.prober);
            let tx = tx.clone();
            let thresholds = self.thresholds;
            let timeout = self.timeout;
            let task_url = url.clone();

            let handle = tokio::spawn(async move {
                let record = match pool.acquire_owned().await {
                    Ok(_permit) => {
                        check_endpoint(prober.as_ref(), &task_url, &thresholds, timeout).await
                    }
                    Err(e) => CertificateRecord::failed(
                        &task_url,
                        UNKNOWN_HOSTNAME,
                        &ProbeFailure::new(FailureKind::Unknown, format!("worker pool: {}", e)),
                    ),
                };
                // Capacity equals the number of tasks, so this never waits
                let _ = tx.send(record).await;
            });
            handles.push((url.clone(), handle));
        }
        drop(tx);

        // Records arrive in completion order
        let mut records = Vec::with_capacity(websites.len());
        while let Some(record) = rx.recv().await {
            records.push(record);
        }

        // A task that died before sending is accounted for here
        for (url, handle) in handles {
            if let Err(e) = handle.await {
                tracing::error!("Probe task for {} failed: {}", url, e);
                let hostname = endpoint::resolve(&url)
                    .map(|endpoint| endpoint.hostname)
                    .unwrap_or_else(|_| UNKNOWN_HOSTNAME.to_string());
                records.push(CertificateRecord::failed(
                    url,
                    hostname,
                    &ProbeFailure::new(FailureKind::Unknown, format!("probe task failed: {}", e)),
                ));
            }
        }

        sort_records(&mut records);
        tracing::info!(
            "Certificate checks completed for {} websites",
            records.len()
        );
        records
    }
}

async fn check_endpoint(
    prober: &dyn Prober,
    url: &str,
    thresholds: &ThresholdSet,
    timeout: Duration,
) -> CertificateRecord {
    tracing::info!("Checking certificate for {}", url);

    let endpoint = match endpoint::resolve(url) {
        Ok(endpoint) => endpoint,
        Err(e) => {
            tracing::error!("Error checking certificate for {}: {}", url, e);
            return CertificateRecord::failed(
                url,
                UNKNOWN_HOSTNAME,
                &ProbeFailure::new(FailureKind::MalformedEndpoint, e.reason),
            );
        }
    };

    let outcome = prober.probe(&endpoint, timeout).await;
    let record = expiry::evaluate(&endpoint, &outcome, thresholds, Utc::now());

    match (&record.error, record.expiry_timestamp, record.days_until_expiry) {
        (Some(error), _, _) => {
            tracing::error!("Error checking certificate for {}: {}", url, error)
        }
        (None, Some(expiry), Some(days)) => {
            let expiry = expiry.format("%Y-%m-%d %H:%M:%S UTC");
            if record.status.severity() > CertStatus::Ok.severity() {
                tracing::warn!(
                    "Certificate for {} expires on {} ({} days, {})",
                    url,
                    expiry,
                    days,
                    record.status
                );
            } else {
                tracing::info!("Certificate for {} expires on {} ({} days)", url, expiry, days);
            }
        }
        _ => {}
    }
    record
}

/// Order by days until expiry ascending with ERROR records last. Ties break
/// on url then error text so the order depends only on the record set.
pub fn sort_records(records: &mut [CertificateRecord]) {
    records.sort_by(compare_urgency);
}

fn compare_urgency(a: &CertificateRecord, b: &CertificateRecord) -> Ordering {
    let key = |r: &CertificateRecord| (r.days_until_expiry.is_none(), r.days_until_expiry);
    key(a)
        .cmp(&key(b))
        .then_with(|| a.url.cmp(&b.url))
        .then_with(|| a.error.cmp(&b.error))
}
