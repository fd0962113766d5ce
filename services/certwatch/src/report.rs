//! Rendering and persistence of check results

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::config::ThresholdSet;
use crate::expiry::{CertStatus, CertificateRecord};

const RULE_WIDTH: usize = 80;

/// Per-status totals over a result set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total: usize,
    pub ok: usize,
    pub warning: usize,
    pub critical: usize,
    pub expired: usize,
    pub error: usize,
}

impl Summary {
    pub fn tally(records: &[CertificateRecord]) -> Self {
        let mut summary = Summary {
            total: records.len(),
            ..Summary::default()
        };
        for record in records {
            match record.status {
                CertStatus::Ok => summary.ok += 1,
                CertStatus::Warning => summary.warning += 1,
                CertStatus::Critical => summary.critical += 1,
                CertStatus::Expired => summary.expired += 1,
                CertStatus::Error => summary.error += 1,
            }
        }
        summary
    }

    pub fn count(&self, status: CertStatus) -> usize {
        match status {
            CertStatus::Ok => self.ok,
            CertStatus::Warning => self.warning,
            CertStatus::Critical => self.critical,
            CertStatus::Expired => self.expired,
            CertStatus::Error => self.error,
        }
    }
}

#[derive(Tabled)]
struct ReportRow {
    #[tabled(rename = "URL")]
    url: String,
    #[tabled(rename = "Hostname")]
    hostname: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Expiry Date")]
    expiry: String,
    #[tabled(rename = "Days Until Expiry")]
    days: String,
}

impl From<&CertificateRecord> for ReportRow {
    fn from(record: &CertificateRecord) -> Self {
        Self {
            url: record.url.clone(),
            hostname: record.hostname.clone(),
            status: record.status.to_string(),
            expiry: record
                .expiry_timestamp
                .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                .unwrap_or_else(|| "N/A".to_string()),
            days: record
                .days_until_expiry
                .map(|d| d.to_string())
                .unwrap_or_else(|| "N/A".to_string()),
        }
    }
}

/// Grid table with one row per record
pub fn render_table(records: &[CertificateRecord]) -> String {
    let rows: Vec<ReportRow> = records.iter().map(ReportRow::from).collect();
    Table::new(rows).with(Style::ascii()).to_string()
}

/// Full console report: table, failures with detail, and totals
pub fn render_report(records: &[CertificateRecord], thresholds: &ThresholdSet) -> String {
    if records.is_empty() {
        return "No results to display\n".to_string();
    }

    let rule = "=".repeat(RULE_WIDTH);
    let mut out = String::new();
    out.push_str(&format!("\n{}\nSSL/TLS Certificate Expiry Report\n{}\n", rule, rule));
    out.push_str(&render_table(records));
    out.push('\n');

    let failures: Vec<&CertificateRecord> = records.iter().filter(|r| r.is_error()).collect();
    if !failures.is_empty() {
        out.push_str("\nErrors:\n");
        for record in failures {
            out.push_str(&format!(
                "  {}: {}\n",
                record.url,
                record.error.as_deref().unwrap_or("unknown error")
            ));
        }
    }

    let summary = Summary::tally(records);
    out.push_str("\nSummary:\n");
    out.push_str(&format!("Total certificates checked: {}\n", summary.total));
    for status in CertStatus::ALL {
        out.push_str(&format!(
            "{}: {}\n",
            summary_label(status, thresholds),
            summary.count(status)
        ));
    }
    out.push_str(&rule);
    out.push('\n');
    out
}

fn summary_label(status: CertStatus, thresholds: &ThresholdSet) -> String {
    match status {
        CertStatus::Ok => "OK".to_string(),
        CertStatus::Warning => format!("Warning (expires within {} days)", thresholds.warning),
        CertStatus::Critical => format!("Critical (expires within {} days)", thresholds.critical),
        CertStatus::Expired => "Expired".to_string(),
        CertStatus::Error => "Errors".to_string(),
    }
}

/// The persisted results file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultsDocument {
    pub timestamp: DateTime<Utc>,
    pub total_checked: usize,
    pub thresholds: ThresholdSet,
    pub results: Vec<CertificateRecord>,
}

impl ResultsDocument {
    pub fn new(records: &[CertificateRecord], thresholds: &ThresholdSet) -> Self {
        Self {
            timestamp: Utc::now(),
            total_checked: records.len(),
            thresholds: *thresholds,
            results: records.to_vec(),
        }
    }
}

/// Write results as pretty-printed JSON
pub fn save_results(
    path: &Path,
    records: &[CertificateRecord],
    thresholds: &ThresholdSet,
) -> crate::Result<()> {
    let document = ResultsDocument::new(records, thresholds);
    let json = serde_json::to_string_pretty(&document)?;
    std::fs::write(path, json).map_err(|e| {
        crate::CertwatchError::Report(format!("Failed to write results to {:?}: {}", path, e))
    })?;
    tracing::info!("Results saved to {:?}", path);
    Ok(())
}
