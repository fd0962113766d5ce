//! Expiry evaluation: not-after parsing, days remaining, and status tiers
//!
//! Everything here is pure. The caller supplies `now`.

use std::fmt;

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ThresholdSet;
use crate::endpoint::Endpoint;
use crate::probe::{FailureKind, ProbeFailure, ProbeOutcome};

/// Textual not-after form, e.g. `Jan 15 23:59:59 2025 GMT`
pub const NOT_AFTER_FORMAT: &str = "%b %e %H:%M:%S %Y GMT";

const NOT_AFTER_PARSE_FORMAT: &str = "%b %d %H:%M:%S %Y";

/// Status of a checked certificate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CertStatus {
    Ok,
    Warning,
    Critical,
    Expired,
    Error,
}

impl CertStatus {
    pub const ALL: [CertStatus; 5] = [
        CertStatus::Ok,
        CertStatus::Warning,
        CertStatus::Critical,
        CertStatus::Expired,
        CertStatus::Error,
    ];

    /// Urgency rank of a threshold tier; `None` for `Error`
    pub fn severity(self) -> Option<u8> {
        match self {
            CertStatus::Ok => Some(0),
            CertStatus::Warning => Some(1),
            CertStatus::Critical => Some(2),
            CertStatus::Expired => Some(3),
            CertStatus::Error => None,
        }
    }
}

impl fmt::Display for CertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CertStatus::Ok => write!(f, "OK"),
            CertStatus::Warning => write!(f, "WARNING"),
            CertStatus::Critical => write!(f, "CRITICAL"),
            CertStatus::Expired => write!(f, "EXPIRED"),
            CertStatus::Error => write!(f, "ERROR"),
        }
    }
}

/// Final result for one endpoint.
///
/// Either `expiry_timestamp` and `days_until_expiry` are set, or `error` is;
/// build through [`CertificateRecord::expiring`] or
/// [`CertificateRecord::failed`] to keep it that way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateRecord {
    pub url: String,
    pub hostname: String,
    pub status: CertStatus,
    pub expiry_timestamp: Option<DateTime<Utc>>,
    pub days_until_expiry: Option<i64>,
    pub error: Option<String>,
}

impl CertificateRecord {
    pub fn expiring(
        url: impl Into<String>,
        hostname: impl Into<String>,
        expiry: DateTime<Utc>,
        days_until_expiry: i64,
        thresholds: &ThresholdSet,
    ) -> Self {
        Self {
            url: url.into(),
            hostname: hostname.into(),
            status: classify(days_until_expiry, thresholds),
            expiry_timestamp: Some(expiry),
            days_until_expiry: Some(days_until_expiry),
            error: None,
        }
    }

    pub fn failed(
        url: impl Into<String>,
        hostname: impl Into<String>,
        failure: &ProbeFailure,
    ) -> Self {
        Self {
            url: url.into(),
            hostname: hostname.into(),
            status: CertStatus::Error,
            expiry_timestamp: None,
            days_until_expiry: None,
            error: Some(failure.to_string()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.status == CertStatus::Error
    }
}

/// Map days remaining to a tier. Checked in order: expired, critical,
/// warning, ok.
pub fn classify(days_until_expiry: i64, thresholds: &ThresholdSet) -> CertStatus {
    if days_until_expiry < 0 {
        CertStatus::Expired
    } else if days_until_expiry <= i64::from(thresholds.critical) {
        CertStatus::Critical
    } else if days_until_expiry <= i64::from(thresholds.warning) {
        CertStatus::Warning
    } else {
        CertStatus::Ok
    }
}

/// Whole days from `now` until `expiry`, rounded toward negative infinity
pub fn days_until(expiry: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let delta = expiry.signed_duration_since(now);
    let whole_days = delta.num_days();
    if delta < TimeDelta::days(whole_days) {
        whole_days - 1
    } else {
        whole_days
    }
}

pub fn format_not_after(instant: DateTime<Utc>) -> String {
    instant.format(NOT_AFTER_FORMAT).to_string()
}

/// Parse a not-after string such as `Jan  5 08:00:00 2031 GMT`
pub fn parse_not_after(raw: &str) -> Result<DateTime<Utc>, ProbeFailure> {
    let parse_error = |reason: String| {
        ProbeFailure::new(FailureKind::ParseError, format!("{:?}: {}", raw, reason))
    };

    let tokens: Vec<&str> = raw.split_whitespace().collect();
    let Some((zone, fields)) = tokens.split_last() else {
        return Err(parse_error("empty timestamp".to_string()));
    };
    if !matches!(*zone, "GMT" | "UTC") {
        return Err(parse_error(format!("unsupported time zone {:?}", zone)));
    }

    let naive = NaiveDateTime::parse_from_str(&fields.join(" "), NOT_AFTER_PARSE_FORMAT)
        .map_err(|e| parse_error(e.to_string()))?;
    Ok(naive.and_utc())
}

/// Turn one probe outcome into a record
pub fn evaluate(
    endpoint: &Endpoint,
    outcome: &ProbeOutcome,
    thresholds: &ThresholdSet,
    now: DateTime<Utc>,
) -> CertificateRecord {
    match outcome {
        ProbeOutcome::Failure(failure) => {
            CertificateRecord::failed(&endpoint.url, &endpoint.hostname, failure)
        }
        ProbeOutcome::Certificate { not_after_raw } => match parse_not_after(not_after_raw) {
            Ok(expiry) => CertificateRecord::expiring(
                &endpoint.url,
                &endpoint.hostname,
                expiry,
                days_until(expiry, now),
                thresholds,
            ),
            Err(failure) => CertificateRecord::failed(&endpoint.url, &endpoint.hostname, &failure),
        },
    }
}
