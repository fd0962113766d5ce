//! Probe trait and outcome types

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::endpoint::Endpoint;

/// Classification of a per-endpoint failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureKind {
    MalformedEndpoint,
    DnsError,
    Timeout,
    TlsError,
    ParseError,
    Unknown,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::MalformedEndpoint => write!(f, "MalformedEndpoint"),
            FailureKind::DnsError => write!(f, "DnsError"),
            FailureKind::Timeout => write!(f, "Timeout"),
            FailureKind::TlsError => write!(f, "TlsError"),
            FailureKind::ParseError => write!(f, "ParseError"),
            FailureKind::Unknown => write!(f, "Unknown"),
        }
    }
}

/// A classified failure with its diagnostic detail
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeFailure {
    pub kind: FailureKind,
    pub detail: String,
}

impl ProbeFailure {
    pub fn new(kind: FailureKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for ProbeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.detail)
    }
}

/// Result of a single probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The handshake succeeded; `not_after_raw` is the leaf certificate's
    /// not-after in the textual form produced by
    /// [`crate::expiry::format_not_after`].
    Certificate { not_after_raw: String },
    Failure(ProbeFailure),
}

impl ProbeOutcome {
    pub fn failure(kind: FailureKind, detail: impl Into<String>) -> Self {
        ProbeOutcome::Failure(ProbeFailure::new(kind, detail))
    }
}

/// Retrieves certificate metadata for one endpoint.
///
/// Implementations make a single attempt, bounded by `timeout`, and never
/// retry.
#[async_trait]
pub trait Prober: Send + Sync + fmt::Debug {
    async fn probe(&self, endpoint: &Endpoint, timeout: Duration) -> ProbeOutcome;
}
