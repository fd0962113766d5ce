//! BDD test world for certwatch

use std::collections::HashMap;

use certwatch::config::{ThresholdSet, WebhookConfig};
use certwatch::expiry::{CertStatus, CertificateRecord};
use certwatch::notifier::Alert;
use certwatch::probe::FailureKind;
use cucumber::World;

/// What the scripted prober answers for one hostname
#[derive(Debug, Clone, Copy)]
pub enum ScriptedAnswer {
    ExpiresInDays(i64),
    Fails(FailureKind),
}

#[derive(Debug, Default, World)]
pub struct CertwatchWorld {
    pub thresholds: ThresholdSet,

    // Classification
    pub classified: Option<CertStatus>,

    // Orchestration
    pub websites: Vec<String>,
    pub answers: HashMap<String, ScriptedAnswer>,
    pub records: Vec<CertificateRecord>,

    // Reporting and alerting
    pub report: Option<String>,
    pub webhook: Option<WebhookConfig>,
    pub alert: Option<Alert>,
}
