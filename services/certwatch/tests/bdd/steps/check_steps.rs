//! BDD step definitions for checking a list of websites

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use cucumber::{given, then, when};

use certwatch::endpoint::Endpoint;
use certwatch::expiry::format_not_after;
use certwatch::probe::{FailureKind, ProbeOutcome, Prober};
use certwatch::Orchestrator;

use crate::world::{CertwatchWorld, ScriptedAnswer};

/// Answers each hostname from a fixed script
#[derive(Debug)]
struct ScriptedProber {
    answers: HashMap<String, ScriptedAnswer>,
}

#[async_trait]
impl Prober for ScriptedProber {
    async fn probe(&self, endpoint: &Endpoint, _timeout: Duration) -> ProbeOutcome {
        match self.answers.get(&endpoint.hostname) {
            // Half a day of slack keeps the floor stable while the test runs
            Some(ScriptedAnswer::ExpiresInDays(days)) => ProbeOutcome::Certificate {
                not_after_raw: format_not_after(
                    Utc::now() + TimeDelta::days(*days) + TimeDelta::hours(12),
                ),
            },
            Some(ScriptedAnswer::Fails(kind)) => {
                ProbeOutcome::failure(*kind, format!("scripted {kind}"))
            }
            None => ProbeOutcome::failure(FailureKind::Unknown, "not scripted"),
        }
    }
}

fn failure_kind(name: &str) -> FailureKind {
    match name {
        "DnsError" => FailureKind::DnsError,
        "Timeout" => FailureKind::Timeout,
        "TlsError" => FailureKind::TlsError,
        "ParseError" => FailureKind::ParseError,
        "MalformedEndpoint" => FailureKind::MalformedEndpoint,
        _ => FailureKind::Unknown,
    }
}

fn hostname_of(url: &str) -> String {
    certwatch::endpoint::resolve(url)
        .map(|e| e.hostname)
        .unwrap_or_default()
}

#[given(expr = "the website {string} whose certificate expires in {int} days")]
fn website_expiring(world: &mut CertwatchWorld, url: String, days: i64) {
    world
        .answers
        .insert(hostname_of(&url), ScriptedAnswer::ExpiresInDays(days));
    world.websites.push(url);
}

#[given(expr = "the website {string} whose certificate expired {int} days ago")]
fn website_expired(world: &mut CertwatchWorld, url: String, days: i64) {
    world
        .answers
        .insert(hostname_of(&url), ScriptedAnswer::ExpiresInDays(-days));
    world.websites.push(url);
}

#[given(expr = "the website {string} whose probe fails with {word}")]
fn website_failing(world: &mut CertwatchWorld, url: String, kind: String) {
    world
        .answers
        .insert(hostname_of(&url), ScriptedAnswer::Fails(failure_kind(&kind)));
    world.websites.push(url);
}

#[given(expr = "the configuration entry {string}")]
fn raw_entry(world: &mut CertwatchWorld, entry: String) {
    world.websites.push(entry);
}

#[when(expr = "the websites are checked with at most {int} probes at a time")]
async fn check_websites(world: &mut CertwatchWorld, concurrency: usize) {
    let prober = ScriptedProber {
        answers: world.answers.clone(),
    };
    let orchestrator = Orchestrator::new(
        Arc::new(prober),
        world.thresholds,
        Duration::from_secs(5),
        concurrency,
    );
    world.records = orchestrator.run(&world.websites).await;
}

#[then(expr = "there should be {int} records")]
fn record_count(world: &mut CertwatchWorld, count: usize) {
    assert_eq!(world.records.len(), count);
}

#[then(expr = "record {int} should be {string} with status {string}")]
fn record_at(world: &mut CertwatchWorld, position: usize, url: String, status: String) {
    let record = &world.records[position - 1];
    assert_eq!(record.url, url);
    assert_eq!(record.status.to_string(), status);
}

#[then(expr = "the record for {string} should report {int} days until expiry")]
fn record_days(world: &mut CertwatchWorld, url: String, days: i64) {
    let record = find(world, &url);
    assert_eq!(record.days_until_expiry, Some(days));
    assert!(record.expiry_timestamp.is_some());
    assert!(record.error.is_none());
}

#[then(expr = "the record for {string} should have hostname {string}")]
fn record_hostname(world: &mut CertwatchWorld, url: String, hostname: String) {
    assert_eq!(find(world, &url).hostname, hostname);
}

#[then(expr = "the record for {string} should fail with {string}")]
fn record_error(world: &mut CertwatchWorld, url: String, prefix: String) {
    let record = find(world, &url);
    let error = record.error.as_deref().expect("record has no error");
    assert!(error.starts_with(&prefix), "{error}");
    assert!(record.days_until_expiry.is_none());
    assert!(record.expiry_timestamp.is_none());
}

fn find<'a>(world: &'a CertwatchWorld, url: &str) -> &'a certwatch::CertificateRecord {
    world
        .records
        .iter()
        .find(|r| r.url == url)
        .unwrap_or_else(|| panic!("no record for {url}"))
}
