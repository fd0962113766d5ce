//! BDD step definitions for status classification

use cucumber::{given, then, when};

use certwatch::config::ThresholdSet;
use certwatch::expiry::classify;

use crate::world::CertwatchWorld;

#[given(expr = "a critical threshold of {int} days and a warning threshold of {int} days")]
fn thresholds(world: &mut CertwatchWorld, critical: u32, warning: u32) {
    world.thresholds = ThresholdSet::new(critical, warning).unwrap();
}

#[when(expr = "a certificate has {int} days until expiry")]
fn classify_days(world: &mut CertwatchWorld, days: i64) {
    world.classified = Some(classify(days, &world.thresholds));
}

#[then(expr = "its status should be {string}")]
fn status_is(world: &mut CertwatchWorld, expected: String) {
    let status = world.classified.expect("no certificate was classified");
    assert_eq!(status.to_string(), expected);
}

#[then(expr = "thresholds of {int} critical and {int} warning days should be rejected")]
fn thresholds_rejected(_world: &mut CertwatchWorld, critical: u32, warning: u32) {
    let err = ThresholdSet::new(critical, warning).unwrap_err();
    assert!(err.to_string().contains("must not exceed"), "{err}");
}
