//! BDD step definitions for webhook alerts

use cucumber::{given, then, when};

use certwatch::config::WebhookConfig;
use certwatch::notifier::build_alert;

use crate::world::CertwatchWorld;

#[given(expr = "an enabled webhook that alerts on critical {word} and on warning {word}")]
fn webhook(world: &mut CertwatchWorld, on_critical: String, on_warning: String) {
    world.webhook = Some(WebhookConfig {
        enabled: true,
        url: "http://localhost/hook".to_string(),
        send_on_critical: on_critical == "yes",
        send_on_warning: on_warning == "yes",
    });
}

#[given("a disabled webhook")]
fn disabled_webhook(world: &mut CertwatchWorld) {
    world.webhook = Some(WebhookConfig {
        enabled: false,
        url: "http://localhost/hook".to_string(),
        send_on_critical: true,
        send_on_warning: true,
    });
}

#[when("the alert is prepared")]
fn prepare(world: &mut CertwatchWorld) {
    let config = world.webhook.as_ref().expect("no webhook configured");
    world.alert = build_alert(&world.records, config);
}

#[then(expr = "the alert should list {int} certificates")]
fn alert_lists(world: &mut CertwatchWorld, count: usize) {
    let alert = world.alert.as_ref().expect("no alert was prepared");
    assert_eq!(alert.records.len(), count);
}

#[then(expr = "the alert should mention {string}")]
fn alert_mentions(world: &mut CertwatchWorld, url: String) {
    let alert = world.alert.as_ref().expect("no alert was prepared");
    assert!(alert.records.iter().any(|r| r.url == url));
    assert!(alert.message.contains(&url), "{}", alert.message);
}

#[then("no alert should be sent")]
fn no_alert(world: &mut CertwatchWorld) {
    assert!(world.alert.is_none());
}
