//! BDD step definitions for the console report

use cucumber::{then, when};

use certwatch::report::render_report;

use crate::world::CertwatchWorld;

#[when("the report is rendered")]
fn render(world: &mut CertwatchWorld) {
    world.report = Some(render_report(&world.records, &world.thresholds));
}

#[then(expr = "the report should contain {string}")]
fn report_contains(world: &mut CertwatchWorld, text: String) {
    let report = world.report.as_deref().expect("no report rendered");
    assert!(report.contains(&text), "missing {text:?} in:\n{report}");
}
