//! BDD step definitions for certwatch

pub mod alert_steps;
pub mod check_steps;
pub mod classification_steps;
pub mod report_steps;
