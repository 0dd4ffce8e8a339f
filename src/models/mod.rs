//! # Data Model
//!
//! Plain values exchanged between the probe, the engine, and the incident log.

pub mod check_result;
pub mod incident;
pub mod remediation_outcome;

pub use check_result::CheckResult;
pub use incident::{IncidentKind, IncidentRecord};
pub use remediation_outcome::RemediationOutcome;
