// Health state machine for the storefront monitor
//
// Classifies probe results into a health state and decides which transition
// a reconciliation cycle has observed. Pure logic, no I/O.

pub mod states;
pub mod events;
pub mod classifier;

// Re-export main types for convenient access
pub use states::HealthState;
pub use events::Transition;
pub use classifier::{classify, detect_transition};
