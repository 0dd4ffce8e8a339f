//! # Engine
//!
//! The reconciliation cycle and the read-only views derived from its state.
//!
//! Build an engine with [`EngineBuilder`]; drive it from the
//! [`crate::scheduler`] or the admin surface.

pub mod builder;
pub mod dashboard;
pub mod reconciler;
pub mod stall;

pub use builder::EngineBuilder;
pub use dashboard::DashboardSnapshot;
pub use reconciler::{CycleReport, ReconciliationEngine, TestAlertReport};
pub use stall::StallDetector;

impl ReconciliationEngine {
    pub fn builder(
        store: std::sync::Arc<dyn crate::store::StateStore>,
        probe: std::sync::Arc<dyn crate::probe::CatalogProbe>,
    ) -> EngineBuilder {
        EngineBuilder::new(store, probe)
    }
}
