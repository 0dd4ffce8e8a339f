//! # Remediation
//!
//! Cache invalidation triggered by desync and failure transitions. Backends
//! are registered adapters tried in descending priority; every active one is
//! purged because caches are usually layered. A universal fallback runs when
//! no named backend could be purged, so a flush always reports at least one
//! backend.

pub mod backends;
pub mod dispatcher;

use async_trait::async_trait;

use crate::error::BackendError;

pub use backends::{build_backends, CommandBackend, HttpPurgeBackend, ObjectCacheBackend};
pub use dispatcher::RemediationDispatcher;

/// A cache layer that can be invalidated
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Name recorded in flush incidents
    fn name(&self) -> &str;

    /// Whether this backend is present in the deployment
    async fn is_active(&self) -> bool;

    /// Invalidate everything this backend holds
    async fn purge(&self) -> Result<(), BackendError>;
}
