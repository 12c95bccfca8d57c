//! Lock Store Port
//!
//! Defines the interface for per-endpoint back-off state.
//! Implementations must share state across processes; the file-backed
//! adapter is the production one.

use crate::domain::value_objects::Endpoint;

/// Store of recent endpoint failures.
///
/// This is an outbound port. The fetch service consults it before every
/// attempt and records transport failures in it. Both operations are
/// infallible from the caller's point of view: a store that cannot read or
/// write degrades toward more attempts, never fewer.
pub trait LockStore: Send + Sync {
    /// Whether a new attempt against `endpoint` is allowed now.
    ///
    /// Stale or corrupt records are removed as a side effect.
    fn is_eligible(&self, endpoint: &Endpoint) -> bool;

    /// Record that `endpoint` just failed.
    fn record_failure(&self, endpoint: &Endpoint);
}
