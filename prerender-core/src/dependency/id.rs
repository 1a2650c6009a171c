//! Dependency identifiers and states.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Opaque identifier for one logical data request.
///
/// Identifiers are assigned by the data client and are unique per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DependencyId(u64);

impl DependencyId {
    /// Generate a new unique dependency ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for DependencyId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<u64> for DependencyId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for DependencyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dep#{}", self.0)
    }
}

/// Resolution state of a tracked dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyState {
    /// The request is in flight; its node rendered a placeholder.
    Pending,

    /// The request settled, successfully or not. Terminal.
    Resolved,
}

impl DependencyState {
    pub fn is_pending(self) -> bool {
        self == Self::Pending
    }
}
