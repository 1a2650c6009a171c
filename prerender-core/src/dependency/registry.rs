//! Dependency Registry
//!
//! Records every dependency discovered across all passes of one prerender
//! operation together with its resolution state.

use indexmap::IndexMap;

use super::id::{DependencyId, DependencyState};

/// Bookkeeping for the dependencies of one prerender operation.
#[derive(Debug, Default)]
pub struct DependencyRegistry {
    /// All known dependencies, in discovery order.
    entries: IndexMap<DependencyId, DependencyState>,

    /// Cached number of entries in [`DependencyState::Pending`].
    pending: usize,
}

impl DependencyRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a pending dependency discovered during the current pass.
    ///
    /// Returns `true` if the dependency was not known before. Registering a
    /// dependency that is already pending is a no-op, and a resolved one
    /// stays resolved.
    pub fn register(&mut self, dep: DependencyId) -> bool {
        match self.entries.get(&dep) {
            None => {
                self.entries.insert(dep, DependencyState::Pending);
                self.pending += 1;
                tracing::trace!(%dep, pending = self.pending, "registered dependency");
                true
            }
            Some(DependencyState::Pending) => false,
            Some(DependencyState::Resolved) => {
                tracing::warn!(%dep, "resolved dependency reported as pending again; keeping it resolved");
                false
            }
        }
    }

    /// Transition a dependency to resolved.
    ///
    /// Returns `true` if this call performed the transition. Unknown and
    /// already-resolved dependencies are left untouched.
    pub fn mark_resolved(&mut self, dep: DependencyId) -> bool {
        match self.entries.get_mut(&dep) {
            Some(state) if state.is_pending() => {
                *state = DependencyState::Resolved;
                self.pending -= 1;
                tracing::trace!(%dep, pending = self.pending, "resolved dependency");
                true
            }
            _ => false,
        }
    }

    /// Number of dependencies currently pending.
    pub fn pending_count(&self) -> usize {
        self.pending
    }

    /// Number of dependencies ever tracked.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn state(&self, dep: DependencyId) -> Option<DependencyState> {
        self.entries.get(&dep).copied()
    }

    pub fn is_pending(&self, dep: DependencyId) -> bool {
        self.state(dep).is_some_and(DependencyState::is_pending)
    }

    /// Pending dependencies in discovery order.
    pub fn pending(&self) -> impl Iterator<Item = DependencyId> + '_ {
        self.entries
            .iter()
            .filter(|(_, state)| state.is_pending())
            .map(|(dep, _)| *dep)
    }

    /// Resolved dependencies in discovery order.
    pub fn resolved(&self) -> impl Iterator<Item = DependencyId> + '_ {
        self.entries
            .iter()
            .filter(|(_, state)| !state.is_pending())
            .map(|(dep, _)| *dep)
    }
}
