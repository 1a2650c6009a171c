//! Data Context
//!
//! The data context is the seam between the scheduler and the data client
//! that executes requests. The client is attached to the tree, so the render
//! function reads from it directly; the scheduler only needs to know which
//! requests the traversal saw in a loading state and when they settle.
//!
//! # Protocol
//!
//! For every pass the scheduler:
//!
//! 1. Calls [`DataContext::begin_pass`] to reset the per-pass observation.
//! 2. Runs the render function, during which the client records every request
//!    a node read while it was still loading.
//! 3. Collects that frontier with [`DataContext::pending_requests`], and asks
//!    [`DataContext::is_in_flight`] about dependencies the pass did not read.
//! 4. Subscribes to each newly seen request with [`DataContext::on_settled`].
//!
//! Settlement carries no outcome. A request that fails is reported exactly
//! like one that succeeds, and the renderer decides how to present it.

use std::sync::Arc;

use crate::dependency::DependencyId;

/// Callback invoked once with the dependency that settled.
pub type SettleListener = Box<dyn FnOnce(DependencyId) + Send + 'static>;

/// The data-fetching client as seen by the scheduler.
pub trait DataContext: Send + Sync {
    /// Start observing a new render pass.
    fn begin_pass(&self);

    /// Requests read in a loading state since the last [`begin_pass`].
    ///
    /// [`begin_pass`]: DataContext::begin_pass
    fn pending_requests(&self) -> Vec<DependencyId>;

    /// Whether `dependency` is still waiting on its request.
    ///
    /// Unknown dependencies are not in flight.
    fn is_in_flight(&self, dependency: DependencyId) -> bool;

    /// Invoke `listener` once `dependency` settles.
    ///
    /// If the dependency has already settled the listener runs before this
    /// call returns. Unknown dependencies never fire.
    fn on_settled(&self, dependency: DependencyId, listener: SettleListener);
}

impl<C: DataContext + ?Sized> DataContext for Arc<C> {
    fn begin_pass(&self) {
        (**self).begin_pass()
    }

    fn pending_requests(&self) -> Vec<DependencyId> {
        (**self).pending_requests()
    }

    fn is_in_flight(&self, dependency: DependencyId) -> bool {
        (**self).is_in_flight(dependency)
    }

    fn on_settled(&self, dependency: DependencyId, listener: SettleListener) {
        (**self).on_settled(dependency, listener)
    }
}

impl<C: DataContext + ?Sized> DataContext for &C {
    fn begin_pass(&self) {
        (**self).begin_pass()
    }

    fn pending_requests(&self) -> Vec<DependencyId> {
        (**self).pending_requests()
    }

    fn is_in_flight(&self, dependency: DependencyId) -> bool {
        (**self).is_in_flight(dependency)
    }

    fn on_settled(&self, dependency: DependencyId, listener: SettleListener) {
        (**self).on_settled(dependency, listener)
    }
}
