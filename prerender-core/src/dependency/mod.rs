//! Dependency Tracking
//!
//! This module tracks the asynchronous data dependencies discovered while
//! rendering a tree.
//!
//! # Overview
//!
//! A dependency is one unit of pending work owned by the data client. The
//! renderer only learns about it when traversal reaches a node that reads it,
//! so the set of known dependencies grows from pass to pass:
//!
//! - A node whose data is still loading renders a placeholder, hiding its
//!   children and any dependencies they would declare.
//! - Once that data arrives, a later pass renders the real children and may
//!   discover new dependencies further down.
//!
//! # Design Decisions
//!
//! 1. The registry is plain bookkeeping. It knows nothing about timers or
//!    passes, which keeps its invariants testable in isolation.
//!
//! 2. Resolution is terminal. A dependency moves from pending to resolved
//!    exactly once and is never reused.
//!
//! 3. Entries are kept in discovery order so logs and frontiers are stable.

mod id;
mod registry;

pub use id::{DependencyId, DependencyState};
pub use registry::DependencyRegistry;
