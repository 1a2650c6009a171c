//! Eager Debounce Scheduler
//!
//! The scheduler decides when to re-render the tree while data dependencies
//! resolve asynchronously and new ones keep being discovered.
//!
//! # Algorithm
//!
//! 1. Run the initial pass immediately.
//! 2. After every pass, stop if no dependency is pending.
//! 3. Otherwise subscribe to every newly pending dependency and wait.
//! 4. The first resolution starts a debounce timer of `D`. Further
//!    resolutions while it runs leave it alone, so a steady trickle cannot
//!    postpone the next pass indefinitely.
//! 5. When the timer fires, run the next pass over everything resolved so far.
//! 6. If the last pending dependency resolves, cancel the timer and run the
//!    next pass at once.
//!
//! A dependency that resolves early therefore waits at most `D` before its
//! subtree is traversed, even while unrelated slower dependencies are still
//! outstanding, and zero time if it was the last one.
//!
//! # Concurrency
//!
//! Everything runs on the task that awaits the scheduler. Passes are
//! synchronous and never overlap. Resolution notifications may be produced on
//! any thread; they are funneled through a single-consumer queue and applied
//! between passes, so the registry needs no locking.

mod eager;
mod event;
mod phase;
mod timer;

pub use eager::{EagerDebounceScheduler, Prerendered, RenderDiagnostics};
pub use event::SchedulerEvent;
pub use phase::{PassTrigger, SchedulerPhase};
pub use timer::DebounceTimer;
