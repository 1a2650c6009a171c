//! Render Passes
//!
//! A pass is one full, synchronous traversal of the tree by the injected
//! render function. It produces text and, as a side effect, tells us which
//! dependencies the traversal saw still loading.
//!
//! This module holds the pieces that act on a single pass:
//!
//! - [`RenderPassRunner`] runs the render function and reconciles the
//!   registry with what the traversal observed.
//! - [`CompletionDetector`] decides whether that pass is the final one.
//!
//! Deciding *when* to run the next pass is left to the scheduler.

mod completion;
mod pass;

pub use completion::{Completion, CompletionDetector};
pub use pass::{Frontier, PassResult, RenderPassRunner};
