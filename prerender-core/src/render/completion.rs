//! Completion detection.

use crate::dependency::DependencyRegistry;

use super::pass::PassResult;

/// Verdict for a finished pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// No placeholders remain; the pass's text is final.
    Done,

    /// The pass left dependencies pending.
    Continue { pending: usize },
}

/// Decides whether a pass is the final one.
///
/// A pass is final iff no dependency is pending in the registry as updated
/// by that same pass.
#[derive(Debug, Default, Clone, Copy)]
pub struct CompletionDetector;

impl CompletionDetector {
    pub fn new() -> Self {
        Self
    }

    pub fn evaluate(&self, pass: &PassResult, registry: &DependencyRegistry) -> Completion {
        let pending = registry.pending_count();
        debug_assert_eq!(
            pending,
            pass.frontier.len(),
            "pass {} frontier out of step with the registry",
            pass.index
        );
        if pass.is_settled() && pending == 0 {
            Completion::Done
        } else {
            Completion::Continue { pending }
        }
    }

    pub fn is_done(&self, pass: &PassResult, registry: &DependencyRegistry) -> bool {
        self.evaluate(pass, registry) == Completion::Done
    }
}
