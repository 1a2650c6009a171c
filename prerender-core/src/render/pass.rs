//! Render pass execution.

use smallvec::SmallVec;

use crate::context::DataContext;
use crate::dependency::{DependencyId, DependencyRegistry};
use crate::error::{BoxError, PrerenderError, PrerenderResult};

/// Dependencies left pending at the end of a pass.
pub type Frontier = SmallVec<[DependencyId; 8]>;

/// Output of one render pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassResult {
    /// Zero-based index of the pass within the operation.
    pub index: usize,

    /// Text produced by the render function.
    pub text: String,

    /// Dependencies still pending once traversal finished.
    pub frontier: Frontier,

    /// Dependencies this pass saw for the first time.
    pub discovered: usize,

    /// Previously pending dependencies found settled at the end of this pass.
    pub observed_resolved: usize,
}

impl PassResult {
    pub fn is_settled(&self) -> bool {
        self.frontier.is_empty()
    }
}

/// Runs single render passes and keeps the registry in step with them.
#[derive(Debug, Default)]
pub struct RenderPassRunner {
    passes: usize,
}

impl RenderPassRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of passes started so far.
    pub fn passes(&self) -> usize {
        self.passes
    }

    /// Render `tree` once and reconcile `registry` with the traversal.
    ///
    /// Every request the context reports as read-while-loading is registered.
    /// A pending dependency the traversal did not read is marked resolved only
    /// once the context confirms its request is no longer in flight; one that
    /// is merely unread this pass stays pending. A failing render function
    /// aborts the pass without touching the registry.
    pub fn run<T, C, F, E>(
        &mut self,
        tree: &T,
        context: &C,
        registry: &mut DependencyRegistry,
        render: &mut F,
    ) -> PrerenderResult<PassResult>
    where
        T: ?Sized,
        C: DataContext + ?Sized,
        F: FnMut(&T) -> Result<String, E>,
        E: Into<BoxError>,
    {
        let index = self.passes;
        self.passes += 1;

        context.begin_pass();
        let text = render(tree).map_err(|e| PrerenderError::render(index, e))?;
        let observed = context.pending_requests();

        let mut discovered = 0;
        for dep in &observed {
            if registry.register(*dep) {
                discovered += 1;
            }
        }

        let settled: Frontier = registry
            .pending()
            .filter(|dep| !observed.contains(dep) && !context.is_in_flight(*dep))
            .collect();
        let observed_resolved = settled.len();
        for dep in settled {
            registry.mark_resolved(dep);
        }

        let frontier: Frontier = registry.pending().collect();
        tracing::debug!(
            pass = index,
            discovered,
            observed_resolved,
            frontier = frontier.len(),
            "render pass complete"
        );

        Ok(PassResult {
            index,
            text,
            frontier,
            discovered,
            observed_resolved,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::SettleListener;
    use parking_lot::Mutex;
    use std::convert::Infallible;

    /// Context whose frontier is scripted by the test.
    #[derive(Default)]
    struct ScriptedContext {
        frontier: Mutex<Vec<DependencyId>>,
        settled: Mutex<Vec<DependencyId>>,
        begun: Mutex<usize>,
    }

    impl ScriptedContext {
        fn set(&self, deps: &[DependencyId]) {
            *self.frontier.lock() = deps.to_vec();
        }

        fn settle(&self, dep: DependencyId) {
            self.settled.lock().push(dep);
        }
    }

    impl DataContext for ScriptedContext {
        fn begin_pass(&self) {
            *self.begun.lock() += 1;
        }

        fn pending_requests(&self) -> Vec<DependencyId> {
            self.frontier.lock().clone()
        }

        fn is_in_flight(&self, dependency: DependencyId) -> bool {
            !self.settled.lock().contains(&dependency)
        }

        fn on_settled(&self, _dependency: DependencyId, _listener: SettleListener) {}
    }

    fn render(tree: &str) -> Result<String, Infallible> {
        Ok(tree.to_uppercase())
    }

    #[test]
    fn first_pass_registers_frontier() {
        let context = ScriptedContext::default();
        let mut registry = DependencyRegistry::new();
        let mut runner = RenderPassRunner::new();
        let a = DependencyId::new();
        let b = DependencyId::new();
        context.set(&[a, b]);

        let pass = runner.run("tree", &context, &mut registry, &mut render).unwrap();

        assert_eq!(pass.index, 0);
        assert_eq!(pass.text, "TREE");
        assert_eq!(pass.frontier.as_slice(), &[a, b]);
        assert_eq!(pass.discovered, 2);
        assert_eq!(registry.pending_count(), 2);
        assert_eq!(*context.begun.lock(), 1);
    }

    #[test]
    fn later_pass_observes_resolution_and_discovery() {
        let context = ScriptedContext::default();
        let mut registry = DependencyRegistry::new();
        let mut runner = RenderPassRunner::new();
        let a = DependencyId::new();
        let b = DependencyId::new();
        let c = DependencyId::new();

        context.set(&[a, b]);
        runner.run("tree", &context, &mut registry, &mut render).unwrap();

        // A's data arrived, revealing C below it.
        context.settle(a);
        context.set(&[b, c]);
        let pass = runner.run("tree", &context, &mut registry, &mut render).unwrap();

        assert_eq!(pass.index, 1);
        assert_eq!(pass.discovered, 1);
        assert_eq!(pass.observed_resolved, 1);
        assert_eq!(pass.frontier.as_slice(), &[b, c]);
        assert!(!registry.is_pending(a));
    }

    #[test]
    fn settled_pass_has_empty_frontier() {
        let context = ScriptedContext::default();
        let mut registry = DependencyRegistry::new();
        let mut runner = RenderPassRunner::new();
        let dep = DependencyId::new();
        context.set(&[dep]);
        runner.run("tree", &context, &mut registry, &mut render).unwrap();

        context.settle(dep);
        context.set(&[]);
        let pass = runner.run("tree", &context, &mut registry, &mut render).unwrap();

        assert!(pass.is_settled());
        assert_eq!(registry.pending_count(), 0);
    }

    #[test]
    fn unread_in_flight_dependency_stays_pending() {
        let context = ScriptedContext::default();
        let mut registry = DependencyRegistry::new();
        let mut runner = RenderPassRunner::new();
        let x = DependencyId::new();
        let a = DependencyId::new();
        let y = DependencyId::new();

        context.set(&[x, a]);
        runner.run("tree", &context, &mut registry, &mut render).unwrap();

        // X loaded and its subtree no longer reaches A, which is still loading.
        context.settle(x);
        context.set(&[y]);
        let pass = runner.run("tree", &context, &mut registry, &mut render).unwrap();

        assert_eq!(pass.observed_resolved, 1);
        assert_eq!(pass.frontier.as_slice(), &[a, y]);
        assert!(registry.is_pending(a));
        assert!(!pass.is_settled());
    }

    #[test]
    fn render_failure_leaves_registry_untouched() {
        let context = ScriptedContext::default();
        let mut registry = DependencyRegistry::new();
        let mut runner = RenderPassRunner::new();
        context.set(&[DependencyId::new()]);

        let mut failing = |_: &str| -> Result<String, String> { Err("bad node".into()) };
        let err = runner.run("tree", &context, &mut registry, &mut failing).unwrap_err();

        assert!(matches!(err, PrerenderError::Render { pass: 0, .. }));
        assert!(registry.is_empty());
        assert_eq!(runner.passes(), 1);
    }
}
