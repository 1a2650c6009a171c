//! The render-pass control loop.

use std::collections::HashSet;

use crate::config::PrerenderConfig;
use crate::context::DataContext;
use crate::dependency::{DependencyId, DependencyRegistry};
use crate::error::{BoxError, PrerenderError, PrerenderResult};
use crate::render::{Completion, CompletionDetector, PassResult, RenderPassRunner};

use super::event::{EventQueue, SchedulerEvent};
use super::phase::{PassTrigger, SchedulerPhase};
use super::timer::DebounceTimer;

/// Counters describing how an operation reached its final pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderDiagnostics {
    /// Total number of passes, including the initial and final ones.
    pub render_count: usize,

    /// Passes started because the debounce timer fired.
    pub debounced_passes: usize,

    /// Passes started immediately because the last dependency resolved.
    pub eager_passes: usize,

    /// Resolution events that moved a dependency out of pending.
    pub resolutions: usize,

    /// Resolution events for dependencies that were no longer pending.
    pub stale_events: usize,

    /// Distinct dependencies tracked over the whole operation.
    pub dependencies: usize,
}

/// The final, fully resolved rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prerendered {
    pub text: String,
    pub diagnostics: RenderDiagnostics,
}

/// Drives render passes until the tree no longer shows any placeholder.
///
/// See the [module documentation](super) for the scheduling rules.
pub struct EagerDebounceScheduler<C> {
    context: C,
    config: PrerenderConfig,
    registry: DependencyRegistry,
    runner: RenderPassRunner,
    detector: CompletionDetector,
    events: EventQueue,
    timer: DebounceTimer,
    /// Dependencies we already asked the context to report on.
    watched: HashSet<DependencyId>,
    phase: SchedulerPhase,
    diagnostics: RenderDiagnostics,
}

impl<C: DataContext> EagerDebounceScheduler<C> {
    pub fn new(context: C, config: PrerenderConfig) -> Self {
        Self {
            context,
            config,
            registry: DependencyRegistry::new(),
            runner: RenderPassRunner::new(),
            detector: CompletionDetector::new(),
            events: EventQueue::new(),
            timer: DebounceTimer::new(),
            watched: HashSet::new(),
            phase: SchedulerPhase::Idle,
            diagnostics: RenderDiagnostics::default(),
        }
    }

    pub fn phase(&self) -> SchedulerPhase {
        self.phase
    }

    pub fn registry(&self) -> &DependencyRegistry {
        &self.registry
    }

    /// Render `tree` repeatedly until a pass leaves nothing pending.
    ///
    /// Resolves to the text of that final pass, or to the first render
    /// failure. There is no built-in timeout: if a dependency never settles
    /// the returned future never completes.
    pub async fn run<T, F, E>(mut self, tree: &T, mut render: F) -> PrerenderResult<Prerendered>
    where
        T: ?Sized,
        F: FnMut(&T) -> Result<String, E>,
        E: Into<BoxError>,
    {
        self.config.validate()?;

        let mut trigger = PassTrigger::Initial;
        loop {
            let pass = self.run_pass(tree, &mut render, trigger)?;

            match self.detector.evaluate(&pass, &self.registry) {
                Completion::Done => return Ok(self.finish(pass)),
                Completion::Continue { pending } => {
                    tracing::trace!(pass = pass.index, pending, "tree not settled");
                }
            }

            self.watch_frontier(&pass);
            trigger = self.next_trigger().await?;
        }
    }

    fn run_pass<T, F, E>(
        &mut self,
        tree: &T,
        render: &mut F,
        trigger: PassTrigger,
    ) -> PrerenderResult<PassResult>
    where
        T: ?Sized,
        F: FnMut(&T) -> Result<String, E>,
        E: Into<BoxError>,
    {
        let index = self.runner.passes();
        if let Some(limit) = self.config.max_passes {
            if index >= limit {
                return Err(PrerenderError::PassLimit {
                    limit,
                    pending: self.registry.pending_count(),
                });
            }
        }

        match trigger {
            PassTrigger::Initial => {}
            PassTrigger::Debounce => self.diagnostics.debounced_passes += 1,
            PassTrigger::Drained => self.diagnostics.eager_passes += 1,
        }

        self.set_phase(SchedulerPhase::Running { pass: index });
        tracing::debug!(pass = index, %trigger, "starting render pass");
        self.runner
            .run(tree, &self.context, &mut self.registry, render)
    }

    /// Subscribe to settlement of every pending dependency not yet watched.
    fn watch_frontier(&mut self, pass: &PassResult) {
        for dep in &pass.frontier {
            if self.watched.insert(*dep) {
                self.context.on_settled(*dep, self.events.listener());
            }
        }
    }

    /// Wait until the next pass is due.
    async fn next_trigger(&mut self) -> PrerenderResult<PassTrigger> {
        self.set_phase(SchedulerPhase::AwaitingEvent);

        loop {
            tokio::select! {
                biased;

                Some(event) = self.events.recv() => {
                    if let Some(trigger) = self.apply(event) {
                        return Ok(trigger);
                    }
                }
                () = self.timer.fired(), if self.timer.is_pending() => {
                    tracing::trace!(pending = self.registry.pending_count(), "debounce window elapsed");
                    return Ok(PassTrigger::Debounce);
                }
                else => {
                    return Err(PrerenderError::EventChannelClosed {
                        pending: self.registry.pending_count(),
                    });
                }
            }
        }
    }

    /// Apply one event. Returns a trigger when a pass must start right away.
    fn apply(&mut self, event: SchedulerEvent) -> Option<PassTrigger> {
        match event {
            SchedulerEvent::Resolved(dep) => {
                if !self.registry.mark_resolved(dep) {
                    self.diagnostics.stale_events += 1;
                    tracing::trace!(%dep, "ignoring stale resolution");
                    return None;
                }
                self.diagnostics.resolutions += 1;

                let pending = self.registry.pending_count();
                if pending == 0 {
                    self.timer.cancel();
                    tracing::debug!(%dep, "last pending dependency resolved");
                    return Some(PassTrigger::Drained);
                }

                // The first resolution of a batch opens the window; later ones
                // ride along without extending it.
                if !self.timer.is_pending() {
                    self.timer.start(self.config.debounce_delay);
                    self.set_phase(SchedulerPhase::DebouncePending);
                    tracing::debug!(%dep, pending, deadline = ?self.timer.deadline(), "debounce window opened");
                }
                tracing::trace!(%dep, pending, "dependency resolved");
                None
            }
        }
    }

    fn finish(&mut self, pass: PassResult) -> Prerendered {
        self.timer.cancel();
        self.set_phase(SchedulerPhase::Done);

        self.diagnostics.render_count = self.runner.passes();
        self.diagnostics.dependencies = self.registry.len();
        tracing::debug!(
            passes = self.diagnostics.render_count,
            dependencies = self.diagnostics.dependencies,
            resolved = self.registry.resolved().count(),
            "prerender settled"
        );

        Prerendered {
            text: pass.text,
            diagnostics: self.diagnostics,
        }
    }

    fn set_phase(&mut self, phase: SchedulerPhase) {
        tracing::trace!(from = %self.phase, to = %phase, "scheduler phase");
        self.phase = phase;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::SettleListener;
    use parking_lot::Mutex;
    use std::convert::Infallible;
    use std::sync::Arc;

    /// Context with a fixed set of dependencies settled by hand.
    #[derive(Default)]
    struct ManualContext {
        state: Mutex<ManualState>,
    }

    #[derive(Default)]
    struct ManualState {
        loading: Vec<DependencyId>,
        observed: Vec<DependencyId>,
        listeners: Vec<(DependencyId, SettleListener)>,
    }

    impl ManualContext {
        fn with(deps: &[DependencyId]) -> Arc<Self> {
            let context = Self::default();
            context.state.lock().loading = deps.to_vec();
            Arc::new(context)
        }

        fn settle(&self, dep: DependencyId) {
            let fired: Vec<_> = {
                let mut state = self.state.lock();
                state.loading.retain(|d| *d != dep);
                let (fired, kept) = std::mem::take(&mut state.listeners)
                    .into_iter()
                    .partition(|(d, _)| *d == dep);
                state.listeners = kept;
                fired
            };
            for (dep, listener) in fired {
                listener(dep);
            }
        }

        /// Renders one token per dependency, marking loading ones.
        fn render(&self) -> String {
            let mut state = self.state.lock();
            let loading = state.loading.clone();
            state.observed = loading.clone();
            if loading.is_empty() {
                "ready".to_string()
            } else {
                format!("loading {}", loading.len())
            }
        }
    }

    impl DataContext for ManualContext {
        fn begin_pass(&self) {
            self.state.lock().observed.clear();
        }

        fn pending_requests(&self) -> Vec<DependencyId> {
            self.state.lock().observed.clone()
        }

        fn is_in_flight(&self, dependency: DependencyId) -> bool {
            self.state.lock().loading.contains(&dependency)
        }

        fn on_settled(&self, dependency: DependencyId, listener: SettleListener) {
            let mut state = self.state.lock();
            if state.loading.contains(&dependency) {
                state.listeners.push((dependency, listener));
            } else {
                drop(state);
                listener(dependency);
            }
        }
    }

    fn render(context: &Arc<ManualContext>) -> Result<String, Infallible> {
        Ok(context.render())
    }

    #[tokio::test(start_paused = true)]
    async fn settled_tree_finishes_after_one_pass() {
        let context = ManualContext::with(&[]);
        let scheduler = EagerDebounceScheduler::new(context.clone(), PrerenderConfig::default());

        let out = scheduler.run(&context, render).await.unwrap();

        assert_eq!(out.text, "ready");
        assert_eq!(out.diagnostics.render_count, 1);
        assert_eq!(out.diagnostics.dependencies, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn dependency_settled_before_subscription_drains_immediately() {
        let dep = DependencyId::new();
        let context = ManualContext::with(&[dep]);
        let tree = context.clone();
        let settle_during_render = {
            let context = context.clone();
            move |tree: &Arc<ManualContext>| -> Result<String, Infallible> {
                let text = tree.render();
                // Settles after the traversal saw it loading.
                context.settle(dep);
                Ok(text)
            }
        };
        let scheduler = EagerDebounceScheduler::new(context, PrerenderConfig::default());

        let out = scheduler.run(&tree, settle_during_render).await.unwrap();

        assert_eq!(out.text, "ready");
        assert_eq!(out.diagnostics.render_count, 2);
        assert_eq!(out.diagnostics.eager_passes, 1);
        assert_eq!(out.diagnostics.resolutions, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn pass_limit_is_enforced() {
        let dep = DependencyId::new();
        let context = ManualContext::with(&[dep]);
        let config = PrerenderConfig::default().with_max_passes(1);
        let scheduler = EagerDebounceScheduler::new(context.clone(), config);

        let settle = {
            let context = context.clone();
            tokio::spawn(async move {
                tokio::time::sleep(std::time::Duration::from_millis(1)).await;
                context.settle(dep);
            })
        };

        let err = scheduler.run(&context, render).await.unwrap_err();
        settle.await.unwrap();

        assert!(matches!(err, PrerenderError::PassLimit { limit: 1, pending: 0 }));
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_config_fails_before_rendering() {
        let context = ManualContext::with(&[]);
        let config = PrerenderConfig {
            max_passes: Some(0),
            ..PrerenderConfig::default()
        };
        let scheduler = EagerDebounceScheduler::new(context.clone(), config);

        let err = scheduler.run(&context, render).await.unwrap_err();

        assert!(matches!(err, PrerenderError::Config(_)));
    }

    #[test]
    fn new_scheduler_is_idle() {
        let scheduler =
            EagerDebounceScheduler::new(ManualContext::with(&[]), PrerenderConfig::default());
        assert_eq!(scheduler.phase(), SchedulerPhase::Idle);
        assert!(scheduler.registry().is_empty());
    }
}
