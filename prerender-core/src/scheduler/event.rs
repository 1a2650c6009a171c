//! Resolution events.

use tokio::sync::mpsc;

use crate::context::SettleListener;
use crate::dependency::DependencyId;

/// Something that happened between passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerEvent {
    /// The data client settled a dependency.
    Resolved(DependencyId),
}

/// Single-consumer queue that carries events into the scheduler.
///
/// The queue keeps a sender of its own, so `recv` never observes a closed
/// channel while the queue is alive.
pub(crate) struct EventQueue {
    tx: mpsc::UnboundedSender<SchedulerEvent>,
    rx: mpsc::UnboundedReceiver<SchedulerEvent>,
}

impl EventQueue {
    pub(crate) fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }

    /// Build a listener that forwards a settlement into this queue.
    ///
    /// Settlements that arrive after the scheduler is gone are dropped.
    pub(crate) fn listener(&self) -> SettleListener {
        let tx = self.tx.clone();
        Box::new(move |dep: DependencyId| {
            let _ = tx.send(SchedulerEvent::Resolved(dep));
        })
    }

    pub(crate) async fn recv(&mut self) -> Option<SchedulerEvent> {
        self.rx.recv().await
    }
}
