//! Scheduler phases.

use std::fmt;

/// Where the scheduler is in its control loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerPhase {
    /// Created, no pass run yet.
    Idle,

    /// A pass is executing.
    Running { pass: usize },

    /// Waiting for the first resolution after a pass. No timer is armed.
    AwaitingEvent,

    /// A resolution arrived and the debounce timer is armed.
    DebouncePending,

    /// The final pass has run.
    Done,
}

impl fmt::Display for SchedulerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Running { pass } => write!(f, "running(pass {pass})"),
            Self::AwaitingEvent => f.write_str("awaiting-event"),
            Self::DebouncePending => f.write_str("debounce-pending"),
            Self::Done => f.write_str("done"),
        }
    }
}

/// Why a pass was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassTrigger {
    /// The first pass of the operation.
    Initial,

    /// The debounce timer fired.
    Debounce,

    /// The last pending dependency resolved.
    Drained,
}

impl fmt::Display for PassTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Initial => "initial",
            Self::Debounce => "debounce",
            Self::Drained => "drained",
        })
    }
}
