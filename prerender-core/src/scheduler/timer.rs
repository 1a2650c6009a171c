//! Single-slot debounce timer.

use std::pin::Pin;
use std::time::Duration;

use tokio::time::{sleep, Instant, Sleep};

/// Holds at most one scheduled future pass.
///
/// Starting a timer replaces, and thereby cancels, the previous one.
#[derive(Debug, Default)]
pub struct DebounceTimer {
    slot: Option<Pin<Box<Sleep>>>,
}

impl DebounceTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the timer to fire after `delay`, superseding any armed timer.
    pub fn start(&mut self, delay: Duration) {
        if self.slot.replace(Box::pin(sleep(delay))).is_some() {
            tracing::trace!("debounce timer superseded");
        }
        let delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        tracing::trace!(delay_ms, "debounce timer armed");
    }

    /// Disarm the timer. Returns `true` if one was armed.
    pub fn cancel(&mut self) -> bool {
        let armed = self.slot.take().is_some();
        if armed {
            tracing::trace!("debounce timer cancelled");
        }
        armed
    }

    pub fn is_pending(&self) -> bool {
        self.slot.is_some()
    }

    /// When the armed timer will fire.
    pub fn deadline(&self) -> Option<Instant> {
        self.slot.as_ref().map(|sleep| sleep.deadline())
    }

    /// Wait for the armed timer and disarm it.
    ///
    /// Never completes while no timer is armed. Dropping the returned future
    /// before it completes leaves the timer armed with its original deadline.
    pub async fn fired(&mut self) {
        match self.slot.as_mut() {
            Some(sleep) => {
                sleep.as_mut().await;
                self.slot = None;
            }
            None => std::future::pending::<()>().await,
        }
    }
}
