//! Prerender Configuration
//!
//! Options recognized by [`prerender_static`](crate::prerender_static).
//! The configuration can be built in code or deserialized from JSON, where
//! the debounce window is given in whole milliseconds:
//!
//! ```json
//! { "debounce_delay_ms": 25, "max_passes": 50 }
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{PrerenderError, PrerenderResult};

/// Debounce window used when none is configured.
pub const DEFAULT_DEBOUNCE_DELAY: Duration = Duration::from_millis(10);

/// Tuning for the render-pass scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PrerenderConfig {
    /// How long the scheduler waits after the first resolution of a batch
    /// before running the next pass.
    #[serde(rename = "debounce_delay_ms", with = "millis")]
    pub debounce_delay: Duration,

    /// Upper bound on the number of passes, including the initial one.
    /// `None` lets the operation run until the tree settles.
    pub max_passes: Option<usize>,
}

impl PrerenderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_debounce_delay(mut self, delay: Duration) -> Self {
        self.debounce_delay = delay;
        self
    }

    pub fn with_max_passes(mut self, limit: usize) -> Self {
        self.max_passes = Some(limit);
        self
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> PrerenderResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| PrerenderError::config(format!("parse error: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that can never produce output.
    pub fn validate(&self) -> PrerenderResult<()> {
        if self.max_passes == Some(0) {
            return Err(PrerenderError::config("max_passes must be at least 1"));
        }
        Ok(())
    }
}

impl Default for PrerenderConfig {
    fn default() -> Self {
        Self {
            debounce_delay: DEFAULT_DEBOUNCE_DELAY,
            max_passes: None,
        }
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
