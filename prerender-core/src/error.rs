//! Error types for the prerender pipeline.

/// Boxed error returned by an injected render function.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type PrerenderResult<T> = Result<T, PrerenderError>;

/// Failures that abort a prerender operation.
///
/// A failing data dependency is not represented here: it settles like any
/// other dependency and the renderer decides what to show for it.
#[derive(thiserror::Error, Debug)]
pub enum PrerenderError {
    /// The render function failed while traversing the tree.
    #[error("render pass {pass} failed: {source}")]
    Render {
        pass: usize,
        #[source]
        source: BoxError,
    },

    /// The configured pass cap was reached before the tree settled.
    #[error("exceeded the limit of {limit} render passes with {pending} dependencies still pending")]
    PassLimit { limit: usize, pending: usize },

    /// No resolution can ever arrive again.
    #[error("resolution event channel closed with {pending} dependencies pending")]
    EventChannelClosed { pending: usize },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl PrerenderError {
    pub fn render(pass: usize, source: impl Into<BoxError>) -> Self {
        Self::Render {
            pass,
            source: source.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
