//! Prerender Core
//!
//! This crate statically renders a component tree whose data dependencies are
//! discovered while rendering. A node whose data is still loading renders a
//! placeholder, and only a later pass, after that data arrives, reaches the
//! children that declare the next dependencies. The crate provides:
//!
//! - Dependency bookkeeping across render passes
//! - A pass runner around an injected, synchronous render function
//! - An eager, debounced scheduler that decides when to re-render
//! - A small reference data client
//!
//! The structural renderer and the data client are collaborators: the first
//! is any `FnMut(&T) -> Result<String, E>`, the second anything implementing
//! [`DataContext`].
//!
//! # Architecture
//!
//! - `dependency`: dependency identifiers and the registry
//! - `render`: single-pass execution and completion detection
//! - `scheduler`: the control loop that sequences passes
//! - `client`: a [`DataContext`] backed by a pluggable [`Link`]
//!
//! # Example
//!
//! ```rust,ignore
//! use prerender_core::{prerender_static, PrerenderConfig, QueryClient, QueryState};
//!
//! let client = QueryClient::new(HttpLink::new(endpoint));
//! let page = Page { client: client.clone() };
//!
//! let out = prerender_static(page, client, |page: &Page| {
//!     Ok::<_, std::convert::Infallible>(match page.client.read("Profile") {
//!         QueryState::Loading => "<p>Loading...</p>".to_string(),
//!         QueryState::Ready(data) => format!("<p>{}</p>", data["name"]),
//!         QueryState::Failed(message) => format!("<p>{message}</p>"),
//!     })
//! }, PrerenderConfig::default())
//! .await?;
//! ```

pub mod client;
pub mod config;
pub mod context;
pub mod dependency;
pub mod error;
pub mod render;
pub mod scheduler;

pub use client::{Link, QueryClient, QueryState, Responder};
pub use config::PrerenderConfig;
pub use context::{DataContext, SettleListener};
pub use dependency::{DependencyId, DependencyRegistry, DependencyState};
pub use error::{BoxError, PrerenderError, PrerenderResult};
pub use scheduler::{EagerDebounceScheduler, Prerendered, RenderDiagnostics};

/// Render `tree` until no dependency is pending and return the final text.
///
/// The first pass runs immediately. Later passes follow the debounce rules
/// of [`EagerDebounceScheduler`]. A failing render aborts the operation; a
/// failing dependency does not. Wrap the returned future in a timeout to
/// bound the wait on dependencies that never settle.
#[tracing::instrument(
    name = "prerender",
    skip_all,
    fields(debounce_ms = u64::try_from(config.debounce_delay.as_millis()).unwrap_or(u64::MAX))
)]
pub async fn prerender_static<T, C, F, E>(
    tree: T,
    context: C,
    render: F,
    config: PrerenderConfig,
) -> PrerenderResult<Prerendered>
where
    C: DataContext,
    F: FnMut(&T) -> Result<String, E>,
    E: Into<BoxError>,
{
    EagerDebounceScheduler::new(context, config)
        .run(&tree, render)
        .await
}
