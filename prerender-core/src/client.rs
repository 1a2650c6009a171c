//! Query Client
//!
//! A minimal data client that implements [`DataContext`]. Requests are keyed
//! by operation name and executed by a [`Link`]; each operation is requested
//! at most once per client and its result is kept for later passes.
//!
//! # Example
//!
//! ```rust,ignore
//! let client = QueryClient::new(MyLink::default());
//!
//! match client.read("Profile") {
//!     QueryState::Loading => "<p>Loading...</p>".to_string(),
//!     QueryState::Ready(data) => format!("<p>{}</p>", data["name"]),
//!     QueryState::Failed(message) => format!("<p>Error: {message}</p>"),
//! }
//! ```

use std::sync::{Arc, Weak};

use indexmap::{IndexMap, IndexSet};
use parking_lot::Mutex;
use serde_json::Value;

use crate::context::{DataContext, SettleListener};
use crate::dependency::DependencyId;

/// State of one operation as seen by the renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryState {
    Loading,
    Ready(Value),
    Failed(String),
}

impl QueryState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

/// Executes requests on behalf of a [`QueryClient`].
///
/// The link receives a [`Responder`] and settles it whenever the result is
/// available, either inline or later from another task.
pub trait Link: Send + Sync {
    fn request(&self, operation: &str, responder: Responder);
}

/// One-shot handle that settles a single request.
pub struct Responder {
    client: Weak<Shared>,
    operation: String,
    id: DependencyId,
}

impl Responder {
    /// The dependency this responder settles.
    pub fn id(&self) -> DependencyId {
        self.id
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Settle the request with data.
    pub fn resolve(self, data: Value) {
        self.settle(QueryState::Ready(data));
    }

    /// Settle the request with an error message.
    pub fn reject(self, message: impl Into<String>) {
        self.settle(QueryState::Failed(message.into()));
    }

    fn settle(self, state: QueryState) {
        // The client may already be gone once prerendering has finished.
        let Some(client) = self.client.upgrade() else {
            return;
        };
        client.settle(&self.operation, state);
    }
}

impl std::fmt::Debug for Responder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Responder")
            .field("operation", &self.operation)
            .field("id", &self.id)
            .finish()
    }
}

struct QueryEntry {
    id: DependencyId,
    state: QueryState,
    listeners: Vec<SettleListener>,
}

#[derive(Default)]
struct ClientState {
    queries: IndexMap<String, QueryEntry>,
    /// Requests read while loading during the current pass.
    observed: IndexSet<DependencyId>,
}

struct Shared {
    link: Box<dyn Link>,
    state: Mutex<ClientState>,
}

impl Shared {
    fn settle(&self, operation: &str, outcome: QueryState) {
        let (id, listeners) = {
            let mut state = self.state.lock();
            let Some(entry) = state.queries.get_mut(operation) else {
                return;
            };
            if !entry.state.is_loading() {
                tracing::trace!(operation, "ignoring second settlement");
                return;
            }
            entry.state = outcome;
            (entry.id, std::mem::take(&mut entry.listeners))
        };

        tracing::trace!(operation, dep = %id, listeners = listeners.len(), "request settled");
        for listener in listeners {
            listener(id);
        }
    }
}

/// Cheaply cloneable client shared between the tree and the scheduler.
#[derive(Clone)]
pub struct QueryClient {
    shared: Arc<Shared>,
}

impl QueryClient {
    pub fn new(link: impl Link + 'static) -> Self {
        Self {
            shared: Arc::new(Shared {
                link: Box::new(link),
                state: Mutex::new(ClientState::default()),
            }),
        }
    }

    /// Read the state of `operation`, starting its request on first read.
    ///
    /// A loading result is recorded as part of the current pass's frontier.
    pub fn read(&self, operation: &str) -> QueryState {
        let responder = {
            let mut state = self.shared.state.lock();
            let ClientState { queries, observed } = &mut *state;
            if let Some(entry) = queries.get(operation) {
                if entry.state.is_loading() {
                    observed.insert(entry.id);
                }
                return entry.state.clone();
            }

            let id = DependencyId::new();
            queries.insert(
                operation.to_string(),
                QueryEntry {
                    id,
                    state: QueryState::Loading,
                    listeners: Vec::new(),
                },
            );
            Responder {
                client: Arc::downgrade(&self.shared),
                operation: operation.to_string(),
                id,
            }
        };

        let id = responder.id;
        tracing::debug!(operation, dep = %id, "starting request");
        self.shared.link.request(operation, responder);

        // The link may have settled the request inline.
        let mut state = self.shared.state.lock();
        let ClientState { queries, observed } = &mut *state;
        match queries.get(operation) {
            Some(entry) => {
                if entry.state.is_loading() {
                    observed.insert(entry.id);
                }
                entry.state.clone()
            }
            None => QueryState::Loading,
        }
    }

    /// Whether `operation` has ever been requested.
    pub fn has_requested(&self, operation: &str) -> bool {
        self.shared.state.lock().queries.contains_key(operation)
    }

    /// Dependency id assigned to `operation`, if it has been requested.
    pub fn dependency_of(&self, operation: &str) -> Option<DependencyId> {
        self.shared.state.lock().queries.get(operation).map(|e| e.id)
    }

    /// Number of requests still in flight.
    pub fn in_flight(&self) -> usize {
        self.shared
            .state
            .lock()
            .queries
            .values()
            .filter(|e| e.state.is_loading())
            .count()
    }
}

impl DataContext for QueryClient {
    fn begin_pass(&self) {
        self.shared.state.lock().observed.clear();
    }

    fn pending_requests(&self) -> Vec<DependencyId> {
        self.shared.state.lock().observed.iter().copied().collect()
    }

    fn is_in_flight(&self, dependency: DependencyId) -> bool {
        self.shared
            .state
            .lock()
            .queries
            .values()
            .any(|e| e.id == dependency && e.state.is_loading())
    }

    fn on_settled(&self, dependency: DependencyId, listener: SettleListener) {
        let mut state = self.shared.state.lock();
        let Some(entry) = state.queries.values_mut().find(|e| e.id == dependency) else {
            return;
        };
        if entry.state.is_loading() {
            entry.listeners.push(listener);
            return;
        }
        drop(state);
        listener(dependency);
    }
}
