//! URL state store.
//!
//! The list view never keeps its own copy of the query state; it reads and
//! writes the location's query string through a [`UrlStore`].

use tokio::sync::watch;
use tracing::debug;

use crate::query::{QueryString, QueryUpdate};

/// A key-value store holding the current location's query string.
pub trait UrlStore: Send + Sync {
    /// The current query string.
    fn get(&self) -> QueryString;

    /// Replace the query string. Subscribers are notified only on change.
    fn set(&self, params: QueryString);

    /// Receive every subsequent change.
    fn subscribe(&self) -> watch::Receiver<QueryString>;

    /// Encode `update` on top of the current state and store the result.
    fn apply(&self, update: &QueryUpdate) {
        let next = update.apply(&self.get());
        self.set(next);
    }
}

/// In-process [`UrlStore`] backed by a watch channel.
#[derive(Debug)]
pub struct MemoryUrlStore {
    tx: watch::Sender<QueryString>,
}

impl MemoryUrlStore {
    /// Create a store holding `initial`.
    #[must_use]
    pub fn new(initial: QueryString) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// Create a store from a raw query string such as `?search=foo&page=3`.
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        Self::new(QueryString::parse(query))
    }
}

impl Default for MemoryUrlStore {
    fn default() -> Self {
        Self::new(QueryString::new())
    }
}

impl UrlStore for MemoryUrlStore {
    fn get(&self) -> QueryString {
        self.tx.borrow().clone()
    }

    fn set(&self, params: QueryString) {
        self.tx.send_if_modified(|current| {
            if *current == params {
                return false;
            }
            debug!(from = %current, to = %params, "Query string changed");
            *current = params;
            true
        });
    }

    fn subscribe(&self) -> watch::Receiver<QueryString> {
        self.tx.subscribe()
    }
}
