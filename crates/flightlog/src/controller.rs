//! List view state controller.
//!
//! Ties the URL store to the backend: the current [`QuerySpec`] is derived
//! from the store, user actions are encoded back into it, and every change of
//! the derived spec triggers one list request. Requests carry a sequence
//! number and only the most recently issued one may update the view.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::chips::{active_filters, ActiveFilter, FilterChip};
use crate::error::Result;
use crate::model::LogPage;
use crate::query::{PageSize, QuerySpec, QueryUpdate};
use crate::store::UrlStore;

/// Something that can answer list queries.
#[async_trait]
pub trait LogSource: Send + Sync + 'static {
    /// Fetch one page of flight logs matching `spec`.
    async fn list_logs(&self, spec: &QuerySpec) -> Result<LogPage>;
}

/// What the list view displays.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FetchState {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// A request is in flight.
    Loading,
    /// The latest request succeeded.
    Loaded(LogPage),
    /// The latest request failed; no data is shown.
    Failed(String),
}

impl FetchState {
    /// Whether a request is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// The displayed page, if any.
    #[must_use]
    pub fn page(&self) -> Option<&LogPage> {
        match self {
            Self::Loaded(page) => Some(page),
            _ => None,
        }
    }
}

/// Controller for the flight log list.
///
/// Cheap to clone; clones share the store, the source and the view state.
#[derive(Debug)]
pub struct ListViewController<S, C> {
    store: Arc<S>,
    source: Arc<C>,
    state: Arc<watch::Sender<FetchState>>,
    latest: Arc<AtomicU64>,
    requested: Arc<Mutex<Option<QuerySpec>>>,
}

impl<S, C> Clone for ListViewController<S, C> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            source: Arc::clone(&self.source),
            state: Arc::clone(&self.state),
            latest: Arc::clone(&self.latest),
            requested: Arc::clone(&self.requested),
        }
    }
}

impl<S, C> ListViewController<S, C>
where
    S: UrlStore + 'static,
    C: LogSource,
{
    /// Create a controller over `store` fetching from `source`.
    #[must_use]
    pub fn new(store: Arc<S>, source: Arc<C>) -> Self {
        let (state, _rx) = watch::channel(FetchState::Idle);
        Self {
            store,
            source,
            state: Arc::new(state),
            latest: Arc::new(AtomicU64::new(0)),
            requested: Arc::new(Mutex::new(None)),
        }
    }

    /// The URL store.
    #[must_use]
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// The current state, derived from the URL.
    #[must_use]
    pub fn spec(&self) -> QuerySpec {
        QuerySpec::parse(&self.store.get())
    }

    /// Chips for the active filters.
    #[must_use]
    pub fn chips(&self) -> Vec<FilterChip> {
        active_filters(&self.spec())
    }

    /// A snapshot of what the view displays.
    #[must_use]
    pub fn fetch_state(&self) -> FetchState {
        self.state.borrow().clone()
    }

    /// Receive every change of the displayed state.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<FetchState> {
        self.state.subscribe()
    }

    /// Encode `update` into the URL.
    pub fn update(&self, update: &QueryUpdate) {
        self.store.apply(update);
    }

    /// Commit a new search text.
    pub fn set_search(&self, text: impl Into<String>) {
        self.update(&QueryUpdate::search(text));
    }

    /// Go to `page`.
    pub fn set_page(&self, page: u32) {
        self.update(&QueryUpdate::page(page));
    }

    /// Change the page size.
    pub fn set_page_size(&self, size: PageSize) {
        self.update(&QueryUpdate::page_size(size));
    }

    /// Remove one active filter.
    pub fn remove_filter(&self, filter: &ActiveFilter) {
        let update = filter.removal(&self.spec());
        self.update(&update);
    }

    /// Clear search text and all filters.
    pub fn clear_filters(&self) {
        self.update(&QueryUpdate::clear_all());
    }

    /// Fetch if the derived spec differs from the last one requested.
    ///
    /// Returns the sequence number of the issued request, if any.
    pub fn refresh(&self) -> Option<u64> {
        let spec = self.spec();
        {
            let mut requested = self.requested.lock().unwrap_or_else(PoisonError::into_inner);
            if requested.as_ref() == Some(&spec) {
                return None;
            }
            *requested = Some(spec.clone());
        }
        Some(self.fetch(spec))
    }

    /// Fetch the current spec unconditionally, e.g. to retry after a failure.
    pub fn reload(&self) -> u64 {
        let spec = self.spec();
        *self.requested.lock().unwrap_or_else(PoisonError::into_inner) = Some(spec.clone());
        self.fetch(spec)
    }

    fn fetch(&self, spec: QuerySpec) -> u64 {
        let mut seq = 0;
        self.state.send_modify(|state| {
            seq = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
            *state = FetchState::Loading;
        });
        debug!(seq, page = spec.page, per_page = %spec.page_size, "Fetching flight logs");

        let source = Arc::clone(&self.source);
        let state = Arc::clone(&self.state);
        let latest = Arc::clone(&self.latest);
        tokio::spawn(async move {
            let result = source.list_logs(&spec).await;
            let applied = state.send_if_modified(|current| {
                if latest.load(Ordering::SeqCst) != seq {
                    return false;
                }
                *current = match &result {
                    Ok(page) => FetchState::Loaded(page.clone()),
                    Err(err) => FetchState::Failed(err.user_message()),
                };
                true
            });
            match result {
                Err(err) if applied => warn!(seq, error = %err, "Failed to list flight logs"),
                _ if !applied => debug!(seq, "Discarding stale response"),
                _ => debug!(seq, "Flight logs loaded"),
            }
        });
        seq
    }

    /// Follow the URL store, fetching whenever the derived spec changes.
    ///
    /// Issues the initial fetch right away. The task keeps the controller,
    /// and with it the store, alive, so it runs until the returned handle is
    /// aborted.
    pub fn run(&self) -> JoinHandle<()> {
        let controller = self.clone();
        let mut changes = self.store.subscribe();
        tokio::spawn(async move {
            controller.refresh();
            while changes.changed().await.is_ok() {
                controller.refresh();
            }
            debug!("URL store closed, list view controller stopped");
        })
    }
}
