//! `flightlog` - Browse and manage drone flight logs.
//!
//! The core of this crate is the list view: search text, filters and
//! pagination live in a URL query string ([`query::QueryString`]), the typed
//! state ([`QuerySpec`]) is derived from it, and user actions are encoded back
//! as [`QueryUpdate`]s. [`ListViewController`] watches a [`UrlStore`] and
//! fetches one page per state change, keeping only the latest response.
//!
//! [`ApiClient`] talks to the flight log backend.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod api;
pub mod chips;
pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod model;
pub mod query;
pub mod search;
pub mod share;
pub mod store;

pub use api::ApiClient;
pub use chips::{active_filters, ActiveFilter, FilterChip};
pub use config::Config;
pub use controller::{FetchState, ListViewController, LogSource};
pub use error::{Error, Result};
pub use logging::init_logging;
pub use query::{QuerySpec, QueryUpdate};
pub use search::DebouncedSearch;
pub use store::{MemoryUrlStore, UrlStore};
