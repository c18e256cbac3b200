//! List-view query state.
//!
//! The URL query string is the single source of truth. [`QuerySpec`] is
//! derived from a [`QueryString`] on demand, and every change is expressed as
//! a [`QueryUpdate`] that is encoded back into a new [`QueryString`].

mod params;
mod spec;
mod update;

pub use params::QueryString;
pub use spec::{keys, PageSize, QuerySpec, DATE_FORMAT};
pub use update::QueryUpdate;
