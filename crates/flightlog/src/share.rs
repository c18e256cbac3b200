//! Shareable links to the list view.
//!
//! The URL query string is the whole list state, so a share link is the web
//! front end's URL with the current query attached.

use clipboard_rs::{Clipboard, ClipboardContext};
use tracing::{debug, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::query::QueryString;

/// The link that reproduces `params` in the web front end.
///
/// An empty query leaves no trailing `?`.
#[must_use]
pub fn share_url(base: &Url, params: &QueryString) -> Url {
    let mut url = base.clone();
    url.set_fragment(None);
    if params.is_empty() {
        url.set_query(None);
    } else {
        url.set_query(Some(&params.to_string()));
    }
    url
}

/// Somewhere text can be copied to.
pub trait ClipboardSink {
    /// Replace the clipboard contents with `text`.
    ///
    /// # Errors
    ///
    /// Returns an error if the clipboard cannot be written.
    fn copy(&self, text: &str) -> Result<()>;
}

/// The system clipboard.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl ClipboardSink for SystemClipboard {
    fn copy(&self, text: &str) -> Result<()> {
        let ctx = ClipboardContext::new().map_err(|e| Error::clipboard(e.to_string()))?;
        ctx.set_text(text.to_string())
            .map_err(|e| Error::clipboard(e.to_string()))
    }
}

/// How a link was handed to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    /// The link is on the clipboard.
    Copied,
    /// The clipboard was unavailable and the link was shown instead.
    Fallback,
}

/// Copy `text` to `sink`, handing it to `fallback` if that fails.
#[must_use]
pub fn copy_with_fallback<S, F>(sink: &S, text: &str, fallback: F) -> CopyOutcome
where
    S: ClipboardSink + ?Sized,
    F: FnOnce(&str),
{
    match sink.copy(text) {
        Ok(()) => {
            debug!(len = text.len(), "Copied share link to clipboard");
            CopyOutcome::Copied
        }
        Err(e) => {
            warn!(error = %e, "Clipboard unavailable, showing link instead");
            fallback(text);
            CopyOutcome::Fallback
        }
    }
}
