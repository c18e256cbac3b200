//! Debounced search input.
//!
//! Keystrokes update the local text right away. The committed search, which
//! is what triggers a fetch, is emitted on the channel returned by
//! [`DebouncedSearch::new`] once typing pauses, or immediately on
//! [`commit`](DebouncedSearch::commit) and [`clear`](DebouncedSearch::clear).

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::trace;

/// Default quiet period before a search is committed.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// A search box with a single cancellable debounce timer.
///
/// The timer task is aborted whenever a newer keystroke, commit or clear
/// supersedes it, and when the input is dropped.
#[derive(Debug)]
pub struct DebouncedSearch {
    text: String,
    delay: Duration,
    pending: Option<JoinHandle<()>>,
    tx: mpsc::UnboundedSender<String>,
}

impl DebouncedSearch {
    /// Create an input showing `initial`, returning the receiver of committed
    /// search values.
    #[must_use]
    pub fn new(delay: Duration, initial: impl Into<String>) -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let input = Self {
            text: initial.into(),
            delay,
            pending: None,
            tx,
        };
        (input, rx)
    }

    /// The text currently shown in the input.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The configured quiet period.
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Whether a debounced commit is scheduled.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Replace the input text and restart the debounce timer.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn input(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.cancel();

        let tx = self.tx.clone();
        let delay = self.delay;
        let value = self.text.clone();
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            trace!(search = %value, "Debounce elapsed, committing search");
            let _ = tx.send(value);
        }));
    }

    /// Append one typed character.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn push(&mut self, c: char) {
        let mut text = std::mem::take(&mut self.text);
        text.push(c);
        self.input(text);
    }

    /// Remove the last character.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn backspace(&mut self) {
        let mut text = std::mem::take(&mut self.text);
        text.pop();
        self.input(text);
    }

    /// Commit the current text now (submit key).
    pub fn commit(&mut self) {
        self.cancel();
        trace!(search = %self.text, "Search committed");
        let _ = self.tx.send(self.text.clone());
    }

    /// Empty the input and commit the empty search now.
    pub fn clear(&mut self) {
        self.text.clear();
        self.commit();
    }

    /// Show `committed` without emitting, e.g. after the URL changed from
    /// somewhere else. Any pending commit is dropped.
    pub fn sync(&mut self, committed: &str) {
        self.cancel();
        if self.text != committed {
            self.text = committed.to_string();
        }
    }

    fn cancel(&mut self) {
        if let Some(task) = self.pending.take() {
            task.abort();
        }
    }
}

impl Drop for DebouncedSearch {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::error::TryRecvError;
    use tokio::time::sleep;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[tokio::test(start_paused = true)]
    async fn test_typing_commits_once_after_pause() {
        let (mut input, mut rx) = DebouncedSearch::new(DEFAULT_DEBOUNCE, "");

        input.push('a');
        sleep(ms(100)).await;
        input.push('b');
        sleep(ms(100)).await;
        input.push('c');
        assert_eq!(input.text(), "abc");
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));

        assert_eq!(rx.recv().await.as_deref(), Some("abc"));

        sleep(ms(1_000)).await;
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_commit_before_quiet_period() {
        let (mut input, mut rx) = DebouncedSearch::new(DEFAULT_DEBOUNCE, "");
        input.push('a');
        sleep(ms(299)).await;
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
        assert!(input.is_pending());
        sleep(ms(2)).await;
        assert_eq!(rx.try_recv().ok().as_deref(), Some("a"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_commit_key_is_immediate() {
        let (mut input, mut rx) = DebouncedSearch::new(DEFAULT_DEBOUNCE, "");
        input.push('a');
        input.commit();
        assert_eq!(rx.try_recv().ok().as_deref(), Some("a"));
        assert!(!input.is_pending());

        sleep(ms(1_000)).await;
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_is_immediate_and_cancels() {
        let (mut input, mut rx) = DebouncedSearch::new(DEFAULT_DEBOUNCE, "foo");
        input.push('d');
        input.clear();
        assert_eq!(input.text(), "");
        assert_eq!(rx.try_recv().ok().as_deref(), Some(""));

        sleep(ms(1_000)).await;
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sync_does_not_emit() {
        let (mut input, mut rx) = DebouncedSearch::new(DEFAULT_DEBOUNCE, "");
        input.push('x');
        input.sync("from-url");
        assert_eq!(input.text(), "from-url");

        sleep(ms(1_000)).await;
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_pending_timer() {
        let (mut input, mut rx) = DebouncedSearch::new(DEFAULT_DEBOUNCE, "");
        input.push('a');
        drop(input);

        sleep(ms(1_000)).await;
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Disconnected)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_backspace_restarts_timer() {
        let (mut input, mut rx) = DebouncedSearch::new(ms(50), "ab");
        input.backspace();
        assert_eq!(input.text(), "a");
        assert_eq!(rx.recv().await.as_deref(), Some("a"));
    }
}
