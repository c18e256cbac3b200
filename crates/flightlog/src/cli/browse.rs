//! Interactive list browsing.
//!
//! Reads one command per line and drives a [`ListViewController`]: search
//! text goes through a [`DebouncedSearch`], everything else is encoded into
//! the URL store, and every fetch result is printed as it arrives.

use std::io::Write;
use std::str::FromStr;
use std::time::Duration;

use chrono::NaiveDate;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::debug;
use url::Url;

use super::output::{chips_line, log_table};
use crate::controller::{FetchState, ListViewController, LogSource};
use crate::error::Result;
use crate::model::DroneModel;
use crate::query::{PageSize, QueryUpdate, DATE_FORMAT};
use crate::search::DebouncedSearch;
use crate::share::{copy_with_fallback, share_url, ClipboardSink, CopyOutcome};
use crate::store::UrlStore;

const HELP: &str = "\
Commands:
  type TEXT        type into the search box (committed after a pause)
  back             delete the last search character
  enter            commit the search now
  clear            clear the search
  pilot [NAME]     filter by pilot (no name to remove)
  model [A,B]      filter by drone models: XLT, S1, CX10
  tag [a,b]        filter by tags (all must match)
  from [DATE]      flights on or after YYYY-MM-DD
  to [DATE]        flights on or before YYYY-MM-DD
  rm N             remove filter chip N
  reset            clear search and all filters
  page N | next | prev
  per-page 25|50|100
  reload           fetch the current page again
  share            copy a link to this view
  quit";

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseCommand {
    Type(String),
    Backspace,
    Enter,
    ClearSearch,
    Pilot(Option<String>),
    Models(Vec<DroneModel>),
    Tags(Vec<String>),
    From(Option<NaiveDate>),
    To(Option<NaiveDate>),
    Remove(usize),
    Reset,
    Page(u32),
    Next,
    Prev,
    PerPage(PageSize),
    Reload,
    Share,
    Help,
    Quit,
}

impl FromStr for BrowseCommand {
    type Err = String;

    fn from_str(line: &str) -> std::result::Result<Self, Self::Err> {
        let line = line.trim_start();
        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let arg = rest.trim();

        let command = match word.to_ascii_lowercase().as_str() {
            "type" if !rest.is_empty() => Self::Type(rest.trim_end_matches(['\r', '\n']).to_string()),
            "type" => return Err("type what?".to_string()),
            "back" | "backspace" => Self::Backspace,
            "enter" => Self::Enter,
            "clear" => Self::ClearSearch,
            "pilot" => Self::Pilot((!arg.is_empty()).then(|| arg.to_string())),
            "model" | "models" => Self::Models(
                list(arg)
                    .map(|token| token.parse::<DroneModel>().map_err(|e| e.to_string()))
                    .collect::<std::result::Result<_, _>>()?,
            ),
            "tag" | "tags" => Self::Tags(list(arg).map(str::to_string).collect()),
            "from" => Self::From(optional_date(arg)?),
            "to" => Self::To(optional_date(arg)?),
            "rm" | "remove" => Self::Remove(number(arg)?),
            "reset" => Self::Reset,
            "page" => Self::Page(number(arg)?),
            "next" | "n" => Self::Next,
            "prev" | "p" => Self::Prev,
            "per-page" => Self::PerPage(PageSize::try_from(number::<u32>(arg)?)?),
            "reload" | "r" => Self::Reload,
            "share" => Self::Share,
            "help" | "?" => Self::Help,
            "quit" | "q" | "exit" => Self::Quit,
            "" => return Err(String::new()),
            other => return Err(format!("unknown command '{other}', type 'help' for commands")),
        };
        Ok(command)
    }
}

fn list(arg: &str) -> impl Iterator<Item = &str> {
    arg.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn optional_date(arg: &str) -> std::result::Result<Option<NaiveDate>, String> {
    if arg.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(arg, DATE_FORMAT)
        .map(Some)
        .map_err(|_| format!("'{arg}' is not a YYYY-MM-DD date"))
}

fn number<T: FromStr>(arg: &str) -> std::result::Result<T, String> {
    arg.parse().map_err(|_| format!("'{arg}' is not a number"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// An interactive browsing session writing to `out`.
#[derive(Debug)]
pub struct BrowseSession<S, C, W> {
    controller: ListViewController<S, C>,
    search: DebouncedSearch,
    committed: mpsc::UnboundedReceiver<String>,
    last_search: String,
    web_url: Url,
    out: W,
}

impl<S, C, W> BrowseSession<S, C, W>
where
    S: UrlStore + 'static,
    C: LogSource,
    W: Write,
{
    /// Create a session over `controller`. The search box starts with the
    /// search text currently in the URL.
    #[must_use]
    pub fn new(controller: ListViewController<S, C>, debounce: Duration, web_url: Url, out: W) -> Self {
        let last_search = controller.spec().search;
        let (search, committed) = DebouncedSearch::new(debounce, last_search.clone());
        Self {
            controller,
            search,
            committed,
            last_search,
            web_url,
            out,
        }
    }

    /// Run until `quit` or end of input, returning the output sink.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input or writing output fails.
    pub async fn run<R>(mut self, input: R, clipboard: &dyn ClipboardSink) -> Result<W>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut states = self.controller.subscribe();
        let worker = self.controller.run();
        let mut lines = input.lines();

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    if self.handle_line(&line, clipboard)? == Flow::Quit {
                        break;
                    }
                }
                Some(text) = self.committed.recv() => {
                    debug!(search = %text, "Search committed");
                    self.controller.set_search(text);
                    self.last_search = self.controller.spec().search;
                }
                Ok(()) = states.changed() => {
                    let state = states.borrow_and_update().clone();
                    self.render(&state)?;
                }
            }
        }

        worker.abort();
        Ok(self.out)
    }

    fn handle_line(&mut self, line: &str, clipboard: &dyn ClipboardSink) -> Result<Flow> {
        let command = match line.parse::<BrowseCommand>() {
            Ok(command) => command,
            Err(message) if message.is_empty() => return Ok(Flow::Continue),
            Err(message) => {
                writeln!(self.out, "{message}")?;
                return Ok(Flow::Continue);
            }
        };

        match command {
            BrowseCommand::Type(text) => text.chars().for_each(|c| self.search.push(c)),
            BrowseCommand::Backspace => self.search.backspace(),
            BrowseCommand::Enter => self.search.commit(),
            BrowseCommand::ClearSearch => self.search.clear(),
            BrowseCommand::Pilot(name) => self.controller.update(&QueryUpdate::pilot(name)),
            BrowseCommand::Models(models) => self.controller.update(&QueryUpdate::drone_models(models)),
            BrowseCommand::Tags(tags) => self.controller.update(&QueryUpdate::tags(tags)),
            BrowseCommand::From(from) => self.controller.update(&QueryUpdate {
                date_from: Some(from),
                ..QueryUpdate::default()
            }),
            BrowseCommand::To(to) => self.controller.update(&QueryUpdate {
                date_to: Some(to),
                ..QueryUpdate::default()
            }),
            BrowseCommand::Remove(n) => {
                let chips = self.controller.chips();
                match n.checked_sub(1).and_then(|i| chips.get(i)) {
                    Some(chip) => self.controller.remove_filter(&chip.filter),
                    None => writeln!(self.out, "No filter #{n}")?,
                }
            }
            BrowseCommand::Reset => self.controller.clear_filters(),
            BrowseCommand::Page(page) => self.controller.set_page(page.max(1)),
            BrowseCommand::Next => {
                let spec = self.controller.spec();
                let last = self.controller.fetch_state().page().map(|p| p.total_pages);
                match spec.page.checked_add(1) {
                    Some(next) if !last.is_some_and(|last| spec.page >= last) => {
                        self.controller.set_page(next);
                    }
                    _ => writeln!(self.out, "Already on the last page")?,
                }
            }
            BrowseCommand::Prev => {
                let page = self.controller.spec().page;
                if page <= 1 {
                    writeln!(self.out, "Already on the first page")?;
                } else {
                    self.controller.set_page(page - 1);
                }
            }
            BrowseCommand::PerPage(size) => self.controller.set_page_size(size),
            BrowseCommand::Reload => {
                self.controller.reload();
            }
            BrowseCommand::Share => self.share(clipboard)?,
            BrowseCommand::Help => writeln!(self.out, "{HELP}")?,
            BrowseCommand::Quit => return Ok(Flow::Quit),
        }

        self.sync_search();
        Ok(Flow::Continue)
    }

    /// Keep the search box in line with the URL when something other than
    /// typing changed the committed search.
    fn sync_search(&mut self) {
        let committed = self.controller.spec().search;
        if committed != self.last_search {
            self.search.sync(&committed);
            self.last_search = committed;
        }
    }

    fn share(&mut self, clipboard: &dyn ClipboardSink) -> Result<()> {
        let link = share_url(&self.web_url, &self.controller.store().get());
        let out = &mut self.out;
        let outcome = copy_with_fallback(clipboard, link.as_str(), |text| {
            let _ = writeln!(out, "Clipboard unavailable, copy this link:\n{text}");
        });
        if outcome == CopyOutcome::Copied {
            writeln!(self.out, "Copied {link}")?;
        }
        Ok(())
    }

    fn render(&mut self, state: &FetchState) -> Result<()> {
        match state {
            FetchState::Idle => {}
            FetchState::Loading => writeln!(self.out, "Loading...")?,
            FetchState::Loaded(page) => {
                let spec = self.controller.spec();
                if !spec.search.is_empty() {
                    writeln!(self.out, "Search: {}", spec.search)?;
                }
                if let Some(chips) = chips_line(&self.controller.chips()) {
                    writeln!(self.out, "Filters: {chips}")?;
                }
                write!(self.out, "{}", log_table(page))?;
            }
            FetchState::Failed(message) => writeln!(self.out, "{message}")?,
        }
        self.out.flush()?;
        Ok(())
    }
}
