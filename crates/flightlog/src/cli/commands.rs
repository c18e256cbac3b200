//! CLI command definitions.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Subcommand, ValueEnum};

use crate::model::{DroneModel, FlightLogUpdate};
use crate::query::{PageSize, QueryString, QueryUpdate};

/// List-view state given on the command line.
///
/// `--query` seeds the state from a raw query string (e.g. one copied from a
/// share link); the individual flags are then applied on top of it.
#[derive(Debug, Default, Args)]
pub struct QueryArgs {
    /// Raw query string to start from
    #[arg(long, value_name = "QS")]
    pub query: Option<String>,

    /// Free-text search in title, pilot, serial number and comment
    #[arg(short, long)]
    pub search: Option<String>,

    /// Only flights on or after this date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub from: Option<NaiveDate>,

    /// Only flights on or before this date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub to: Option<NaiveDate>,

    /// Drone model (repeatable)
    #[arg(short, long = "model", value_enum)]
    pub models: Vec<DroneModelArg>,

    /// Exact pilot name
    #[arg(short, long)]
    pub pilot: Option<String>,

    /// Tag the flight must carry (repeatable, all must match)
    #[arg(short, long = "tag")]
    pub tags: Vec<String>,

    /// Page number, starting at 1
    #[arg(long)]
    pub page: Option<u32>,

    /// Items per page (25, 50 or 100)
    #[arg(long, value_parser = parse_page_size)]
    pub per_page: Option<PageSize>,
}

impl QueryArgs {
    /// The update the flags describe. Flags that were not given leave their
    /// dimension untouched.
    #[must_use]
    pub fn update(&self) -> QueryUpdate {
        QueryUpdate {
            search: self.search.clone(),
            date_from: self.from.map(Some),
            date_to: self.to.map(Some),
            drone_models: (!self.models.is_empty())
                .then(|| self.models.iter().copied().map(DroneModel::from).collect()),
            pilot: self.pilot.clone().map(Some),
            tags: (!self.tags.is_empty()).then(|| self.tags.clone()),
            page: self.page,
            page_size: self.per_page,
        }
    }

    /// The URL state: `--query` with the flags applied.
    #[must_use]
    pub fn to_query(&self) -> QueryString {
        let base = self.query.as_deref().map(QueryString::parse).unwrap_or_default();
        self.update().apply(&base)
    }
}

fn parse_page_size(raw: &str) -> Result<PageSize, String> {
    let value: u32 = raw.parse().map_err(|_| format!("'{raw}' is not a number"))?;
    PageSize::try_from(value)
}

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    #[command(flatten)]
    pub query: QueryArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Show command arguments.
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Flight log ID
    pub id: String,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Edit command arguments.
#[derive(Debug, Args)]
pub struct EditCommand {
    /// Flight log ID
    pub id: String,

    /// New title
    #[arg(long)]
    pub title: Option<String>,

    /// New pilot name
    #[arg(long)]
    pub pilot: Option<String>,

    /// New drone model
    #[arg(long, value_enum)]
    pub model: Option<DroneModelArg>,

    /// New comment
    #[arg(long)]
    pub comment: Option<String>,

    /// Replace the tags (comma-separated, empty to remove all)
    #[arg(long, value_delimiter = ',')]
    pub tags: Option<Vec<String>>,
}

impl EditCommand {
    /// The fields to send to the backend.
    #[must_use]
    pub fn to_update(&self) -> FlightLogUpdate {
        FlightLogUpdate {
            title: self.title.clone(),
            pilot: self.pilot.clone(),
            drone_model: self.model.map(DroneModel::from),
            comment: self.comment.clone(),
            tags: self.tags.as_ref().map(|tags| {
                tags.iter()
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty())
                    .collect()
            }),
        }
    }
}

/// Upload command arguments.
#[derive(Debug, Args)]
pub struct UploadCommand {
    /// Path to the .ulg log file
    pub file: PathBuf,

    /// Flight title (defaults to the file name)
    #[arg(long)]
    pub title: Option<String>,

    /// Pilot name
    #[arg(short, long)]
    pub pilot: String,

    /// Drone model
    #[arg(short, long, value_enum)]
    pub model: DroneModelArg,

    /// Drone serial number
    #[arg(long)]
    pub serial_number: Option<String>,

    /// Free-form comment
    #[arg(long)]
    pub comment: Option<String>,

    /// Tags (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    pub tags: Vec<String>,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

impl ConfigCommand {
    /// Whether this command reads the loaded configuration. `path` and
    /// `validate` run even when the configuration does not load.
    #[must_use]
    pub fn needs_config(&self) -> bool {
        matches!(self, Self::Show { .. })
    }
}

/// Drone model argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DroneModelArg {
    /// XLT
    Xlt,
    /// S1
    S1,
    /// CX10
    Cx10,
}

impl From<DroneModelArg> for DroneModel {
    fn from(arg: DroneModelArg) -> Self {
        match arg {
            DroneModelArg::Xlt => Self::Xlt,
            DroneModelArg::S1 => Self::S1,
            DroneModelArg::Cx10 => Self::Cx10,
        }
    }
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// Formatted table
    Table,
    /// JSON output
    Json,
}
