//! Command-line interface for flightlog.
//!
//! This module provides the CLI structure for the `flightlog` binary.

pub mod browse;
mod commands;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use browse::{BrowseCommand, BrowseSession};
pub use commands::{
    ConfigCommand, DroneModelArg, EditCommand, ListCommand, OutputFormat, QueryArgs, ShowCommand,
    UploadCommand,
};

use crate::logging::Verbosity;

/// flightlog - Browse and manage drone flight logs
///
/// Talks to a flight log backend. The list view state (search, filters and
/// pagination) is a URL query string, so every listing can be shared as a
/// link and reopened with `--query`.
#[derive(Debug, Parser)]
#[command(name = "flightlog")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Backend base URL, overriding the configuration
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List flight logs
    List(ListCommand),

    /// Show one flight log
    Show(ShowCommand),

    /// Edit the metadata of a flight log
    Edit(EditCommand),

    /// Delete a flight log
    Delete {
        /// Flight log ID
        id: String,
    },

    /// Download the .ulg file of a flight log
    Download {
        /// Flight log ID
        id: String,

        /// Output path (defaults to the original file name)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Upload a new .ulg flight log
    Upload(UploadCommand),

    /// Attach files to a flight log
    Attach {
        /// Flight log ID
        id: String,

        /// Files to attach
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Remove an attachment from a flight log
    Detach {
        /// Flight log ID
        id: String,

        /// Attachment ID
        attachment_id: String,
    },

    /// Download one attachment of a flight log
    DownloadAttachment {
        /// Flight log ID
        id: String,

        /// Attachment ID
        attachment_id: String,

        /// Output path (defaults to the attachment's file name)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List known pilots
    Pilots,

    /// List tags
    Tags {
        /// Only tags containing this text
        search: Option<String>,
    },

    /// Create a tag
    CreateTag {
        /// Tag name (stored in lower case)
        name: String,
    },

    /// Check that the backend is reachable
    Health,

    /// Show fleet statistics
    Stats {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Print a shareable link to a list view and copy it to the clipboard
    Share {
        #[command(flatten)]
        query: QueryArgs,

        /// Only print the link
        #[arg(long)]
        no_copy: bool,
    },

    /// Browse the list interactively
    Browse {
        #[command(flatten)]
        query: QueryArgs,
    },

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.verbose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args.iter().copied()).unwrap()
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_name() {
        assert_eq!(Cli::command().get_name(), "flightlog");
    }

    #[test]
    fn test_verbosity_flags() {
        assert_eq!(parse(&["flightlog", "pilots"]).verbosity(), Verbosity::Normal);
        assert_eq!(parse(&["flightlog", "-v", "pilots"]).verbosity(), Verbosity::Verbose);
        assert_eq!(parse(&["flightlog", "-vv", "pilots"]).verbosity(), Verbosity::Trace);
        assert_eq!(parse(&["flightlog", "-q", "-v", "pilots"]).verbosity(), Verbosity::Quiet);
    }

    #[test]
    fn test_parse_with_config() {
        let cli = parse(&["flightlog", "-c", "/custom/config.toml", "stats"]);
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_parse_list_filters() {
        let cli = parse(&[
            "flightlog", "list", "--search", "survey", "-m", "xlt", "-m", "cx10", "--tag", "night",
            "--from", "2024-01-01", "--per-page", "50",
        ]);
        let Command::List(cmd) = cli.command else {
            panic!("expected list command");
        };
        assert_eq!(
            cmd.query.to_query().to_string(),
            "date_from=2024-01-01&drone_model=XLT%2CCX10&per_page=50&search=survey&tags=night"
        );
        assert_eq!(cmd.format, OutputFormat::Table);
    }

    #[test]
    fn test_parse_list_rejects_bad_page_size() {
        assert!(Cli::try_parse_from(["flightlog", "list", "--per-page", "30"]).is_err());
    }

    #[test]
    fn test_parse_list_rejects_bad_date() {
        assert!(Cli::try_parse_from(["flightlog", "list", "--from", "yesterday"]).is_err());
    }

    #[test]
    fn test_parse_share_with_query() {
        let cli = parse(&["flightlog", "share", "--query", "search=foo&page=3", "--no-copy"]);
        let Command::Share { query, no_copy } = cli.command else {
            panic!("expected share command");
        };
        assert!(no_copy);
        assert_eq!(query.to_query().to_string(), "page=3&search=foo");
    }

    #[test]
    fn test_parse_upload() {
        let cli = parse(&[
            "flightlog", "upload", "flight.ulg", "-p", "Alex", "-m", "s1", "-t", "night,survey",
        ]);
        let Command::Upload(cmd) = cli.command else {
            panic!("expected upload command");
        };
        assert_eq!(cmd.model, DroneModelArg::S1);
        assert_eq!(cmd.tags, vec!["night", "survey"]);
        assert!(cmd.title.is_none());
    }

    #[test]
    fn test_parse_attach_requires_files() {
        assert!(Cli::try_parse_from(["flightlog", "attach", "abc"]).is_err());
    }

    #[test]
    fn test_parse_download_attachment() {
        let cli = parse(&["flightlog", "download-attachment", "0b6c", "a1", "-o", "notes.pdf"]);
        let Command::DownloadAttachment {
            id,
            attachment_id,
            output,
        } = cli.command
        else {
            panic!("expected download-attachment command");
        };
        assert_eq!((id.as_str(), attachment_id.as_str()), ("0b6c", "a1"));
        assert_eq!(output, Some(PathBuf::from("notes.pdf")));
    }

    #[test]
    fn test_parse_create_tag() {
        let cli = parse(&["flightlog", "create-tag", "night"]);
        assert!(matches!(cli.command, Command::CreateTag { name } if name == "night"));
    }

    #[test]
    fn test_config_commands_needing_config() {
        let needs = |args: &[&str]| {
            let Command::Config(cmd) = parse(args).command else {
                panic!("expected config command");
            };
            cmd.needs_config()
        };
        assert!(needs(&["flightlog", "config", "show"]));
        assert!(!needs(&["flightlog", "config", "path"]));
        assert!(!needs(&["flightlog", "config", "validate", "-f", "other.toml"]));
    }

    #[test]
    fn test_parse_config_show() {
        let cli = parse(&["flightlog", "config", "show", "--json"]);
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Show { json: true })
        ));
    }
}
