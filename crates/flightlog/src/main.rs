//! `flightlog` - CLI for the flight log backend
//!
//! This binary lists, inspects and manages drone flight logs, and offers an
//! interactive list view whose state is shareable as a link.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::BufReader;
use tracing::debug;

use flightlog::cli::output::{attachment_line, chips_line, log_detail, log_plain, log_table, stats_text};
use flightlog::cli::{
    BrowseSession, Cli, Command, ConfigCommand, EditCommand, ListCommand, OutputFormat, QueryArgs,
    ShowCommand, UploadCommand,
};
use flightlog::model::NewFlightLog;
use flightlog::query::QuerySpec;
use flightlog::share::{copy_with_fallback, share_url, CopyOutcome, SystemClipboard};
use flightlog::{active_filters, init_logging, ApiClient, Config, Error, ListViewController, MemoryUrlStore};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            debug!(error = ?err, "Command failed");
            match err.downcast_ref::<Error>() {
                Some(e) => eprintln!("Error: {}", e.user_message()),
                None => eprintln!("Error: {err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    if let Command::Config(cmd) = &cli.command {
        if !cmd.needs_config() {
            handle_config_file(cmd, cli.config.as_deref());
            return Ok(());
        }
    }

    let mut config = Config::load_from(cli.config.clone())?;
    if let Some(url) = cli.api_url {
        config.api.base_url = url;
        config.validate()?;
    }

    let api = ApiClient::from_config(&config)?;
    match cli.command {
        Command::List(cmd) => handle_list(&api, &cmd).await,
        Command::Show(cmd) => handle_show(&api, &cmd).await,
        Command::Edit(cmd) => handle_edit(&api, &cmd).await,
        Command::Delete { id } => {
            let response = api.delete_log(&id).await?;
            println!("{}", response.message);
            Ok(())
        }
        Command::Download { id, output } => handle_download(&api, &id, output).await,
        Command::Upload(cmd) => handle_upload(&api, cmd).await,
        Command::Attach { id, files } => {
            for attachment in api.upload_attachments(&id, &files).await? {
                println!("{}", attachment_line(&attachment));
            }
            Ok(())
        }
        Command::Detach { id, attachment_id } => {
            api.delete_attachment(&id, &attachment_id).await?;
            println!("Attachment {attachment_id} removed.");
            Ok(())
        }
        Command::DownloadAttachment {
            id,
            attachment_id,
            output,
        } => handle_download_attachment(&api, &id, &attachment_id, output).await,
        Command::Pilots => {
            for pilot in api.list_pilots().await? {
                println!("{pilot}");
            }
            Ok(())
        }
        Command::Tags { search } => {
            for tag in api.list_tags(search.as_deref()).await? {
                println!("{}", tag.name);
            }
            Ok(())
        }
        Command::CreateTag { name } => {
            let tag = api.create_tag(&name).await?;
            println!("{} (id {})", tag.name, tag.id);
            Ok(())
        }
        Command::Health => {
            let status = api.health().await?;
            println!("{}: {status}", api.base_url());
            Ok(())
        }
        Command::Stats { json } => {
            let stats = api.stats().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                print!("{}", stats_text(&stats));
            }
            Ok(())
        }
        Command::Share { query, no_copy } => handle_share(&config, &query, no_copy),
        Command::Browse { query } => handle_browse(&config, api, &query).await,
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

async fn handle_list(api: &ApiClient, cmd: &ListCommand) -> Result<()> {
    let spec = QuerySpec::parse(&cmd.query.to_query());
    let page = api.list_logs(&spec).await?;

    match cmd.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&page)?),
        OutputFormat::Plain => print!("{}", log_plain(&page)),
        OutputFormat::Table => {
            let chips: Vec<_> = active_filters(&spec);
            if let Some(line) = chips_line(&chips) {
                println!("Filters: {line}\n");
            }
            print!("{}", log_table(&page));
        }
    }
    Ok(())
}

async fn handle_show(api: &ApiClient, cmd: &ShowCommand) -> Result<()> {
    let log = api.get_log(&cmd.id).await?;
    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&log)?);
    } else {
        print!("{}", log_detail(&log));
    }
    Ok(())
}

async fn handle_edit(api: &ApiClient, cmd: &EditCommand) -> Result<()> {
    let log = api.update_log(&cmd.id, &cmd.to_update()).await?;
    print!("{}", log_detail(&log));
    Ok(())
}

async fn handle_download(api: &ApiClient, id: &str, output: Option<PathBuf>) -> Result<()> {
    let dest = match output {
        Some(path) => path,
        None => PathBuf::from(api.get_log(id).await?.download_name()),
    };
    let bytes = api.download_log(id, &dest).await?;
    println!("Saved {} ({bytes} bytes)", dest.display());
    Ok(())
}

async fn handle_download_attachment(
    api: &ApiClient,
    id: &str,
    attachment_id: &str,
    output: Option<PathBuf>,
) -> Result<()> {
    let dest = match output {
        Some(path) => path,
        None => {
            let log = api.get_log(id).await?;
            let attachment = log
                .attachments
                .iter()
                .find(|a| a.id == attachment_id)
                .ok_or_else(|| Error::NotFound {
                    resource: "attachment",
                    id: attachment_id.to_string(),
                })?;
            PathBuf::from(attachment.download_name())
        }
    };
    let bytes = api.download_attachment(id, attachment_id, &dest).await?;
    println!("Saved {} ({bytes} bytes)", dest.display());
    Ok(())
}

async fn handle_upload(api: &ApiClient, cmd: UploadCommand) -> Result<()> {
    let title = match cmd.title {
        Some(title) => title,
        None => default_title(&cmd.file)?,
    };
    let log = NewFlightLog {
        title,
        pilot: cmd.pilot,
        drone_model: cmd.model.into(),
        serial_number: cmd.serial_number,
        comment: cmd.comment,
        tags: cmd.tags,
    };
    let created = api
        .upload_log(&cmd.file, &log)
        .await
        .with_context(|| format!("uploading {}", cmd.file.display()))?;
    println!("Uploaded {} as {}", created.title, created.id);
    Ok(())
}

fn default_title(file: &Path) -> Result<String> {
    file.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .ok_or_else(|| Error::invalid_input("Cannot derive a title from the file name; pass --title.").into())
}

fn handle_share(config: &Config, query: &QueryArgs, no_copy: bool) -> Result<()> {
    let link = share_url(&config.web_url()?, &query.to_query());
    if no_copy {
        println!("{link}");
        return Ok(());
    }
    let outcome = copy_with_fallback(&SystemClipboard, link.as_str(), |text| {
        println!("Clipboard unavailable, copy this link:");
        println!("{text}");
    });
    if outcome == CopyOutcome::Copied {
        println!("Copied {link}");
    }
    Ok(())
}

async fn handle_browse(config: &Config, api: ApiClient, query: &QueryArgs) -> Result<()> {
    let store = Arc::new(MemoryUrlStore::new(query.to_query()));
    let controller = ListViewController::new(store, Arc::new(api));
    println!("Type 'help' for commands.");

    let session = BrowseSession::new(controller, config.debounce(), config.web_url()?, std::io::stdout());
    session
        .run(BufReader::new(tokio::io::stdin()), &SystemClipboard)
        .await?;
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> Result<()> {
    let ConfigCommand::Show { json } = cmd else {
        return Ok(());
    };
    if json {
        println!("{}", serde_json::to_string_pretty(config)?);
    } else {
        println!("Current Configuration");
        println!("=====================");
        println!();
        println!("[API]");
        println!("  Base URL:           {}", config.api.base_url);
        println!("  Timeout (secs):     {}", config.api.timeout_secs);
        println!();
        println!("[Web]");
        println!("  Base URL:           {}", config.web_url()?);
        println!();
        println!("[Search]");
        println!("  Debounce (ms):      {}", config.search.debounce_ms);
    }
    Ok(())
}

/// `config path` and `config validate`, which work without a loadable
/// configuration.
fn handle_config_file(cmd: &ConfigCommand, config_override: Option<&Path>) {
    match cmd {
        ConfigCommand::Path => {
            let path = config_override.map_or_else(Config::default_config_path, Path::to_path_buf);
            println!("{}", path.display());
        }
        ConfigCommand::Validate { file } => {
            let path = file
                .as_deref()
                .or(config_override)
                .map_or_else(Config::default_config_path, Path::to_path_buf);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
        ConfigCommand::Show { .. } => {}
    }
}
