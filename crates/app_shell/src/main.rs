use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use config::{AppConfig, ConfigStore};
use core_view_model::NotesViewModel;
use gateway_http::HttpNotesGateway;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod command;
mod render;

use command::{Command, HELP};

#[derive(Debug, Parser)]
#[command(version, about = "Terminal client for a notes service")]
struct Cli {
    /// Backend base URL. Takes precedence over JOTTER_API_URL and the config file.
    #[arg(long)]
    base_url: Option<String>,

    /// Directory holding config.json.
    #[arg(long)]
    config_dir: Option<PathBuf>,

    #[arg(long)]
    log_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut data_dir = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    data_dir.push("jotter");

    let config_store = match &cli.config_dir {
        Some(dir) => ConfigStore::from_dir(dir.clone()),
        None => ConfigStore::from_default_location()?,
    };
    let (mut config, config_error) = match config_store.load_or_init() {
        Ok(cfg) => (cfg, None),
        Err(err) => (AppConfig::default(), Some(err)),
    };

    let log_dir = cli.log_dir.unwrap_or_else(|| data_dir.join("logs"));
    let _log_guard = init_local_logger(&log_dir, &config.log_filter);
    if let Some(err) = config_error {
        error!(
            "failed to load config from {}: {err:#}",
            config_store.path().display()
        );
    }

    config.apply_env_overrides(|key| std::env::var(key).ok());
    let config = config.with_base_url(cli.base_url);
    info!(base_url = %config.api.base_url, "starting notes client");

    let gateway = HttpNotesGateway::new(&config.api.base_url)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;
    runtime.block_on(run(gateway))
}

async fn run(gateway: HttpNotesGateway) -> Result<()> {
    println!("notes at {}", gateway.base_url());
    let view_model = NotesViewModel::attach(Arc::new(gateway)).await;
    print!("{}", render::page(&view_model.snapshot()));
    prompt()?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        if line.trim().is_empty() {
            prompt()?;
            continue;
        }
        match Command::parse(&line) {
            Ok(Command::Quit) => break,
            Ok(command) => execute(&view_model, command).await,
            Err(err) => println!("{err}"),
        }
        prompt()?;
    }

    info!("notes client exiting");
    Ok(())
}

/// Runs one command against the view-model and prints what changed. Failures land in the
/// view-model's error slot and show up with the form.
async fn execute(view_model: &NotesViewModel, command: Command) {
    match command {
        Command::Help => {
            println!("{HELP}");
            return;
        }
        Command::List => {
            print!("{}", render::list(&view_model.snapshot()));
            return;
        }
        Command::Show => {
            print!("{}", render::form(&view_model.snapshot()));
            return;
        }
        Command::Reload => {
            if let Ok(count) = view_model.load().await {
                println!("loaded {count} notes");
            }
        }
        Command::New => view_model.start_create(),
        Command::Edit(id) => {
            let snapshot = view_model.snapshot();
            match snapshot.find(&id) {
                Some(note) => view_model.start_edit(note),
                None => {
                    println!("no note with id `{id}`");
                    return;
                }
            }
        }
        Command::Title(title) => {
            view_model.set_title(title);
            print!("{}", render::form(&view_model.snapshot()));
            return;
        }
        Command::Content(content) => {
            view_model.set_content(content);
            print!("{}", render::form(&view_model.snapshot()));
            return;
        }
        Command::Save => {
            if let Ok(note) = view_model.save().await {
                println!("saved {}", note.id);
            }
        }
        Command::Delete(id) => {
            if view_model.delete(&id).await.is_ok() {
                println!("deleted {id}");
            }
        }
        Command::Quit => return,
    }
    print!("{}", render::page(&view_model.snapshot()));
}

fn prompt() -> Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(b"> ")?;
    stdout.flush()?;
    Ok(())
}

fn init_local_logger(
    log_dir: &Path,
    default_filter: &str,
) -> tracing_appender::non_blocking::WorkerGuard {
    if let Err(err) = fs::create_dir_all(log_dir) {
        eprintln!("failed to create log dir `{}`: {err}", log_dir.display());
    }
    let file_appender = tracing_appender::rolling::daily(log_dir, "jotter.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .json()
        .with_writer(writer)
        .init();

    guard
}
