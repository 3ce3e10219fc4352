use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::Config;
use crate::history::{History, HistoryStore, JsonFileStore};
use crate::logging::{LogTarget, init_tracing};
use crate::models::{AnalysisRequest, AnalysisResult, HistoryEntry, model_label};
use crate::relay::native::run_host;
use crate::relay::{Relay, RelayService};
use crate::report::{ScoreBand, Section, format_sections};
use crate::selection::{FixedSelection, PageSelection, SelectionReader};
use crate::tui::{AppOptions, run_interactive};
use crate::utils::sanitize_for_display;

#[derive(Parser)]
#[command(name = "codescope")]
#[command(version)]
#[command(about = "AI-assisted security review of selected code", long_about = None)]
pub struct Cli {
    /// HTML page scanned for the first code block when nothing is selected
    #[arg(long, global = true, value_name = "HTML")]
    pub page: Option<PathBuf>,

    /// Model id for the analysis (overrides the config file)
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Config file (default: <config dir>/codescope/config.toml)
    #[arg(long, global = true, env = "CODESCOPE_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan once and print the report
    Scan {
        /// Read the code from a file instead of stdin or the selection
        #[arg(long)]
        file: Option<PathBuf>,

        /// Print `{"result": ..., "score": ...}` instead of formatted text
        #[arg(long)]
        json: bool,
    },
    /// Show statistics and entries of the scan history
    History {
        /// Remove all history entries
        #[arg(long)]
        clear: bool,
    },
    /// Serve the browser extension over native messaging on stdio
    Relay {
        /// Caller origin appended by the browser
        #[arg(hide = true)]
        origin: Vec<String>,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let log_target = match cli.command {
        None | Some(Commands::Relay { .. }) => LogTarget::FileOnly,
        Some(_) => LogTarget::FileAndStderr,
    };
    if let Err(e) = init_tracing(log_target) {
        // Not fatal: the tool works without a log file
        eprintln!("Warning: logging disabled: {:#}", e);
    }
    debug!(?config, "Configuration loaded");

    let runtime = Runtime::new().context("Failed to start async runtime")?;

    match cli.command {
        Some(Commands::Scan { file, json }) => {
            runtime.block_on(scan(&config, file.as_deref(), json))
        }
        Some(Commands::History { clear }) => {
            if clear {
                clear_history(&config)
            } else {
                show_history(&config)
            }
        }
        Some(Commands::Relay { origin }) => {
            debug!(?origin, "Native messaging host launched");
            runtime.block_on(serve_relay(&config))
        }
        None => interactive(&config, &runtime),
    }
}

/// Config file, then environment, then command-line flags
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::discover(cli.config.as_deref())?;
    config.apply_env();
    if let Some(model) = &cli.model {
        config.model = model.clone();
    }
    if let Some(page) = &cli.page {
        config.page = Some(page.clone());
    }
    config.validate()?;
    Ok(config)
}

fn history_store(config: &Config) -> Result<JsonFileStore> {
    Ok(JsonFileStore::new(config.history_file()?))
}

fn interactive(config: &Config, runtime: &Runtime) -> Result<()> {
    let relay = Relay::new(config)?;
    let handle = {
        let _guard = runtime.enter();
        RelayService::spawn(relay)
    };

    let options =
        AppOptions { model: config.model.clone(), export_dir: config.export_directory() };

    run_interactive(
        Arc::new(handle),
        runtime.handle().clone(),
        SelectionReader::system(config.page.clone()),
        Box::new(history_store(config)?),
        options,
    )
}

/// Source for a headless scan: file, else piped stdin, else the selection
fn scan_source(config: &Config, file: Option<&Path>) -> Result<SelectionReader> {
    let reader = if let Some(path) = file {
        let code = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        SelectionReader::new(FixedSelection(code))
    } else if !io::stdin().is_terminal() {
        let mut code = String::new();
        io::stdin().read_to_string(&mut code).context("Failed to read stdin")?;
        SelectionReader::new(FixedSelection(code))
    } else {
        return Ok(SelectionReader::system(config.page.clone()));
    };

    Ok(match &config.page {
        Some(page) => reader.with_page(PageSelection::new(page)),
        None => reader,
    })
}

async fn scan(config: &Config, file: Option<&Path>, json: bool) -> Result<()> {
    let source_text = scan_source(config, file)?.require_selection()?;
    let relay = Relay::new(config)?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let request = AnalysisRequest::new(source_text.clone()).with_model(config.model.clone());
    let report = relay.analyze(&request, &cancel).await?;
    let result = AnalysisResult::from_report(report);

    record_history(config, source_text, &result)?;

    if json {
        let output = serde_json::json!({
            "result": result.report_text(),
            "score": result.derived_score(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_report(&result, &model_label(&config.model));
    }
    Ok(())
}

fn record_history(config: &Config, source_text: String, result: &AnalysisResult) -> Result<()> {
    let entry = HistoryEntry::now(source_text, result.report_text(), model_label(&config.model));
    history_store(config)?.update(&mut |history| history.record(entry.clone()))?;
    Ok(())
}

fn print_report(result: &AnalysisResult, model: &str) {
    let band = ScoreBand::from_score(result.derived_score());
    println!("Security Score: {}/100 ({})", result.derived_score(), band.label());
    println!("Model: {}", model);

    for section in format_sections(result.report_text()) {
        println!();
        match section {
            Section::Text { content } => println!("{}", sanitize_for_display(&content)),
            Section::Code { language, content } => {
                if let Some(language) = language {
                    println!("  [{}]", language);
                }
                for line in sanitize_for_display(&content).lines() {
                    println!("    {}", line);
                }
            }
        }
    }
}

async fn serve_relay(config: &Config) -> Result<()> {
    let handle = RelayService::spawn(Relay::new(config)?);
    let cancel = CancellationToken::new();
    let mut stdin = tokio::io::stdin();
    let mut stdout = tokio::io::stdout();

    run_host(&handle, &mut stdin, &mut stdout, &cancel).await.context("Native messaging failed")?;
    cancel.cancel();
    Ok(())
}

fn show_history(config: &Config) -> Result<()> {
    let store = history_store(config)?;
    let history = History::from_entries(store.load()?);

    println!("CodeScope Scan History");
    println!("======================");
    println!("Entries: {}", history.len());
    println!("History file: {}", store.path().display());

    if history.is_empty() {
        return Ok(());
    }

    let average = history.entries().iter().map(|e| u32::from(e.derived_score())).sum::<u32>()
        / history.len() as u32;
    println!("Average score: {}", average);
    if let Some(newest) = history.entries().first() {
        println!("Newest entry: {}", newest.timestamp().format("%Y-%m-%d %H:%M:%S"));
    }
    if let Some(oldest) = history.entries().last() {
        println!("Oldest entry: {}", oldest.timestamp().format("%Y-%m-%d %H:%M:%S"));
    }
    println!();

    for (idx, entry) in history.entries().iter().enumerate() {
        let band = ScoreBand::from_score(entry.derived_score());
        let preview: String = sanitize_for_display(entry.source_text.lines().next().unwrap_or(""))
            .chars()
            .take(50)
            .collect();
        println!(
            "{:>2}. [{:>3} {:<10}] {}  {}  {}",
            idx + 1,
            entry.derived_score(),
            band.label(),
            entry.timestamp().format("%Y-%m-%d %H:%M"),
            entry.model_label,
            preview
        );
    }

    Ok(())
}

fn clear_history(config: &Config) -> Result<()> {
    let store = history_store(config)?;
    store.update(&mut History::clear)?;
    info!(path = %store.path().display(), "History cleared");
    println!("History cleared");
    Ok(())
}
