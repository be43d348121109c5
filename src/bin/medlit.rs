//! MedLit command-line front end
//!
//! Searches the summarization backend and manages the local history,
//! settings and audit log. Logging goes to stderr and is controlled by `-v`
//! flags or `RUST_LOG`.

use clap::{Parser, Subcommand};
use medlit::audit::AuditEvent;
use medlit::config;
use medlit::history;
use medlit::search::{SearchOutcome, SearchSession};
use medlit::settings::{DataResidency, ModelChoice, Schedule, SettingsManager, SummaryLength};
use medlit::storage::{self, FileStore};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

/// Medical literature search with AI summaries
#[derive(Parser, Debug)]
#[command(name = "medlit", version, about, long_about = None)]
struct Cli {
    /// Configuration file (JSON with a "medlit" object)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for history, settings and audit data
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search and summarize papers
    Search {
        /// Research question or keywords
        query: String,

        /// Number of papers to summarize (1-10)
        #[arg(short, long)]
        papers: Option<u32>,

        /// Export every result as PDF into this directory
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// Browse and manage search history
    History {
        #[command(subcommand)]
        action: Option<HistoryAction>,
    },
    /// Show or change settings
    Settings {
        #[command(subcommand)]
        action: Option<SettingsAction>,
    },
    /// Show recent audit events
    Audit {
        /// Number of events to show
        #[arg(short, long, default_value = "50")]
        limit: usize,

        /// Delete all audit events
        #[arg(long)]
        clear: bool,
    },
}

#[derive(Subcommand, Debug)]
enum HistoryAction {
    /// List past searches grouped by day
    List {
        /// Only show queries containing this text
        #[arg(short, long)]
        filter: Option<String>,
    },
    /// Delete one entry
    Remove { id: String },
    /// Delete all entries
    Clear,
    /// Run a past search again
    Rerun {
        id: String,

        /// Export every result as PDF into this directory
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// Searches, papers and time saved
    Stats,
    /// Trending topics and suggested searches
    Trends,
}

#[derive(Subcommand, Debug)]
enum SettingsAction {
    /// Print current settings
    Show,
    /// Change one setting
    Set {
        /// model, temperature, length, profile, hipaa, residency, anonymize or schedule
        field: String,
        value: String,
    },
    /// Manage tracked keywords
    Keyword {
        #[command(subcommand)]
        action: KeywordAction,
    },
    /// Restore default settings
    Reset,
    /// Print settings and recent audit events as JSON
    Export,
}

#[derive(Subcommand, Debug)]
enum KeywordAction {
    Add { keyword: String },
    Remove { keyword: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = match &cli.config {
        Some(path) => Some(path.clone()),
        None => storage::file::default_data_dir()
            .ok()
            .map(|dir| dir.join("config.json")),
    };
    let config = match config_path {
        Some(path) => config::load_config_file(&path)?,
        None => config::load_config(None)?,
    };

    let data_dir = match (&cli.data_dir, &config.data_dir) {
        (Some(dir), _) | (None, Some(dir)) => dir.clone(),
        (None, None) => storage::file::default_data_dir()?,
    };

    run_with(cli, data_dir).await
}

async fn run_with(cli: Cli, data_dir: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    log::debug!("Using data directory {}", data_dir.display());
    let store = Arc::new(FileStore::open(&data_dir)?);
    // load_config above installed the global configuration
    let mut session = SearchSession::from_global_config(store)?;

    match cli.command {
        Commands::Search {
            query,
            papers,
            export,
        } => {
            let outcome = match papers {
                Some(n) => session.search_with(&query, n).await?,
                None => session.search(&query).await?,
            };
            print_outcome(&outcome);
            if let Some(dir) = export {
                export_all(&session, &outcome, &dir)?;
            }
        }
        Commands::History { action } => {
            run_history(&mut session, action.unwrap_or(HistoryAction::List { filter: None })).await?
        }
        Commands::Settings { action } => {
            run_settings(&mut session, action.unwrap_or(SettingsAction::Show))?
        }
        Commands::Audit { limit, clear } => {
            if clear {
                session.audit().clear();
                println!("Audit log cleared");
            } else {
                print_audit(&session.audit().recent(limit));
            }
        }
    }

    Ok(())
}

async fn run_history(
    session: &mut SearchSession,
    action: HistoryAction,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        HistoryAction::List { filter } => {
            let entries = match filter {
                Some(f) => history::search_history(&f, session.history().entries()),
                None => session.history().entries().to_vec(),
            };
            if entries.is_empty() {
                println!("No searches yet");
                return Ok(());
            }
            for (group, items) in history::group_by_local_day(&entries) {
                println!("{}", group.label());
                for entry in items {
                    println!("  {}", history::format_history_entry(entry));
                }
            }
        }
        HistoryAction::Remove { id } => {
            if session.history_mut().remove(&id) {
                println!("Removed {}", id);
            } else {
                return Err(format!("No history entry with id {}", id).into());
            }
        }
        HistoryAction::Clear => {
            session.history_mut().clear();
            println!("History cleared");
        }
        HistoryAction::Rerun { id, export } => {
            let outcome = session.rerun(&id).await?;
            print_outcome(&outcome);
            if let Some(dir) = export {
                export_all(session, &outcome, &dir)?;
            }
        }
        HistoryAction::Stats => {
            let stats = history::compute_stats(session.history().entries());
            println!("Searches:           {}", stats.searches);
            println!("Papers summarized:  {}", stats.total_papers);
            println!("Manual estimate:    {} min", stats.manual_minutes);
            println!("AI processing:      {} min", stats.ai_minutes);
            println!("Time saved:         {} min", stats.minutes_saved);
            println!("Average per search: {} min", stats.average_saved_per_search);
            if !stats.recent_bars.is_empty() {
                println!("Recent activity:");
                for pct in &stats.recent_bars {
                    let width = (*pct as usize + 4) / 5;
                    println!("  {:>3}% {}", pct, "#".repeat(width));
                }
            }
        }
        HistoryAction::Trends => {
            let terms = history::trending_terms(session.history().entries(), 6);
            if terms.is_empty() {
                println!("Not enough history for trends");
                return Ok(());
            }
            println!("Trending: {}", terms.join(", "));
            println!("Suggested searches:");
            for suggestion in history::recommendations(&terms) {
                println!("  {}", suggestion);
            }
        }
    }
    Ok(())
}

fn run_settings(session: &mut SearchSession, action: SettingsAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        SettingsAction::Show => print_settings(session.settings()),
        SettingsAction::Set { field, value } => {
            apply_setting(session.settings_mut(), &field, &value)?;
            print_settings(session.settings());
        }
        SettingsAction::Keyword { action } => match action {
            KeywordAction::Add { keyword } => {
                if !session.settings_mut().add_keyword(&keyword) {
                    println!("Keyword not added (blank, duplicate or list full)");
                }
                print_settings(session.settings());
            }
            KeywordAction::Remove { keyword } => {
                if !session.settings_mut().remove_keyword(&keyword) {
                    println!("Keyword '{}' is not tracked", keyword);
                }
                print_settings(session.settings());
            }
        },
        SettingsAction::Reset => {
            session.settings_mut().reset();
            print_settings(session.settings());
        }
        SettingsAction::Export => {
            let export = json!({
                "settings": session.settings().get(),
                "audit": session.audit().recent(50),
            });
            println!("{}", serde_json::to_string_pretty(&export)?);
        }
    }
    Ok(())
}

fn apply_setting(settings: &mut SettingsManager, field: &str, value: &str) -> Result<(), String> {
    match field {
        "model" => settings.set_model(value.parse::<ModelChoice>()?),
        "temperature" => {
            let t = value
                .parse::<f64>()
                .map_err(|_| format!("temperature must be a number, got '{}'", value))?;
            settings.set_temperature(t);
        }
        "length" => settings.set_length(value.parse::<SummaryLength>()?),
        "profile" => settings.set_profile(Some(value.to_string())),
        "hipaa" => settings.set_hipaa_mode(parse_bool(value)?),
        "residency" => settings.set_residency(value.parse::<DataResidency>()?),
        "anonymize" => settings.set_anonymize_phi(parse_bool(value)?),
        "schedule" => settings.set_schedule(value.parse::<Schedule>()?),
        other => return Err(format!("unknown setting '{}'", other)),
    }
    Ok(())
}

fn parse_bool(value: &str) -> Result<bool, String> {
    match value.trim().to_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        other => Err(format!("expected on/off, got '{}'", other)),
    }
}

fn print_outcome(outcome: &SearchOutcome) {
    match outcome {
        SearchOutcome::Live {
            papers,
            processing_time_seconds,
            time_saved,
        } => {
            match processing_time_seconds {
                Some(s) => println!("Found {} relevant papers in {:.1}s", papers.len(), s),
                None => println!("Found {} relevant papers", papers.len()),
            }
            if let Some(saved) = time_saved {
                println!("Time saved: ~{}", saved.display());
                println!("  {}", saved.explanation());
            }
        }
        SearchOutcome::Fallback { papers, error } => {
            println!("Backend unavailable ({}). Showing {} example papers.", error, papers.len());
        }
    }

    for (i, paper) in outcome.papers().iter().enumerate() {
        println!();
        println!("{}. {}", i + 1, paper.title);
        let meta = paper.metadata_line();
        if !meta.is_empty() {
            println!("   {}", meta);
        }
        if !paper.authors.is_empty() {
            println!("   {}", paper.authors);
        }
        for finding in &paper.summary {
            println!("   • {}", finding);
        }
        println!("   {}", paper.pubmed_url());
    }
}

fn export_all(session: &SearchSession, outcome: &SearchOutcome, dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    for paper in outcome.papers() {
        let path = session.export(paper, dir)?;
        println!("Exported {}", path.display());
    }
    Ok(())
}

fn print_settings(settings: &SettingsManager) {
    let record = settings.get();
    println!("model:       {}", record.model);
    println!("temperature: {}", record.temperature);
    println!("length:      {}", record.length);
    println!("profile:     {}", record.profile.as_deref().unwrap_or("(none)"));
    println!("hipaa:       {}", on_off(record.hipaa_mode));
    println!("residency:   {}", record.data_residency);
    println!("anonymize:   {}", on_off(record.anonymize_phi));
    println!("schedule:    {}", record.schedule);
    if record.tracked_keywords.is_empty() {
        println!("keywords:    (none)");
    } else {
        println!("keywords:    {}", record.tracked_keywords.join(", "));
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}

fn print_audit(events: &[AuditEvent]) {
    if events.is_empty() {
        println!("No audit events");
        return;
    }
    for event in events {
        let payload = event
            .payload
            .as_ref()
            .map(|p| serde_json::Value::Object(p.clone()).to_string())
            .unwrap_or_default();
        println!(
            "{}  {:<9} {}",
            history::ui::format_timestamp(&event.timestamp),
            event.event_type.to_string(),
            payload
        );
    }
}

