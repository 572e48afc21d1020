use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use danmaku_rename::batch::{render_items, save_items, BatchSession};
use danmaku_rename::config::{ConfigBuilder, SessionConfig};
use danmaku_rename::tui::{run_tui, App};

#[derive(Parser)]
#[command(name = "danmaku-rename", version, about = "Batch episode title rename rules")]
struct Cli {
    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print every title next to what the rules would turn it into
    Preview(SessionArgs),
    /// Apply the rules and write the renamed episode list
    Apply(SessionArgs),
    /// Edit rules interactively with a live preview
    Tui(SessionArgs),
}

#[derive(Args)]
struct SessionArgs {
    /// Episode list: a .json array of episodes or a text file with one title per line
    #[arg(long)]
    items: PathBuf,

    /// JSON array of rename rules
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Where to write the renamed list (defaults to stdout)
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Empty the rule list after each apply
    #[arg(long)]
    clear_rules_on_apply: bool,
}

impl SessionArgs {
    fn into_config(self) -> Result<SessionConfig> {
        ConfigBuilder::new()
            .items(&self.items)
            .rules(self.rules.as_ref())
            .output(self.output.as_ref())
            .clear_rules_on_apply(self.clear_rules_on_apply)
            .build()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let interactive = matches!(cli.command, Command::Tui(_));
    init_logging(cli.log_file.as_ref(), interactive)?;

    match cli.command {
        Command::Preview(args) => preview(args.into_config()?).await,
        Command::Apply(args) => apply(args.into_config()?).await,
        Command::Tui(args) => tui(args.into_config()?).await,
    }
}

fn init_logging(log_file: Option<&PathBuf>, interactive: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .init();
        }
        // Anything written to stderr would land on top of the TUI.
        None if interactive => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::sink)
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
    }
    Ok(())
}

async fn preview(config: SessionConfig) -> Result<()> {
    let (session, _) = BatchSession::from_config(&config).await?;
    let preview = session.preview();

    println!("Rules:");
    for (i, rule) in session.rules().rules().iter().enumerate() {
        let mark = if rule.enabled { "x" } else { " " };
        println!("  [{}] {}. {}", mark, i + 1, rule.summary());
    }
    println!();

    for (row, item) in session.items().iter().enumerate() {
        match preview.title_for(row, item) {
            Some(title) if title != item.title => println!("{:>4}  {}  ->  {}", item.episode_index, item.title, title),
            _ => println!("{:>4}  {}  (unchanged)", item.episode_index, item.title),
        }
    }

    let changed = preview.changed(session.items()).len();
    println!();
    println!("{} of {} titles would change", changed, session.items().len());

    for failure in preview.failures() {
        eprintln!(
            "✗ episode {}: {} rule failed: {}",
            failure.episode_id, failure.failure.rule_type, failure.failure.message
        );
    }

    Ok(())
}

async fn apply(config: SessionConfig) -> Result<()> {
    let (mut session, format) = BatchSession::from_config(&config).await?;
    let report = session.apply();

    for failure in &report.failures {
        eprintln!(
            "✗ episode {}: {} rule failed: {}",
            failure.episode_id, failure.failure.rule_type, failure.failure.message
        );
    }

    match &config.output_path {
        Some(path) => {
            save_items(path, session.items()).await?;
            eprintln!("✓ {} of {} titles changed, written to {}", report.changed, session.items().len(), path.display());
        }
        None => {
            print!("{}", render_items(session.items(), format)?);
            eprintln!("✓ {} of {} titles changed", report.changed, session.items().len());
        }
    }

    Ok(())
}

async fn tui(config: SessionConfig) -> Result<()> {
    let (session, format) = BatchSession::from_config(&config).await?;
    let app = App::new(session, format, config.output_path.clone());
    let app = run_tui(app).await?;

    if app.unsaved {
        if config.output_path.is_some() {
            eprintln!("Unsaved changes were discarded (press s to save before quitting).");
        } else {
            info!("Printing renamed list to stdout");
            print!("{}", app.render_result()?);
        }
    }

    Ok(())
}
