//! Invoice Agent - Human-in-the-loop invoice correction with learned vendor memory.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use invoice_agent::agent::Orchestrator;
use invoice_agent::ai::{AiSuggester, Suggester, UnavailableSuggester};
use invoice_agent::batch::{
    write_json_atomic, write_outputs, BatchError, BatchEvent, BatchInput, BatchRunner, InputPaths,
};
use invoice_agent::config::{load_env_file, AgentConfig, ConfigError, ConfigLoader};
use invoice_agent::display;
use invoice_agent::memory::{MemoryError, MemoryStore};
use invoice_agent::review::{FixedReviewer, Reviewer, TerminalReviewer};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ReviewMode {
    /// Ask on the terminal.
    Interactive,
    /// Accept every proposal.
    Agree,
    /// Learn nothing.
    Skip,
}

#[derive(Parser)]
#[command(
    name = "invoice-agent",
    about = "Human-in-the-loop invoice correction with learned vendor memory",
    version
)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Config file to use instead of the default search paths.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a batch of invoices.
    Run(RunArgs),
    /// Inspect or manage learned memory.
    Memory {
        /// Memory database (defaults to the configured path).
        #[arg(long, global = true)]
        db: Option<PathBuf>,
        #[command(subcommand)]
        command: MemoryCommand,
    },
}

#[derive(clap::Args)]
struct RunArgs {
    /// Directory holding invoices.json, purchase_orders.json and delivery_notes.json.
    #[arg(long, default_value = "data")]
    data: PathBuf,
    /// Invoices file (overrides --data).
    #[arg(long)]
    invoices: Option<PathBuf>,
    /// Purchase orders file (overrides --data).
    #[arg(long)]
    purchase_orders: Option<PathBuf>,
    /// Delivery notes file (overrides --data).
    #[arg(long)]
    delivery_notes: Option<PathBuf>,
    /// How escalated invoices are reviewed.
    #[arg(long, value_enum, default_value_t = ReviewMode::Interactive)]
    review: ReviewMode,
    /// Results file.
    #[arg(long)]
    output: Option<PathBuf>,
    /// Learned memory snapshot file.
    #[arg(long)]
    memory_snapshot: Option<PathBuf>,
    /// Memory database.
    #[arg(long)]
    db: Option<PathBuf>,
}

#[derive(Subcommand)]
enum MemoryCommand {
    /// Show learned corrections.
    Show {
        /// Only this vendor (exact match).
        #[arg(long)]
        vendor: Option<String>,
    },
    /// Write all learned reviews as JSON.
    Export {
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Delete all learned reviews.
    Clear,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Memory store unavailable: {0}")]
    Memory(#[from] MemoryError),
    #[error(transparent)]
    Batch(#[from] BatchError),
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn load_config(path: Option<PathBuf>) -> Result<AgentConfig, ConfigError> {
    let loader = path.map_or_else(ConfigLoader::new, ConfigLoader::with_path);
    loader.load()
}

async fn open_store(db: Option<PathBuf>, config: &AgentConfig) -> Result<MemoryStore, MemoryError> {
    let path = db.unwrap_or_else(|| config.memory.path.clone());
    MemoryStore::open(&path).await
}

fn build_suggester(config: &AgentConfig) -> Box<dyn Suggester> {
    match AiSuggester::from_config(config.ai.clone()) {
        Ok(suggester) => {
            tracing::info!(
                provider = ?suggester.provider_kind(),
                model = suggester.model(),
                "Using AI suggester"
            );
            Box::new(suggester)
        }
        Err(e) => {
            tracing::warn!(error = %e, "AI suggester unavailable");
            display::print_warning(&format!(
                "{e}; every invoice will require human review"
            ));
            Box::new(UnavailableSuggester::new(e.to_string()))
        }
    }
}

fn build_reviewer(mode: ReviewMode) -> Box<dyn Reviewer> {
    match mode {
        ReviewMode::Interactive => Box::new(TerminalReviewer::stdio()),
        ReviewMode::Agree => Box::new(FixedReviewer::agree()),
        ReviewMode::Skip => Box::new(FixedReviewer::skip()),
    }
}

async fn run_batch(args: RunArgs, config: AgentConfig) -> Result<(), CliError> {
    // The store must be usable before any invoice is touched.
    let store = open_store(args.db, &config).await?;

    let defaults = InputPaths::in_dir(&args.data);
    let paths = InputPaths {
        invoices: args.invoices.unwrap_or(defaults.invoices),
        purchase_orders: args.purchase_orders.unwrap_or(defaults.purchase_orders),
        delivery_notes: args.delivery_notes.unwrap_or(defaults.delivery_notes),
    };
    let input = BatchInput::load_paths(&paths).await?;

    let orchestrator = Orchestrator::new(store, build_suggester(&config), config.thresholds);
    let mut runner = BatchRunner::new(&orchestrator, build_reviewer(args.review));
    let report = runner
        .run_with(&input, |event| match event {
            BatchEvent::Processed(result) => {
                display::print_invoice_header(result.invoice_id(), result.vendor());
                display::print_result(result);
            }
            BatchEvent::MemoryUpdated(update) => display::print_memory_update(update),
        })
        .await?;

    let results_path = args.output.unwrap_or(config.output.results_path);
    let snapshot_path = args
        .memory_snapshot
        .unwrap_or(config.output.memory_snapshot_path);
    write_outputs(&report.results, orchestrator.store(), &results_path, &snapshot_path).await?;
    display::print_batch_summary(&report, &results_path, &snapshot_path);
    Ok(())
}

async fn run_memory(
    db: Option<PathBuf>,
    command: MemoryCommand,
    config: AgentConfig,
) -> Result<(), CliError> {
    let store = open_store(db, &config).await?;
    match command {
        MemoryCommand::Show { vendor } => {
            let reviews = match vendor {
                Some(vendor) => store.load_for_vendor(&vendor).await?,
                None => store.load_all().await?,
            };
            display::print_memory_table(&reviews);
        }
        MemoryCommand::Export { output } => {
            let path = output.unwrap_or(config.output.memory_snapshot_path);
            let reviews = store.load_all().await?;
            write_json_atomic(&path, &reviews).await?;
            println!("Exported {} review(s) to {}", reviews.len(), path.display());
        }
        MemoryCommand::Clear => {
            let removed = store.clear().await?;
            println!("Removed {removed} learned review(s)");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    // Before tracing, so a RUST_LOG in .env takes effect.
    let env_file = load_env_file(None);
    init_tracing(cli.verbose);
    if let Some(path) = env_file {
        tracing::debug!(path = %path.display(), "Loaded environment file");
    }

    let config = match load_config(cli.config) {
        Ok(config) => config,
        Err(e) => {
            display::print_error(&e.to_string());
            return ExitCode::FAILURE;
        }
    };

    let outcome = match cli.command {
        Commands::Run(args) => run_batch(args, config).await,
        Commands::Memory { db, command } => run_memory(db, command, config).await,
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            display::print_error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}
