//! Crawlet main entry point
//!
//! This is the command-line interface for submitting crawl tasks, running the
//! worker pool and inspecting results.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use crawlet::config::{load_config_with_hash, Config};
use crawlet::output::{print_stats, print_task, print_tasks, print_urls, OutputFormat};
use crawlet::storage::{NewTask, SqliteStorage, TaskFilter, TaskStore, UrlStore};
use crawlet::state::TaskState;
use crawlet::worker::run_pool;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Crawlet: a breadth-first web crawler driven by a shared task queue
///
/// Tasks are stored in SQLite. `run` starts a pool of workers that lease
/// pending tasks, crawl them to their depth limit and record every visited
/// page. Several `run` processes may share one database.
#[derive(Parser, Debug)]
#[command(name = "crawlet")]
#[command(version)]
#[command(about = "A breadth-first web crawler driven by a shared task queue", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the worker pool and process tasks until Ctrl-C
    Run,

    /// Submit a new crawl task
    Submit {
        /// Root URL to crawl from
        url: String,

        /// Number of link levels to fetch, the root being level one
        #[arg(long, default_value_t = 1)]
        max_depth: u32,

        /// Only follow links to this host (repeatable)
        #[arg(long = "domain", value_name = "HOST")]
        domains: Vec<String>,

        /// Skip links whose path ends with this suffix (repeatable)
        #[arg(long = "blacklist", value_name = "SUFFIX")]
        blacklist: Vec<String>,
    },

    /// List tasks
    Tasks {
        /// Only show tasks in this state (pending, running, completed)
        #[arg(long)]
        state: Option<TaskState>,

        #[arg(long, default_value_t = 0)]
        offset: u32,

        #[arg(long, default_value_t = 100)]
        limit: u32,
    },

    /// Show one task
    Task {
        id: i64,
    },

    /// List crawled URLs
    Urls {
        #[arg(long, default_value_t = 0)]
        offset: u32,

        #[arg(long, default_value_t = 100)]
        limit: u32,
    },

    /// Print crawl statistics
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::debug!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::debug!("Configuration loaded successfully (hash: {})", config_hash);

    let format = OutputFormat::from_json_flag(cli.json);

    match cli.command {
        Command::Run => handle_run(&config).await,
        Command::Submit {
            url,
            max_depth,
            domains,
            blacklist,
        } => {
            let task = NewTask::new(url, max_depth)
                .with_domains(domains)
                .with_blacklist(blacklist);
            handle_submit(&config, &task, format)
        }
        Command::Tasks {
            state,
            offset,
            limit,
        } => handle_tasks(
            &config,
            &TaskFilter {
                state,
                offset,
                limit,
            },
            format,
        ),
        Command::Task { id } => handle_task(&config, id, format),
        Command::Urls { offset, limit } => handle_urls(&config, offset, limit, format),
        Command::Stats => handle_stats(&config, format),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("crawlet=info,warn"),
            1 => EnvFilter::new("crawlet=debug,info"),
            2 => EnvFilter::new("crawlet=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

fn open_storage(config: &Config) -> anyhow::Result<SqliteStorage> {
    let path = Path::new(&config.storage.database_path);
    SqliteStorage::open(path).with_context(|| format!("Failed to open database {}", path.display()))
}

/// Runs the worker pool until Ctrl-C
async fn handle_run(config: &Config) -> anyhow::Result<()> {
    run_pool(config).await.context("Worker pool failed")
}

fn handle_submit(config: &Config, task: &NewTask, format: OutputFormat) -> anyhow::Result<()> {
    let mut storage = open_storage(config)?;
    let task = storage.create_task(task).context("Failed to submit task")?;
    tracing::info!("Submitted task {} for {}", task.id, task.url);
    print_task(&task, format)?;
    Ok(())
}

fn handle_tasks(config: &Config, filter: &TaskFilter, format: OutputFormat) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    let tasks = storage.list_tasks(filter).context("Failed to list tasks")?;
    print_tasks(&tasks, format)?;
    Ok(())
}

fn handle_task(config: &Config, id: i64, format: OutputFormat) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    match storage.get_task(id).context("Failed to load task")? {
        Some(task) => {
            print_task(&task, format)?;
            Ok(())
        }
        None => bail!("Task {} not found", id),
    }
}

fn handle_urls(config: &Config, offset: u32, limit: u32, format: OutputFormat) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    let records = storage
        .list_urls(offset, limit)
        .context("Failed to list crawled URLs")?;
    print_urls(&records, format)?;
    Ok(())
}

fn handle_stats(config: &Config, format: OutputFormat) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    let stats = storage.compute_stats().context("Failed to compute statistics")?;
    print_stats(&stats, format)?;
    Ok(())
}
