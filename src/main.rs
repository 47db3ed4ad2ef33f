//! Sitegraph main entry point
//!
//! This is the command-line interface for the Sitegraph crawler and ranker.

use anyhow::{anyhow, Context};
use clap::Parser;
use sitegraph::config::{load_config_with_hash, validate, Config};
use sitegraph::crawler::{canonical_root, crawl};
use sitegraph::graph::{GraphAnalyzer, GraphBuilder, RankEngine};
use sitegraph::output::{
    generate_markdown_summary, print_summary, GraphSource, PhaseTimings, RunSummary,
};
use sitegraph::storage::{self, GraphStorage, SqliteStorage};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Sitegraph: a same-site crawler and link-graph ranker
///
/// Sitegraph crawls one site from a root URL while respecting robots.txt,
/// saves the resulting link graph and ranks its pages.
#[derive(Parser, Debug)]
#[command(name = "sitegraph")]
#[command(version = "1.0.0")]
#[command(about = "A same-site crawler and link-graph ranker", long_about = None)]
struct Cli {
    /// Absolute http(s) URL to start from
    #[arg(value_name = "ROOT_URL")]
    root_url: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Load the latest saved graph for the root instead of crawling
    #[arg(long)]
    load: bool,

    /// Load the graph of a specific saved run
    #[arg(long, value_name = "ID")]
    run: Option<i64>,

    /// Override the worker pool width
    #[arg(long, value_name = "N")]
    workers: Option<u32>,

    /// Validate config and show what would be crawled without crawling
    #[arg(long, conflicts_with_all = ["load", "run"])]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let (mut config, config_hash) = load_configuration(cli.config.as_deref())?;
    if let Some(workers) = cli.workers {
        config.crawler.workers = workers;
        validate(&config).context("Invalid --workers override")?;
    }

    if cli.dry_run {
        handle_dry_run(&cli.root_url, &config, &config_hash)?;
        return Ok(());
    }

    let summary = if cli.load || cli.run.is_some() {
        handle_load(&cli.root_url, cli.run, &config)?
    } else {
        handle_crawl(&cli.root_url, &config, &config_hash).await?
    };

    if !cli.quiet {
        print_summary(&summary);
    }

    if let Some(path) = &config.output.summary_path {
        generate_markdown_summary(&summary, Path::new(path))?;
        tracing::info!("Summary written to {}", path);
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitegraph=info,warn"),
            1 => EnvFilter::new("sitegraph=debug,info"),
            2 => EnvFilter::new("sitegraph=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the config file, or the built-in defaults when none is given
fn load_configuration(path: Option<&Path>) -> anyhow::Result<(Config, String)> {
    match path {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            Ok((config, hash))
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            Ok((Config::default(), "default".to_string()))
        }
    }
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(root_url: &str, config: &Config, config_hash: &str) -> anyhow::Result<()> {
    let root = canonical_root(root_url)?;

    println!("=== Sitegraph Dry Run ===\n");

    println!("Root: {}", root);
    println!("Config hash: {}", config_hash);

    println!("\nCrawler Configuration:");
    println!("  Workers: {}", config.crawler.workers);
    println!("  Fetch timeout: {}s", config.crawler.fetch_timeout_secs);
    println!("  Respect robots.txt: {}", config.crawler.respect_robots);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nRank:");
    println!("  Damping: {}", config.rank.damping);
    println!("  Sample size: {}", config.rank.sample_size);

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    match &config.output.summary_path {
        Some(path) => println!("  Summary: {}", path),
        None => println!("  Summary: (none)"),
    }

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles a fresh crawl: crawl, build, persist, rank, analyze
async fn handle_crawl(root_url: &str, config: &Config, config_hash: &str) -> anyhow::Result<RunSummary> {
    let mut storage = open_storage(config)?;
    let mut timings = PhaseTimings::default();

    let started = Instant::now();
    let report = crawl(root_url, config).await?;
    timings.graph = started.elapsed();
    tracing::info!("Concurrent time: {:?}", timings.graph);

    let root = report.root.link().to_string();
    let graph = GraphBuilder::new().build(&report.root);

    let run_id = storage.create_run(&root, config_hash)?;
    if let Err(e) = storage.save_graph(run_id, &graph) {
        storage.fail_run(run_id)?;
        return Err(e).context("Failed to save crawl graph");
    }

    let started = Instant::now();
    let ranks = RankEngine::new(config.rank.damping).rank(&graph, &root);
    timings.rank = started.elapsed();
    tracing::info!("Page rank time: {:?}", timings.rank);

    storage.save_ranks(run_id, &ranks)?;
    storage.complete_run(run_id)?;

    let started = Instant::now();
    let analysis = GraphAnalyzer::analyze(&graph, config.rank.sample_size);
    timings.analyze = started.elapsed();
    tracing::info!("Analyze graph time: {:?}", timings.analyze);

    let mut summary = RunSummary::new(root, GraphSource::Crawl, analysis, &ranks, config.rank.sample_size);
    summary.run_id = Some(run_id);
    summary.config_hash = config_hash.to_string();
    summary.timings = timings;
    Ok(summary)
}

/// Handles --load / --run: read a saved graph, rank and analyze it
fn handle_load(root_url: &str, run: Option<i64>, config: &Config) -> anyhow::Result<RunSummary> {
    let root = canonical_root(root_url)?.to_string();
    let mut storage = open_storage(config)?;
    let mut timings = PhaseTimings::default();

    let started = Instant::now();
    let record = match run {
        Some(run_id) => storage.get_run(run_id)?,
        None => storage
            .get_latest_run(&root)?
            .ok_or_else(|| anyhow!("No saved graph for {} in {}", root, config.output.database_path))?,
    };
    if record.root_url != root {
        tracing::warn!(
            "Run {} was crawled from {}, not {}",
            record.id,
            record.root_url,
            root
        );
    }
    let graph = storage.load_graph(record.id)?;
    timings.graph = started.elapsed();
    tracing::info!(
        "Loaded run {}: {} nodes, {} edges",
        record.id,
        graph.node_count(),
        graph.edge_count()
    );

    let started = Instant::now();
    let ranks = RankEngine::new(config.rank.damping).rank(&graph, &record.root_url);
    timings.rank = started.elapsed();
    tracing::info!("Page rank time: {:?}", timings.rank);

    storage.save_ranks(record.id, &ranks)?;

    let started = Instant::now();
    let analysis = GraphAnalyzer::analyze(&graph, config.rank.sample_size);
    timings.analyze = started.elapsed();
    tracing::info!("Analyze graph time: {:?}", timings.analyze);

    let mut summary = RunSummary::new(
        record.root_url.clone(),
        GraphSource::Loaded,
        analysis,
        &ranks,
        config.rank.sample_size,
    );
    summary.run_id = Some(record.id);
    summary.config_hash = record.config_hash;
    summary.timings = timings;
    Ok(summary)
}

fn open_storage(config: &Config) -> anyhow::Result<SqliteStorage> {
    let path = Path::new(&config.output.database_path);
    storage::open_storage(path).with_context(|| format!("Failed to open database {}", path.display()))
}
