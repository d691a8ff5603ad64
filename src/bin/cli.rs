//! confgrep CLI
//!
//! Builds the paper database (`--build-db`) or greps it (`-k`).

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use confgrep::{
    error::Result,
    models::Config,
    pipeline,
    services::{AbstractDispatcher, BibliographyHarvester},
    storage::SqliteStore,
    utils::{http, render::WebDriverRenderer},
};

/// confgrep - Top-4 Security Conference Paper Grep
#[derive(Parser, Debug)]
#[command(
    name = "confgrep",
    version,
    about = "Scripts to build and query the paper database",
    override_usage = "confgrep [options] -k <keywords>"
)]
struct Cli {
    /// Keywords to grep, separated by ','. For example, 'linux,kernel,exploit'
    #[arg(short = 'k', value_name = "KEYWORDS", conflicts_with = "build_db")]
    keywords: Option<String>,

    /// Builds the database of conference papers
    #[arg(long)]
    build_db: bool,

    /// With --build-db: extract abstracts. With -k: match keywords in abstracts
    #[arg(long = "abstract")]
    with_abstract: bool,

    /// Path to the configuration file
    #[arg(short, long, default_value = "confgrep.toml")]
    config: PathBuf,

    /// Path to the paper database (overrides the configuration)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Whether a query or a build was requested.
    fn has_action(&self) -> bool {
        self.keywords.is_some() || self.build_db
    }
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    if !cli.has_action() {
        return Ok(());
    }
    init_logging(cli.verbose);

    let config = if cli.config.exists() {
        Config::load(&cli.config)?
    } else {
        log::debug!("No config at {}; using defaults", cli.config.display());
        Config::default()
    };
    config.validate()?;

    let db_path = cli
        .db
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.database.path));

    if let Some(raw) = &cli.keywords {
        let store = pipeline::open_existing(&db_path)?;
        let keywords = pipeline::parse_keywords(raw);
        let papers = pipeline::run_query(&store, &keywords, cli.with_abstract)?;

        for paper in &papers {
            println!("{paper}");
            log::debug!("    {} | {}", paper.conference, paper.authors.join(", "));
        }
        store.close()?;
    } else if cli.build_db {
        println!("Building db...");
        let config = Arc::new(config);
        let store = SqliteStore::open(&db_path)?;

        let client = http::create_async_client(&config.crawler)?;
        let renderer = Arc::new(WebDriverRenderer::new(&config.render, &config.crawler)?);
        let dispatcher = AbstractDispatcher::new(client.clone(), renderer);
        let harvester = BibliographyHarvester::new(Arc::clone(&config), client, dispatcher);

        pipeline::run_build(&config, &harvester, &store, cli.with_abstract).await;
        store.close()?;
    }

    Ok(())
}
