//! Crawlboard main entry point
//!
//! Command-line front end for the dashboard data layer: query the analytics
//! backend, refresh every view, or start and follow a crawl job.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use crawlboard::api::{QuestionsQuery, TagsQuery, TrendsQuery, UsersQuery};
use crawlboard::config::{load_config_with_hash, Config, CrawlerConfigUpdate};
use crawlboard::state::{CrawlPhase, DomainSlice};
use crawlboard::store::DataStore;
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Crawlboard: data layer for the Q&A analytics dashboard
///
/// Talks to the analytics backend, keeps each dashboard view's data with its
/// own loading and error state, and drives crawl jobs to completion.
#[derive(Parser, Debug)]
#[command(name = "crawlboard")]
#[command(version = "1.0.0")]
#[command(about = "Q&A analytics dashboard client", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Override the backend base URL
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show backend system status
    Status,

    /// Show backend cache status
    CacheStatus,

    /// Clear the backend cache (all keys when none are given)
    ClearCache {
        #[arg(value_name = "KEY")]
        keys: Vec<String>,
    },

    /// Load the dashboard overview
    Dashboard,

    /// Load question trends
    Trends {
        #[arg(long, default_value = "monthly")]
        granularity: String,
        #[arg(long)]
        start_date: Option<String>,
        #[arg(long)]
        end_date: Option<String>,
    },

    /// Load the user ranking
    Users {
        #[arg(long, default_value_t = 10)]
        limit: u32,
        #[arg(long, default_value = "question_count")]
        sort_by: String,
    },

    /// Load the tag ranking
    Tags {
        #[arg(long, default_value_t = 15)]
        limit: u32,
    },

    /// Load one page of the question list
    Questions {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 20)]
        limit: u32,
        #[arg(long, default_value = "views")]
        sort_by: String,
        #[arg(long, default_value = "desc")]
        order: String,
        #[arg(long)]
        search: Option<String>,
    },

    /// Re-fetch every view and report which ones failed
    Refresh,

    /// Start a crawl job and follow it to completion (Ctrl-C stops it)
    Crawl {
        #[arg(long)]
        max_pages: Option<u32>,
        #[arg(long)]
        timeout: Option<u32>,
        /// Let the backend finish the crawl before answering
        #[arg(long)]
        sync: bool,
    },

    /// Stop a running crawl job
    Stop {
        #[arg(value_name = "TASK_ID")]
        task_id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Some(base_url) = cli.base_url {
        config.api.base_url = base_url;
    }

    let store = DataStore::from_config(&config).context("failed to set up the API client")?;
    tracing::debug!("Using backend at {}", store.client().base_url());

    match cli.command {
        Command::Status => {
            let status = store.client().get_system_status().await?.into_data()?;
            print_json(&status)?;
        }
        Command::CacheStatus => {
            let status = store.client().get_cache_status().await?.into_data()?;
            print_json(&status)?;
        }
        Command::ClearCache { keys } => {
            let keys = (!keys.is_empty()).then_some(keys);
            let response = store.client().clear_cache(keys.as_deref()).await?;
            println!("{}", response.message);
            if let Some(data) = response.data {
                print_json(&data)?;
            }
        }
        Command::Dashboard => {
            store.fetch_dashboard().await;
            print_slice(&store.dashboard_snapshot())?;
        }
        Command::Trends {
            granularity,
            start_date,
            end_date,
        } => {
            let query = TrendsQuery {
                granularity,
                start_date,
                end_date,
                ..TrendsQuery::default()
            };
            store.fetch_trends(&query).await;
            print_slice(&store.trends_snapshot())?;
        }
        Command::Users { limit, sort_by } => {
            let query = UsersQuery {
                limit,
                sort_by,
                ..UsersQuery::default()
            };
            store.fetch_users(&query).await;
            print_slice(&store.users_snapshot())?;
        }
        Command::Tags { limit } => {
            let query = TagsQuery {
                limit,
                ..TagsQuery::default()
            };
            store.fetch_tags(&query).await;
            print_slice(&store.tags_snapshot())?;
        }
        Command::Questions {
            page,
            limit,
            sort_by,
            order,
            search,
        } => {
            let query = QuestionsQuery {
                page,
                limit,
                sort_by,
                order,
                search,
            };
            store.fetch_questions(&query).await;
            print_slice(&store.questions_snapshot())?;
        }
        Command::Refresh => handle_refresh(&store).await?,
        Command::Crawl {
            max_pages,
            timeout,
            sync,
        } => {
            store.set_crawler_config(CrawlerConfigUpdate {
                max_pages,
                timeout,
                async_mode: sync.then_some(false),
            })?;
            handle_crawl(&store).await?;
        }
        Command::Stop { task_id } => {
            let response = store.client().stop_crawler_task(&task_id).await?;
            println!("{}", response.message);
        }
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("crawlboard=info,warn"),
            1 => EnvFilter::new("crawlboard=debug,info"),
            2 => EnvFilter::new("crawlboard=trace,debug"),
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

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Prints a slice's data, or fails with its error
fn print_slice<T: Serialize>(slice: &DomainSlice<T>) -> anyhow::Result<()> {
    if let Some(error) = &slice.error {
        bail!("{}", error);
    }
    match &slice.data {
        Some(data) => print_json(data),
        None => bail!("no data loaded"),
    }
}

/// Handles the refresh command: fetches every view and summarizes
async fn handle_refresh(store: &DataStore) -> anyhow::Result<()> {
    let outcomes = store.refresh_all_data().await;

    for (domain, outcome) in &outcomes {
        if outcome.is_loaded() {
            println!("✓ {}", domain);
        } else {
            println!("✗ {}", domain);
        }
    }

    let errors = store.all_errors();
    if !errors.is_empty() {
        for error in &errors {
            eprintln!("{}", error);
        }
        bail!("{} of {} views failed to load", errors.len(), outcomes.len());
    }

    Ok(())
}

/// Handles the crawl command: starts the job and prints every state change
async fn handle_crawl(store: &DataStore) -> anyhow::Result<()> {
    let config = store.crawler_config();
    println!(
        "=== Starting crawl ({} pages, {}s timeout, {}) ===",
        config.max_pages,
        config.timeout,
        if config.async_mode { "async" } else { "sync" }
    );

    let mut updates = store.subscribe_crawl();
    let printer = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let state = updates.borrow_and_update().clone();
            println!("[{}] {:>3}% {}", state.phase, state.progress, state.message);
        }
    });

    let crawl = store.start_crawler();
    tokio::pin!(crawl);

    let phase = tokio::select! {
        phase = &mut crawl => phase,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupt received, stopping crawler");
            store.stop_crawler().await;
            crawl.await
        }
    };
    printer.abort();

    let state = store.crawl_snapshot();
    match phase {
        CrawlPhase::Completed => {
            println!("\n✓ Crawl completed");
            if let Some(result) = &state.last_result {
                if let Some(total) = result.get("total_questions") {
                    println!("✓ Questions collected: {}", total);
                }
            }
            for error in store.all_errors() {
                eprintln!("! {}", error);
            }
            Ok(())
        }
        CrawlPhase::Stopped => {
            println!("\nCrawl stopped");
            Ok(())
        }
        _ => bail!(
            "crawl ended in phase {}: {}",
            phase,
            state.error.as_deref().unwrap_or("unknown error")
        ),
    }
}
