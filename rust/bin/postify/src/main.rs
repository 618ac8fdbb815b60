//! `postify`: terminal client for the blog's headless CMS.
//!
//! Lists and shows posts, and drives the same debounced search the blog's
//! search boxes use.

mod commands;
mod config;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use postify_content::ListingParams;
use tracing_subscriber::EnvFilter;

use commands::output::Output;

/// Postify CLI tool.
#[derive(Parser, Debug)]
#[command(name = "postify", about = "Blog content and search client")]
struct Cli {
    /// Path to client config file (default: ~/.postify/config.toml).
    #[arg(long = "config", global = true)]
    config: Option<String>,

    /// Output format.
    #[arg(long = "output", short = 'o', global = true, value_enum, default_value = "table")]
    output: Output,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List posts (blog listing, category listing, or search results).
    Posts {
        /// Page number (1-based; anything invalid means 1).
        #[arg(long)]
        page: Option<String>,
        /// Category slug.
        #[arg(long)]
        category: Option<String>,
        /// Title search text.
        #[arg(long)]
        search: Option<String>,
        /// Sort order label (relevance, newest, oldest, popular).
        #[arg(long)]
        sort: Option<String>,
        /// Override the page size.
        #[arg(long)]
        limit: Option<u32>,
    },

    /// Show a single post.
    Post {
        /// Post slug.
        #[arg(long, conflicts_with = "id")]
        slug: Option<String>,
        /// Post id.
        #[arg(long)]
        id: Option<String>,
    },

    /// List categories.
    Categories,

    /// Fetch a CMS global (e.g. header, footer).
    Global {
        slug: String,
        /// Relationship depth to populate.
        #[arg(long, default_value_t = 0)]
        depth: u32,
    },

    /// Debounced title search, as typed into a search box.
    Search { query: String },

    /// Replay keystrokes from stdin (one line per box state) and show the
    /// suggestions for the final text.
    Suggest {
        /// Pause between keystrokes, in milliseconds.
        #[arg(long, default_value_t = 0)]
        interval_ms: u64,
    },

    /// Resolve a media URL against the CMS origin.
    MediaUrl {
        url: String,
        /// Cache-busting tag appended as a query string.
        #[arg(long)]
        cache_tag: Option<String>,
    },

    /// Show version.
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config_path = cli
        .config
        .map(PathBuf::from)
        .unwrap_or_else(config::ClientConfig::default_path);
    let config = config::ClientConfig::load(&config_path)?;
    let output = cli.output;

    match cli.command {
        Commands::Posts {
            page,
            category,
            search,
            sort,
            limit,
        } => {
            let params = ListingParams {
                page,
                q: search,
                category,
                sort,
            };
            commands::content::posts(&config, params, limit, output).await?;
        }

        Commands::Post { slug, id } => {
            commands::content::post(&config, slug.as_deref(), id.as_deref(), output).await?;
        }

        Commands::Categories => {
            commands::content::categories(&config, output).await?;
        }

        Commands::Global { slug, depth } => {
            commands::content::global(&config, &slug, depth).await?;
        }

        Commands::Search { query } => {
            commands::search::search(&config, &query, output).await?;
        }

        Commands::Suggest { interval_ms } => {
            let interval = Duration::from_millis(interval_ms);
            commands::search::suggest(&config, interval, output).await?;
        }

        Commands::MediaUrl { url, cache_tag } => {
            commands::content::media(&config, &url, cache_tag.as_deref())?;
        }

        Commands::Version => {
            println!("postify v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
