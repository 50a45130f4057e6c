//! scholar-profile - Google Scholar author profile service
//!
//! Looks up an author on Google Scholar, fills every publication and classifies
//! it by venue, then serves the result as JSON.
//!
//! ## Usage
//!
//! ### HTTP Server Mode
//! ```bash
//! scholar-profile serve --port 8000
//! ```
//!
//! ### One-off lookup
//! ```bash
//! scholar-profile lookup "Geoffrey Hinton" --max-publications 5
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use scholar_profile::config::{FetcherConfig, ScraperConfig, ServerConfig, DEFAULT_SCHOLAR_URL};
use scholar_profile::cookies::CookieJar;
use scholar_profile::fetcher::{ProfileFetcher, PublicationLimit};
use scholar_profile::gscholar::ScholarScraper;
use scholar_profile::report;
use scholar_profile::server::{create_router, AppState};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

// ============================================================================
// CLI Definition
// ============================================================================

/// Google Scholar author profile & publication classifier
#[derive(Parser)]
#[command(name = "scholar-profile")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    /// Scholar base URL or mirror
    #[arg(long, global = true, env = "SCHOLAR_URL", default_value = DEFAULT_SCHOLAR_URL)]
    scholar_url: String,

    /// Proxy URL (e.g., http://127.0.0.1:7890)
    #[arg(long, global = true, env = "SCHOLAR_PROXY")]
    proxy: Option<String>,

    /// Pause between publication lookups, in milliseconds
    #[arg(long, global = true, default_value = "500")]
    pacing_ms: u64,

    /// Maximum random delay before each Scholar page fetch, in milliseconds
    #[arg(long, global = true, default_value = "0")]
    jitter_ms: u64,

    /// Cookie file (default: ~/.scholar_profile_cookies.json)
    #[arg(long, global = true, env = "SCHOLAR_COOKIE_FILE")]
    cookie_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run as HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Allowed CORS origin; repeatable, supports https://*.domain wildcards
        #[arg(long = "cors-origin")]
        cors_origins: Vec<String>,

        /// Return a partial profile once publication lookups exceed this many seconds
        #[arg(long)]
        request_timeout_secs: Option<u64>,
    },

    /// Look up a single author and print the profile
    Lookup {
        /// Author name
        name: String,

        /// Maximum number of publications to fill (0 = all)
        #[arg(long)]
        max_publications: Option<usize>,

        /// Print JSON instead of the text report
        #[arg(long)]
        json: bool,
    },

    /// Manage cookies
    Cookies {
        #[command(subcommand)]
        action: CookieAction,
    },
}

#[derive(Subcommand)]
enum CookieAction {
    /// Clear stored cookies
    Clear,
    /// Show cookie file path
    Path,
    /// Import a browser cookie export (JSON array)
    Import {
        /// Exported cookie file
        file: PathBuf,
    },
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug, cli.log_json);

    let scraper_config = ScraperConfig {
        base_url: cli.scholar_url.clone(),
        proxy: cli.proxy.clone(),
        jitter: Duration::from_millis(cli.jitter_ms),
        cookie_file: cli.cookie_file.clone(),
        ..Default::default()
    };
    let fetcher_config = FetcherConfig {
        pacing: Duration::from_millis(cli.pacing_ms),
    };

    match cli.command {
        Commands::Serve {
            port,
            host,
            cors_origins,
            request_timeout_secs,
        } => {
            let mut server_config = ServerConfig {
                host,
                port,
                request_timeout: request_timeout_secs.map(Duration::from_secs),
                ..Default::default()
            };
            if !cors_origins.is_empty() {
                server_config.cors_origins = cors_origins;
            }
            let fetcher = build_fetcher(&scraper_config, fetcher_config)?;
            run_server(server_config, fetcher).await
        }
        Commands::Lookup {
            name,
            max_publications,
            json,
        } => {
            let fetcher = build_fetcher(&scraper_config, fetcher_config)?;
            run_lookup(&fetcher, &name, max_publications, json).await
        }
        Commands::Cookies { action } => handle_cookies(action, cli.cookie_file),
    }
}

fn init_logging(debug: bool, json: bool) {
    let log_level = if debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn build_fetcher(scraper_config: &ScraperConfig, config: FetcherConfig) -> Result<ProfileFetcher> {
    let scraper = ScholarScraper::new(scraper_config).context("Failed to build Scholar client")?;
    Ok(ProfileFetcher::new(Arc::new(scraper), config))
}

// ============================================================================
// Lookup
// ============================================================================

async fn run_lookup(
    fetcher: &ProfileFetcher,
    name: &str,
    max_publications: Option<usize>,
    json: bool,
) -> Result<()> {
    println!("Fetching profile for '{}' (press Ctrl+C to stop)...", name);

    let (cancel_tx, cancel_rx) = tokio::sync::watch::channel(false);
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!("\nStopped by user, keeping publications fetched so far.");
            let _ = cancel_tx.send(true);
        }
    });

    let profile = fetcher
        .fetch_profile_with_cancel(name, PublicationLimit::from(max_publications), cancel_rx)
        .await;
    ctrl_c.abort();
    let profile = profile?;

    if json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
    } else {
        println!("\n{}", report::render_profile(&profile));
    }
    Ok(())
}

// ============================================================================
// HTTP Server
// ============================================================================

async fn run_server(config: ServerConfig, fetcher: ProfileFetcher) -> Result<()> {
    info!(
        host = %config.host,
        port = config.port,
        pacing_ms = fetcher.config().pacing.as_millis() as u64,
        "Starting HTTP server"
    );

    let state = AppState {
        fetcher,
        request_timeout: config.request_timeout,
    };
    let app = create_router(state, &config.cors_origins);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid host:port")?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    println!("Listening on http://{}", addr);
    info!(origins = ?config.cors_origins, "CORS allow-list");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

// ============================================================================
// Cookie Management
// ============================================================================

fn handle_cookies(action: CookieAction, cookie_file: Option<PathBuf>) -> Result<()> {
    let jar = match cookie_file {
        Some(path) => CookieJar::with_path(path),
        None => CookieJar::open_default(),
    };

    match action {
        CookieAction::Clear => {
            jar.clear()?;
            println!("Cookies cleared.");
        }
        CookieAction::Path => {
            println!("Cookie file: {}", jar.path().display());
        }
        CookieAction::Import { file } => {
            let count = jar
                .import(&file)
                .with_context(|| format!("Failed to import cookies from {}", file.display()))?;
            println!("Imported {} cookies into {}", count, jar.path().display());
        }
    }

    Ok(())
}
