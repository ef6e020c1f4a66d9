//! canonhost: canonical host redirect front.
//!
//! This is the application entry point. It initializes tracing, loads the bootstrap
//! configuration from TOML, primes the canonical host provider, sets up the Axum
//! router with the redirect middleware, and starts the HTTP server.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use canonhost::config::{AppConfig, DEFAULT_CONFIG_PATH, DEFAULT_LOG_FILTER};
use canonhost::http::start_server;
use canonhost::routes::create_router;
use canonhost::state::AppState;
use canonhost::AppError;

/// canonhost: redirect every request to one canonical HTTPS host
#[derive(Parser, Debug)]
#[command(name = "canonhost", version, about)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Directory holding config.json (overrides data.directory)
    #[arg(short, long)]
    data_dir: Option<std::path::PathBuf>,

    /// Log level filter (e.g., "canonhost=debug,tower_http=info")
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let args = Args::parse();

    let mut config = AppConfig::load(&args.config)?;
    if let Some(data_dir) = args.data_dir {
        config.data.directory = data_dir;
    }

    // Initialize tracing with priority: CLI > env > default
    let log_filter = args
        .log_level
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

    let registry =
        tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::new(&log_filter));
    if config.logging.is_json() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!(path = %args.config, "Loaded configuration");

    let state = AppState::new(&config);

    // First load happens here so a broken record shows up at startup, not on first request
    match state.provider.get_configuration() {
        Ok(current) if current.canonical_host.is_empty() => {
            tracing::info!(
                record = %config.data.configuration_path().display(),
                "No canonical host configured, redirects disabled until one is set"
            );
        }
        Ok(current) => {
            tracing::info!(canonical_host = %current.canonical_host, "Enforcing canonical host");
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                record = %config.data.configuration_path().display(),
                "Configuration record unusable, redirects disabled until it is fixed"
            );
        }
    }

    let app = create_router(state);
    start_server(app, &config).await?;

    Ok(())
}
