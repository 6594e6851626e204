//! Dialog Bridge — forwards bot conversation events to Dialog Analytics.
//!
//! Main entry point that loads configuration, wires the tracker and
//! middleware chain, and starts the server.

use clap::Parser;
use dialog_analytics::{DialogClient, Tracker};
use dialog_api::{ApiServer, AppState};
use dialog_core::config::AppConfig;
use dialog_core::CredentialStore;
use dialog_middleware::MiddlewareChain;
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "dialog-bridge")]
#[command(about = "Forwards bot conversation events to Dialog Analytics")]
#[command(version)]
struct Cli {
    /// Optional TOML configuration file
    #[arg(long, env = "DIALOG_BRIDGE_CONFIG")]
    config: Option<PathBuf>,

    /// HTTP port (overrides config)
    #[arg(long, env = "DIALOG_BRIDGE__API__HTTP_PORT")]
    http_port: Option<u16>,

    /// Credentials file (overrides config)
    #[arg(long, env = "DIALOG_BRIDGE__CREDENTIALS__PATH")]
    credentials: Option<String>,

    /// Do not start the Prometheus exporter
    #[arg(long, default_value_t = false)]
    no_metrics: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "dialog_bridge=info,dialog_analytics=info,dialog_middleware=info,tower_http=info"
                    .into()
            }),
        )
        .json()
        .init();

    let cli = Cli::parse();

    info!("Dialog Bridge starting up");

    let mut config = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) if cli.config.is_some() => return Err(e.into()),
        Err(e) => {
            warn!(error = %e, "Failed to load config, using defaults");
            AppConfig::default()
        }
    };

    // Apply CLI overrides
    if let Some(port) = cli.http_port {
        config.api.http_port = port;
    }
    if let Some(path) = cli.credentials {
        config.credentials.path = path;
    }
    if cli.no_metrics {
        config.metrics.enabled = false;
    }

    info!(
        http_port = config.api.http_port,
        credentials = %config.credentials.path,
        analytics = %config.analytics.base_url,
        platforms = ?config.normalizer.platforms,
        kinds = ?config.normalizer.kinds,
        "Configuration loaded"
    );

    let store = CredentialStore::from_config(&config.credentials);
    let credentials = store.load()?;
    if !credentials.is_complete() {
        warn!("Dialog credentials are not configured yet; set them through POST /config");
    }

    let client = Arc::new(DialogClient::new(&config.analytics, credentials)?);
    let tracker = Tracker::spawn(client.clone(), config.analytics.queue_capacity);
    let chain = MiddlewareChain::dialog(
        &config.normalizer,
        tracker.clone(),
        client.credentials(),
        client.context(),
    );

    for registration in chain.registrations() {
        info!(
            name = registration.name,
            direction = %registration.direction,
            order = registration.order,
            "{}",
            registration.description
        );
    }

    let state = AppState {
        store: Arc::new(store),
        client,
        chain: Arc::new(chain),
        tracker,
        config_lock: Arc::new(Mutex::new(())),
        start_time: Instant::now(),
    };

    let api_server = ApiServer::new(config.clone(), state);

    if config.metrics.enabled {
        if let Err(e) = api_server.start_metrics() {
            error!(error = %e, "Failed to start metrics exporter");
        }
    }

    info!("Dialog Bridge is ready to receive events");

    // Start HTTP server (blocks until shutdown)
    api_server.start_http().await?;

    Ok(())
}
