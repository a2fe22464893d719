pub mod api;
pub mod cache;
pub mod cli;
pub mod clients;
pub mod config;
pub mod constants;
pub mod models;
pub mod services;
pub mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Commands};
pub use config::Config;
use state::SharedState;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load()?;
    config.validate()?;

    init_tracing(&config);

    match cli.command() {
        Commands::Serve => {
            let prometheus_handle = install_metrics_recorder(&config)?;
            serve(config, prometheus_handle).await
        }
        Commands::Config => {
            println!("{}", config.to_masked_toml()?);
            Ok(())
        }
        Commands::Init => {
            if Config::create_default_if_missing()? {
                println!("Created default config.toml");
            } else {
                println!("config.toml already exists, leaving it untouched");
            }
            Ok(())
        }
    }
}

fn init_tracing(config: &Config) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let mut log_level = config.general.log_level.clone();
    if config.general.suppress_connection_errors {
        log_level.push_str(",reqwest::retry=off,hyper_util=off");
    }

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn install_metrics_recorder(
    config: &Config,
) -> anyhow::Result<Option<metrics_exporter_prometheus::PrometheusHandle>> {
    if !config.observability.metrics_enabled {
        return Ok(None);
    }

    let handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;
    info!("Prometheus metrics recorder initialized");
    Ok(Some(handle))
}

async fn serve(
    config: Config,
    prometheus_handle: Option<metrics_exporter_prometheus::PrometheusHandle>,
) -> anyhow::Result<()> {
    info!(
        "earthlens v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    let credentials = &config.credentials;
    for (name, present) in [
        ("OPENCAGE_KEY", credentials.opencage_key.is_some()),
        ("OPENWEATHER_KEY", credentials.openweather_key.is_some()),
        ("TIMEZONEDB_KEY", credentials.timezonedb_key.is_some()),
    ] {
        if !present {
            tracing::warn!("{} not configured; its endpoint will answer with a configuration error", name);
        }
    }

    let addr = format!("{}:{}", config.server.bind_address, config.server.port);
    let purge_interval = Duration::from_secs(config.cache.purge_interval_seconds.max(1));

    let shared = Arc::new(SharedState::new(config)?);
    let purge_handle = shared.cache.clone().spawn_purge_task(purge_interval);

    let app = api::router(api::create_app_state(shared, prometheus_handle));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("🌐 Web Server running at http://{}", addr);

    let result = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await;

    purge_handle.abort();

    if let Err(e) = &result {
        error!("Web server error: {}", e);
    }
    info!("Server stopped");

    result.map_err(Into::into)
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => error!("Error listening for shutdown: {}", e),
    }
}
