//! plexsweep service entry point
//!
//! Loads configuration, starts the config reloader and runs retention cycles
//! until one fails. A failed cycle ends the process with a non-zero status.

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use plexsweep::config::{AppConfig, ConfigWatcher};
use plexsweep::jobs;
use plexsweep::services::{LogFileSink, PlexClient, ProgressEvent, ProgressSink};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "plexsweep=info".into());
    let registry = tracing_subscriber::registry().with(filter);
    if config.log_json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting plexsweep");

    let watcher = ConfigWatcher::load(&config.retention_config_path)
        .context("Failed to load retention config")?;
    let _reloader = watcher.spawn_reloader(config.config_reload_interval);

    let plex = PlexClient::new(&config.plex_url, config.plex_timeout)
        .context("Failed to build Plex client")?;
    tracing::info!(url = %config.plex_url, "Plex client ready");

    let sink = LogFileSink::create(&config.log_dir)
        .with_context(|| format!("Failed to open progress log in {}", config.log_dir.display()))?;
    tracing::info!(path = %sink.path().display(), "Progress log opened");
    sink.record(ProgressEvent::ServiceStarted);

    jobs::run_retention_loop(&*watcher, &plex, &sink, config.poll_interval)
        .await
        .context("Retention loop stopped")?;

    Ok(())
}
