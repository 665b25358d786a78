//! diskmon - a host-level disk I/O monitoring agent.
//!
//! The configuration subsystem is the heart of the crate: it loads a YAML
//! document named by `CONF_PATH`, publishes immutable snapshots through
//! [`config::LiveConfig`], and hot-reloads the document on file changes.
//! The collector, alert dispatcher, and metrics exporter are read-only
//! consumers of those snapshots.

pub mod alert;
pub mod cli;
pub mod collector;
pub mod config;
pub mod ebpf;
pub mod error;
pub mod exporter;

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::alert::AlertDispatcher;
use crate::cli::{Cli, Commands};
use crate::collector::IoCollector;
use crate::config::{loader, ConfigSource, LiveConfig, ReloadEvent};
use crate::exporter::{Metrics, MetricsServer};

/// Runs the agent with the provided CLI arguments.
pub async fn run(cli: Cli) -> Result<()> {
    setup_logging(cli.log_level())?;

    match cli.command {
        Commands::Run => run_agent().await,
        Commands::ConfigValidate => validate_config(),
        Commands::ConfigShow => show_config(),
    }
}

/// Initializes the tracing subscriber for structured logging.
fn setup_logging(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt()
        .with_env_filter(filter)
        .json()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    Ok(())
}

/// Runs the main agent loop until a shutdown signal arrives.
async fn run_agent() -> Result<()> {
    info!("starting diskmon agent");

    let live = LiveConfig::open()?;
    let snapshot = live.current();
    info!(
        http_port = snapshot.general.http_port,
        interval_seconds = snapshot.monitoring.interval_seconds,
        "configuration loaded"
    );

    ebpf::report_plan(&snapshot.ebpf);
    let prometheus_enabled = snapshot.prometheus.enabled;
    drop(snapshot);

    let cancel = CancellationToken::new();

    // Hot reload: fails startup if the watch cannot be established.
    let (reload_tx, mut reload_rx) = mpsc::channel(16);
    let watch_session = live.watch_with_events(cancel.clone(), reload_tx)?;
    info!("config hot-reload enabled");

    let metrics = Arc::new(Metrics::new()?);

    if prometheus_enabled {
        let server = MetricsServer::new(metrics.clone(), live.clone());
        let server_cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(e) = server.run(server_cancel).await {
                error!(error = %e, "prometheus server failed");
            }
        });
    }

    let (sample_tx, mut sample_rx) = mpsc::channel(100);
    let collector = IoCollector::new(live.clone(), sample_tx);
    tokio::spawn(collector.run(cancel.clone()));
    info!("io collector started");

    let mut dispatcher = AlertDispatcher::new(live.clone());

    info!("diskmon agent is running. Press Ctrl+C to stop.");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown signal received");
                break;
            }

            Some(sample) = sample_rx.recv() => {
                metrics.record_sample(&sample);
                dispatcher.handle_sample(sample).await;
            }

            Some(event) = reload_rx.recv() => {
                match event {
                    ReloadEvent::Reloaded => metrics.record_reload_success(),
                    ReloadEvent::Failed => metrics.record_reload_failure(),
                }
            }
        }
    }

    cancel.cancel();
    watch_session.join().await;
    info!("shutdown complete");
    Ok(())
}

/// Validates the configuration file and reports the outcome.
fn validate_config() -> Result<()> {
    let source = ConfigSource::from_env()?;
    let config = loader::load(&source)?;

    println!("Configuration is valid.");
    println!(
        "  http_port: {}, interval: {}s, ebpf programs: {}",
        config.general.http_port,
        config.monitoring.interval_seconds,
        config.ebpf.programs.len()
    );

    Ok(())
}

/// Displays the parsed configuration.
fn show_config() -> Result<()> {
    let source = ConfigSource::from_env()?;
    let config = loader::load(&source)?;
    let yaml = serde_yaml::to_string(&config)?;
    println!("{}", yaml);
    Ok(())
}
