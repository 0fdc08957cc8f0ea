pub mod cli;
pub mod config;
pub mod correlation;
pub mod db;
pub mod feed;
pub mod presence;
pub mod report;
pub mod scheduler;
mod utils;

use std::time::Instant;

use anyhow::{Context, Result};
use log::{info, warn};

use cli::{Cli, Command};
use config::Settings;
use correlation::{CorrelationScanner, ScanError};
use db::Database;
use feed::HttpSnapshotFeed;
use presence::PresencePoller;
use report::{render_not_found, render_report};
use scheduler::Scheduler;

/// Initializes `env_logger` once per process. `RUST_LOG` wins over the `info` default.
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

pub async fn run(cli: Cli) -> Result<()> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(db_path) = cli.db {
        settings.db_path = db_path;
    }

    match cli.command {
        Command::Watch => run_watch(settings).await,
        Command::Scan {
            name,
            window_secs,
            limit,
            json,
        } => run_scan(&settings, &name, window_secs, limit, json).await,
    }
}

/// Tracks presence until Ctrl-C or SIGTERM, then stops the scheduler so every
/// open session is closed before returning.
pub async fn run_watch(settings: Settings) -> Result<()> {
    info!("altwatch starting up...");

    let database = Database::new(settings.db_path.clone())?;

    // Rows left open by a previous run that died without shutting down. They are
    // reused when the character shows up online again.
    let dangling = database.count_open_sessions().await?;
    if dangling > 0 {
        warn!("Found {dangling} open sessions from a previous run");
    }

    let feed = HttpSnapshotFeed::new(&settings.feed_url, settings.feed_timeout())?;
    info!(
        "Polling {} every {}s",
        feed.url(),
        settings.poll_interval_secs
    );

    let mut scheduler = Scheduler::new();
    scheduler.register(Box::new(PresencePoller::new(
        feed,
        database,
        settings.poll_interval(),
    )))?;
    scheduler.start()?;

    let signal = shutdown_signal().await;
    match &signal {
        Ok(()) => info!("Shutdown requested"),
        Err(err) => warn!("Stopping after signal handler failure: {err:#}"),
    }

    scheduler.stop().await?;
    for (name, state) in scheduler.task_states() {
        info!("{name}: {}", state.as_str());
    }
    signal
}

pub async fn run_scan(
    settings: &Settings,
    name: &str,
    window_secs: Option<u64>,
    limit: Option<usize>,
    json: bool,
) -> Result<()> {
    let started = Instant::now();
    let database = Database::new(settings.db_path.clone())?;
    let scanner = CorrelationScanner::new(database.clone(), settings.thresholds);

    let window_secs = window_secs.unwrap_or(settings.scan_window_secs);
    let limit = limit.unwrap_or(settings.max_results);

    let report = match scanner.report(name, window_secs, limit).await {
        Ok(report) => report,
        Err(ScanError::TargetNotFound(_)) => {
            println!("{}", render_not_found(name));
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let analyzed = database.count_actors().await?;
    println!(
        "{}",
        render_report(
            name,
            &report,
            scanner.thresholds(),
            analyzed,
            started.elapsed()
        )
    );
    Ok(())
}

async fn shutdown_signal() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate =
            signal(SignalKind::terminate()).context("failed to install SIGTERM handler")?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result.context("failed to listen for Ctrl-C")?,
            _ = terminate.recv() => {}
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .context("failed to listen for Ctrl-C")?;
    }

    Ok(())
}
