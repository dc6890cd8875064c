//! Tablepoll daemon - polls one source table and prints new rows to stdout

mod settings;
mod sink;

use anyhow::{Context, Result};
use settings::{load_fallback, Settings, FALLBACK_PROPERTIES_FILE};
use sink::LineSink;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tablepoll_core::application::{shutdown_channel, ExtractionJob, PollRunner};
use tablepoll_core::domain::ConnectionSettings;
use tablepoll_core::error::AppError;
use tablepoll_core::port::SourceConnector;
use tablepoll_infra_mysql::MySqlSourceConnector;
use tablepoll_infra_sqlite::{
    create_pool, run_migrations, SqliteCheckpointStore, SqliteSourceConnector,
};
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Logging (stdout carries records, logs go to stderr)
    let _log_guard = init_tracing()?;
    info!("Tablepoll v{} starting...", VERSION);

    // 2. Configuration
    let fallback = load_fallback(FALLBACK_PROPERTIES_FILE)
        .with_context(|| format!("reading {}", FALLBACK_PROPERTIES_FILE))?;
    let settings = Settings::load().context("loading settings")?;
    let job_config = settings.job_config(fallback)?;
    job_config.validate()?;

    // 3. Checkpoint database
    let db_path = settings.metadata_db();
    let db_file = db_path
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:");
    if !db_file.contains(":memory:") {
        if let Some(parent) = Path::new(db_file).parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    info!(db_path = %db_path, "Initializing checkpoint database...");
    let pool = create_pool(&db_path)
        .await
        .map_err(|e| anyhow::anyhow!("DB pool creation failed: {}", e))?;
    run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;

    // 4. Wiring
    let connector = source_connector(&job_config.connection)?;
    let store = Arc::new(SqliteCheckpointStore::new(pool.clone()));
    let sink = Arc::new(LineSink::stdout());
    let table = job_config.table.clone();
    let mut job = ExtractionJob::new(job_config, connector, store, sink);

    if let Err(e) = job.open().await {
        error!(table = %table, error = %e, fatal = e.is_fatal(), "Job failed to start");
        return Err(e.into());
    }

    // 5. Poll loop
    let (shutdown_tx, shutdown_rx) = shutdown_channel();
    let mut runner_handle = tokio::spawn(PollRunner::new(job).run(shutdown_rx));

    info!(table = %table, "System ready. Press Ctrl+C to shutdown");

    // 6. Wait for a signal, or for the runner to stop on its own
    tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal?;
            info!("Shutdown signal received. Exiting gracefully...");
            shutdown_tx.shutdown();
            match tokio::time::timeout(SHUTDOWN_TIMEOUT, &mut runner_handle).await {
                Ok(Ok(Ok(stats))) => info!(?stats, "Poll runner finished"),
                Ok(Ok(Err(e))) => error!(error = %e, "Poll runner failed"),
                Ok(Err(e)) => error!(error = %e, "Poll runner panicked"),
                Err(_) => warn!("Poll runner did not stop in time"),
            }
        }
        result = &mut runner_handle => {
            match result {
                Ok(Ok(stats)) => warn!(?stats, "Poll runner stopped unexpectedly"),
                Ok(Err(e)) => error!(error = %e, "Poll runner failed"),
                Err(e) => error!(error = %e, "Poll runner panicked"),
            }
        }
    }

    pool.close().await;
    info!("Shutdown complete.");
    Ok(())
}

/// Install the subscriber; the guard keeps the file writer flushing
fn init_tracing() -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("tablepoll=info"))
        .context("Failed to create env filter")?;

    let log_format =
        std::env::var("TABLEPOLL_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();
    match log_format.as_str() {
        // Production: JSON structured logging
        "json" => layers.push(fmt::layer().json().with_writer(std::io::stderr).boxed()),
        // Development: pretty formatting
        _ => layers.push(fmt::layer().pretty().with_writer(std::io::stderr).boxed()),
    }

    let guard = match std::env::var("TABLEPOLL_LOG_DIR") {
        Ok(dir) => {
            let dir = shellexpand::tilde(&dir).into_owned();
            let appender = tracing_appender::rolling::daily(dir, "tablepoll.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            layers.push(
                fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_writer(writer)
                    .boxed(),
            );
            Some(guard)
        }
        Err(_) => None,
    };

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .init();
    Ok(guard)
}

/// Pick the source adapter from the URL scheme
fn source_connector(
    settings: &ConnectionSettings,
) -> tablepoll_core::Result<Arc<dyn SourceConnector>> {
    let url = settings.url();
    let scheme = url.split(':').next().unwrap_or_default();
    match scheme {
        "sqlite" => Ok(Arc::new(SqliteSourceConnector::new(settings)?)),
        "mysql" => Ok(Arc::new(MySqlSourceConnector::new(settings)?)),
        other => Err(AppError::Config(format!(
            "unsupported source url scheme: {}",
            other
        ))),
    }
}
