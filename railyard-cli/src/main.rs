//! Railyard CLI - service entry point
//!
//! This binary wires the railyard library together: catalog, arrival worker,
//! state reporter and HTTP gateway, then serves until Ctrl-C.

use clap::Parser;
use railyard::api::{self, ApiContext};
use railyard::arrival::{ArrivalOrchestrator, ArrivalWorker, ArrivalWorkerConfig};
use railyard::catalog::{CatalogError, SqliteCatalog};
use railyard::config::Settings;
use railyard::ledger::TaskLedger;
use railyard::logging::init_logging;
use railyard::notify::HttpNotifier;
use railyard::reporter::StateReporter;
use railyard::state::BusySignal;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[derive(Parser)]
#[command(name = "railyard")]
#[command(version = railyard::VERSION)]
#[command(about = "Track locomotive arrivals at railway stations", long_about = None)]
struct Args {
    /// Address to bind the HTTP gateway to (host:port)
    #[arg(long)]
    bind: Option<String>,

    /// Database URL, e.g. sqlite://railyard.db?mode=rwc
    #[arg(long)]
    database_url: Option<String>,

    /// Capacity of the arrival queue
    #[arg(long)]
    queue_capacity: Option<usize>,

    /// Endpoint to POST the BUSY/STANDBY state to; disables reporting if unset
    #[arg(long)]
    state_url: Option<String>,

    /// Seconds between state reports
    #[arg(long)]
    state_interval: Option<u64>,

    /// Log file path; logs go to stdout only if unset
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

fn main() {
    let args = Args::parse();

    if let Err(err) = run(args) {
        eprintln!("Error: {}", err);
        process::exit(1);
    }
}

#[tokio::main]
async fn run(args: Args) -> Result<(), CliError> {
    let mut settings = Settings::from_env();
    if let Some(bind) = args.bind {
        settings.bind_addr = bind;
    }
    if let Some(url) = args.database_url {
        settings.database_url = url;
    }
    if let Some(capacity) = args.queue_capacity {
        settings.queue_capacity = capacity;
    }
    if let Some(url) = args.state_url {
        settings.state_url = Some(url);
    }
    if let Some(secs) = args.state_interval {
        settings.state_interval = Duration::from_secs(secs);
    }

    let _logging = init_logging(args.log_file.as_deref())?;
    info!(version = railyard::VERSION, "Starting railyard");

    let catalog = Arc::new(SqliteCatalog::connect(&settings.database_url).await?);
    catalog.init_schema().await?;
    info!(database_url = %settings.database_url, "Catalog ready");

    let ledger = TaskLedger::new();
    let busy = BusySignal::in_process();
    let notifier = Arc::new(HttpNotifier::new());

    let shutdown = CancellationToken::new();

    let worker_config = ArrivalWorkerConfig {
        queue_capacity: settings.queue_capacity,
    };
    let (worker, submitter) = ArrivalWorker::new(
        worker_config,
        catalog.clone(),
        ledger.clone(),
        busy.clone(),
        notifier,
    );
    let worker_handle = tokio::spawn(worker.run(shutdown.clone()));

    if let Some(state_url) = settings.state_url.clone() {
        info!(state_url = %state_url, interval = ?settings.state_interval, "State reporting enabled");
        let reporter = StateReporter::new(busy.clone(), state_url, settings.state_interval);
        tokio::spawn(reporter.run(shutdown.clone()));
    }

    let orchestrator = Arc::new(ArrivalOrchestrator::new(
        catalog.clone(),
        ledger.clone(),
        submitter,
    ));

    let app = api::router(ApiContext {
        catalog,
        orchestrator,
        busy,
    });

    let listener = tokio::net::TcpListener::bind(&settings.bind_addr).await?;
    info!(bind_addr = %settings.bind_addr, "Gateway listening");

    let serve_shutdown = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received");
            serve_shutdown.cancel();
        }
    });

    let wait_shutdown = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { wait_shutdown.cancelled().await })
        .await?;

    shutdown.cancel();
    let _ = worker_handle.await;
    info!("Railyard stopped");

    Ok(())
}
