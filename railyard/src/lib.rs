//! Railyard - locomotive arrival tracking service
//!
//! This library tracks locomotives moving between railway stations. An HTTP
//! gateway accepts arrival requests, an asynchronous worker simulates the
//! travel time and commits the new assignment, and external subscribers can
//! poll task status or receive a completion notification.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        api (gateway)                          │
//! │  POST /railstations/{id}/arrival   GET /task-status/{id}     │
//! ├──────────────────────────────────────────────────────────────┤
//! │                     ArrivalOrchestrator                       │
//! │  conflict check ──► ledger PENDING ──► channel handoff       │
//! ├──────────────────────────────────────────────────────────────┤
//! │                       ArrivalWorker                           │
//! │  STARTED ──► travel delay ──► assign ──► terminal ──► notify │
//! ├────────────┬────────────────┬────────────────┬───────────────┤
//! │  catalog   │  ledger        │  state (busy)  │  notify       │
//! │  (sqlite)  │  (task status) │  (counter)     │  (HTTP GET)   │
//! └────────────┴────────────────┴────────────────┴───────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use railyard::arrival::{ArrivalOrchestrator, ArrivalWorker, ArrivalWorkerConfig};
//! use railyard::catalog::SqliteCatalog;
//! use railyard::ledger::TaskLedger;
//! use railyard::notify::HttpNotifier;
//! use railyard::state::BusySignal;
//!
//! let catalog = Arc::new(SqliteCatalog::connect(&settings.database_url).await?);
//! let ledger = TaskLedger::new();
//! let busy = BusySignal::in_process();
//!
//! let (worker, submitter) = ArrivalWorker::new(
//!     ArrivalWorkerConfig::default(),
//!     catalog.clone(),
//!     ledger.clone(),
//!     busy.clone(),
//!     Arc::new(HttpNotifier::new()),
//! );
//! tokio::spawn(worker.run(shutdown.clone()));
//!
//! let orchestrator = ArrivalOrchestrator::new(catalog, ledger, submitter);
//! let ticket = orchestrator.submit(station_id, locomotive_id, None).await?;
//! ```

pub mod api;
pub mod arrival;
pub mod catalog;
pub mod config;
pub mod ledger;
pub mod logging;
pub mod notify;
pub mod reporter;
pub mod state;

/// Version of the railyard library and CLI.
///
/// Defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
