//! Execution side of arrival orchestration.
//!
//! The [`ArrivalWorker`] consumes jobs from the channel and spawns one task
//! per job, so arrivals for different locomotives run concurrently. Each
//! execution holds the busy signal from the STARTED transition through the
//! terminal ledger write; the completion notification runs outside that
//! bracket, and its outcome never alters the terminal status.

use super::orchestrator::{ArrivalJob, ArrivalSubmitter};
use crate::catalog::{CatalogError, SqliteCatalog};
use crate::ledger::{TaskLedger, TaskStatus};
use crate::notify::{ArrivalNotice, Notifier};
use crate::state::BusySignal;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Default capacity of the job channel.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Worker configuration.
#[derive(Clone, Debug)]
pub struct ArrivalWorkerConfig {
    /// Job channel capacity. Submissions fail once the queue is full.
    pub queue_capacity: usize,
}

impl Default for ArrivalWorkerConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

/// Shared context cloned into every spawned execution.
#[derive(Clone)]
struct WorkerContext {
    catalog: Arc<SqliteCatalog>,
    ledger: TaskLedger,
    busy: BusySignal,
    notifier: Arc<dyn Notifier>,
}

/// The arrival worker: receives jobs and executes them to a terminal state.
pub struct ArrivalWorker {
    rx: mpsc::Receiver<ArrivalJob>,
    ctx: WorkerContext,
}

impl ArrivalWorker {
    /// Creates the worker and its paired submitter.
    pub fn new(
        config: ArrivalWorkerConfig,
        catalog: Arc<SqliteCatalog>,
        ledger: TaskLedger,
        busy: BusySignal,
        notifier: Arc<dyn Notifier>,
    ) -> (Self, ArrivalSubmitter) {
        let (tx, rx) = mpsc::channel(config.queue_capacity);
        let worker = Self {
            rx,
            ctx: WorkerContext {
                catalog,
                ledger,
                busy,
                notifier,
            },
        };
        (worker, ArrivalSubmitter::new(tx))
    }

    /// Main loop: dispatch each received job onto its own task.
    ///
    /// Runs until the shutdown token fires or every submitter is dropped.
    /// In-flight executions observe the same token and abandon their travel
    /// delay on shutdown; a task interrupted that way is lost (no
    /// checkpoint/resume).
    pub async fn run(mut self, shutdown: CancellationToken) {
        info!("Arrival worker starting");

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    info!("Arrival worker shutting down");
                    break;
                }

                job = self.rx.recv() => {
                    match job {
                        Some(job) => {
                            let ctx = self.ctx.clone();
                            let token = shutdown.clone();
                            tokio::spawn(async move {
                                execute(ctx, job, token).await;
                            });
                        }
                        None => {
                            info!("Arrival queue closed, worker stopping");
                            break;
                        }
                    }
                }
            }
        }
    }
}

/// Failures inside the execution sequence.
#[derive(Debug, Error)]
enum ExecuteError {
    #[error("station {0} vanished before arrival")]
    StationVanished(i64),

    #[error("locomotive {0} vanished before arrival")]
    LocomotiveVanished(i64),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl ExecuteError {
    /// Short class name recorded in the ledger.
    fn class(&self) -> &'static str {
        match self {
            Self::StationVanished(_) => "StationVanished",
            Self::LocomotiveVanished(_) => "LocomotiveVanished",
            Self::Catalog(_) => "CatalogError",
        }
    }
}

/// Why an execution stopped before reaching its terminal write.
enum Halt {
    /// Process shutdown interrupted the travel delay. No terminal state is
    /// written and no notification goes out; the task is abandoned.
    Shutdown,
    /// A step failed; the task transitions to FAILURE.
    Failed(ExecuteError),
}

impl From<CatalogError> for Halt {
    fn from(err: CatalogError) -> Self {
        Self::Failed(ExecuteError::Catalog(err))
    }
}

/// Executes one arrival job to a terminal state, then notifies.
///
/// The busy signal brackets everything up to and including the terminal
/// ledger write; the notification runs after the bracket is released.
async fn execute(ctx: WorkerContext, job: ArrivalJob, shutdown: CancellationToken) {
    let status = {
        let _busy = ctx.busy.enter();
        ctx.ledger.transition(job.task_id, TaskStatus::Started);

        match run_arrival(&ctx, &job, &shutdown).await {
            Ok(()) => {
                ctx.ledger.transition(job.task_id, TaskStatus::Success);
                info!(
                    task_id = %job.task_id,
                    station_id = job.station_id,
                    locomotive_id = job.locomotive_id,
                    "Arrival finished"
                );
                TaskStatus::Success
            }
            Err(Halt::Shutdown) => {
                warn!(task_id = %job.task_id, "Shutdown during travel, task abandoned");
                return;
            }
            Err(Halt::Failed(err)) => {
                error!(task_id = %job.task_id, error = %err, "Arrival failed");
                ctx.ledger.fail(job.task_id, err.class());
                TaskStatus::Failure
            }
        }
    };

    if let Some(url) = &job.notify_url {
        let notice = ArrivalNotice {
            railwaystation_id: job.station_id,
            locomotive_id: job.locomotive_id,
            notify_url: url.clone(),
            status,
        };
        if let Err(err) = ctx.notifier.notify(notice).await {
            warn!(
                task_id = %job.task_id,
                error = %err,
                "Completion notification failed"
            );
        }
    }
}

/// Steps 2-4 of the execution sequence: load, travel delay, assignment.
async fn run_arrival(
    ctx: &WorkerContext,
    job: &ArrivalJob,
    shutdown: &CancellationToken,
) -> Result<(), Halt> {
    let station = ctx
        .catalog
        .station(job.station_id)
        .await?
        .ok_or(Halt::Failed(ExecuteError::StationVanished(job.station_id)))?;
    let locomotive = ctx
        .catalog
        .locomotive(job.locomotive_id)
        .await?
        .ok_or(Halt::Failed(ExecuteError::LocomotiveVanished(
            job.locomotive_id,
        )))?;

    // The one designed suspension point: simulated travel time.
    let travel = Duration::from_secs_f64(station.arrival_duration.max(0.0));
    tokio::select! {
        _ = shutdown.cancelled() => return Err(Halt::Shutdown),
        _ = tokio::time::sleep(travel) => {}
    }

    ctx.catalog.assign(locomotive.id, station.id).await?;
    Ok(())
}
