//! Submission side of arrival orchestration.
//!
//! [`ArrivalOrchestrator`] is what the gateway calls: it validates the
//! conflict rule, records the task as PENDING, and hands the job to the
//! worker over the channel, returning an [`ArrivalTicket`] without waiting
//! for execution.

use super::error::ArrivalError;
use crate::catalog::SqliteCatalog;
use crate::ledger::{TaskLedger, TaskStatus};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

/// A job handed from the orchestrator to the worker.
#[derive(Clone, Debug)]
pub struct ArrivalJob {
    /// Ledger key, generated at submission.
    pub task_id: Uuid,
    pub station_id: i64,
    pub locomotive_id: i64,
    /// Subscriber to notify on completion, if any.
    pub notify_url: Option<String>,
}

/// What the caller gets back from a successful submission.
#[derive(Clone, Debug)]
pub struct ArrivalTicket {
    pub task_id: Uuid,
    /// Snapshot of the station's arrival duration at submission time, in
    /// seconds. Not re-read later.
    pub estimated_duration: f64,
    /// Ledger status at the time the ticket was issued.
    pub status: TaskStatus,
}

/// Sending half of the worker channel.
///
/// Cloneable; created together with its [`ArrivalWorker`](super::ArrivalWorker).
#[derive(Clone, Debug)]
pub struct ArrivalSubmitter {
    sender: mpsc::Sender<ArrivalJob>,
}

impl ArrivalSubmitter {
    pub(crate) fn new(sender: mpsc::Sender<ArrivalJob>) -> Self {
        Self { sender }
    }

    /// Hands a job to the worker without waiting.
    ///
    /// Fails if the worker has shut down or the queue is at capacity.
    pub fn try_submit(&self, job: ArrivalJob) -> Result<(), ArrivalError> {
        self.sender
            .try_send(job)
            .map_err(|_| ArrivalError::QueueUnavailable)
    }
}

/// The arrival orchestrator.
pub struct ArrivalOrchestrator {
    catalog: Arc<SqliteCatalog>,
    ledger: TaskLedger,
    submitter: ArrivalSubmitter,
}

impl ArrivalOrchestrator {
    pub fn new(catalog: Arc<SqliteCatalog>, ledger: TaskLedger, submitter: ArrivalSubmitter) -> Self {
        Self {
            catalog,
            ledger,
            submitter,
        }
    }

    /// Submits an arrival, returning immediately with a ticket.
    ///
    /// Fails with `StationNotFound`/`LocomotiveNotFound` if either id does
    /// not resolve, and with `Conflict` if the locomotive already has a
    /// station; in both cases no task is created and nothing is enqueued.
    /// A handoff failure (`QueueUnavailable`) rolls the ledger entry back,
    /// so it leaves no task behind either.
    ///
    /// The conflict check is a plain read of the locomotive's station
    /// reference at call time; no lock is held between the check and the
    /// handoff. Two submissions racing for the same locomotive before either
    /// worker writes state can both pass the check. This is accepted: the
    /// assignment write is last-writer-wins and the window is the travel
    /// delay of the first task.
    pub async fn submit(
        &self,
        station_id: i64,
        locomotive_id: i64,
        notify_url: Option<String>,
    ) -> Result<ArrivalTicket, ArrivalError> {
        let station = self
            .catalog
            .station(station_id)
            .await?
            .ok_or(ArrivalError::StationNotFound(station_id))?;
        let locomotive = self
            .catalog
            .locomotive(locomotive_id)
            .await?
            .ok_or(ArrivalError::LocomotiveNotFound(locomotive_id))?;

        if let Some(current_id) = locomotive.railwaystation_id {
            let station_name = self
                .catalog
                .station(current_id)
                .await?
                .map(|s| s.name)
                .unwrap_or_else(|| current_id.to_string());
            return Err(ArrivalError::Conflict {
                locomotive: locomotive.name,
                station: station_name,
            });
        }

        let task_id = Uuid::new_v4();
        self.ledger.create(task_id, TaskStatus::Pending);

        let job = ArrivalJob {
            task_id,
            station_id,
            locomotive_id,
            notify_url,
        };
        if let Err(err) = self.submitter.try_submit(job) {
            // Roll back the entry so a job that never reached the worker
            // leaves no PENDING record behind.
            self.ledger.remove(&task_id);
            warn!(%task_id, "Arrival job could not be handed to the worker");
            return Err(err);
        }

        debug!(
            %task_id,
            station_id,
            locomotive_id,
            estimated_duration = station.arrival_duration,
            "Arrival submitted"
        );

        Ok(ArrivalTicket {
            task_id,
            estimated_duration: station.arrival_duration,
            status: self.ledger.status_or_pending(&task_id),
        })
    }

    /// Reads the status of a task.
    ///
    /// Pure ledger read with no side effect. Unknown ids report PENDING
    /// rather than an error, since a poll can race the ledger write of a
    /// freshly submitted task.
    pub fn query_status(&self, task_id: &Uuid) -> TaskStatus {
        self.ledger.status_or_pending(task_id)
    }
}

impl std::fmt::Debug for ArrivalOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArrivalOrchestrator")
            .field("recorded_tasks", &self.ledger.len())
            .finish()
    }
}
