//! Arrival orchestration.
//!
//! The orchestration protocol between the synchronous gateway and the
//! asynchronous worker:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                   ArrivalOrchestrator                         │
//! │  submit(): conflict check ─► ledger PENDING ─► try_submit()  │
//! │  query_status(): ledger read, PENDING for unknown ids        │
//! ├──────────────────────────────────────────────────────────────┤
//! │                   ArrivalSubmitter (mpsc)                     │
//! ├──────────────────────────────────────────────────────────────┤
//! │                     ArrivalWorker                             │
//! │  one task per job: STARTED ─► load ─► travel delay ─►        │
//! │  assign ─► SUCCESS/FAILURE ─► notify (outside busy bracket)  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Submission returns before execution completes; the only designed
//! suspension point is the travel-time delay, cancellable solely by process
//! shutdown. Arrivals for different locomotives execute concurrently with no
//! cross-task ordering.

mod error;
mod orchestrator;
mod worker;

pub use error::ArrivalError;
pub use orchestrator::{ArrivalJob, ArrivalOrchestrator, ArrivalSubmitter, ArrivalTicket};
pub use worker::{ArrivalWorker, ArrivalWorkerConfig, DEFAULT_QUEUE_CAPACITY};
