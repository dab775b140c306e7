//! Arrival error types.

use crate::catalog::CatalogError;
use thiserror::Error;

/// Errors surfaced to the caller at submission time.
///
/// Failures during execution are never surfaced here; they are recorded in
/// the task ledger as FAILURE and discovered by status poll.
#[derive(Debug, Error)]
pub enum ArrivalError {
    /// The requested station id does not resolve.
    #[error("Station with id {0} not found.")]
    StationNotFound(i64),

    /// The requested locomotive id does not resolve.
    #[error("Locomotive with id {0} not found.")]
    LocomotiveNotFound(i64),

    /// The locomotive already has a current station.
    #[error("Locomotive {locomotive} has been already on a station {station}")]
    Conflict {
        locomotive: String,
        station: String,
    },

    /// The worker channel is closed or full; the job could not be handed off.
    #[error("arrival queue unavailable")]
    QueueUnavailable,

    /// Catalog failure while resolving the request.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
