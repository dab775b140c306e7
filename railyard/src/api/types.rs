//! Gateway request and response payloads.

use crate::ledger::TaskStatus;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body of `POST /railstations/{id}/arrival`.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArrivalRequest {
    pub locomotive_id: i64,
    /// Subscriber to notify when the arrival completes.
    #[serde(default)]
    pub notify_url: Option<String>,
}

/// Body of the 202 response to an arrival submission.
#[derive(Clone, Debug, Serialize)]
pub struct ArrivalResponse {
    pub railwaystation_id: i64,
    pub locomotive_id: i64,
    pub task_id: Uuid,
    /// Snapshot of the station's arrival duration, in seconds.
    pub estimated_duration: f64,
    pub notify_url: Option<String>,
    pub status: TaskStatus,
}

/// Body of `GET /task-status/{task_id}`.
#[derive(Clone, Debug, Serialize)]
pub struct TaskStatusResponse {
    pub task_id: Uuid,
    pub status: TaskStatus,
}

/// Query parameters of `GET /railstations`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ListStationsQuery {
    /// Restrict to stations currently hosting a locomotive with this name.
    pub locomotive_name: Option<String>,
}
