//! HTTP gateway.
//!
//! Thin axum layer translating inbound requests into catalog and
//! orchestrator calls:
//!
//! - `POST /railstations`: create a station (201, 409 on duplicate name)
//! - `GET /railstations`: list stations with their locomotives, optionally
//!   filtered by `locomotive_name`
//! - `GET /railstations/{id}`: one station with its locomotives (404)
//! - `POST /railstations/{id}/arrival`: submit an arrival (202, 404, 409)
//! - `GET /task-status/{task_id}`: poll a task (200 always; PENDING for
//!   unknown ids)
//!
//! Every request passes through the busy-signal middleware: the counter is
//! incremented at entry and the guard releases it on every exit path,
//! independent of the response.

mod error;
mod handlers;
mod types;

pub use error::ApiError;
pub use types::{ArrivalRequest, ArrivalResponse, ListStationsQuery, TaskStatusResponse};

use crate::arrival::ArrivalOrchestrator;
use crate::catalog::SqliteCatalog;
use crate::state::BusySignal;
use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

/// Shared state for the gateway handlers.
#[derive(Clone)]
pub struct ApiContext {
    pub catalog: Arc<SqliteCatalog>,
    pub orchestrator: Arc<ArrivalOrchestrator>,
    pub busy: BusySignal,
}

/// Builds the application router.
pub fn router(ctx: ApiContext) -> Router {
    let busy = ctx.busy.clone();

    Router::new()
        .route(
            "/railstations",
            post(handlers::create_station).get(handlers::list_stations),
        )
        .route("/railstations/:id", get(handlers::get_station))
        .route("/railstations/:id/arrival", post(handlers::submit_arrival))
        .route("/task-status/:task_id", get(handlers::task_status))
        .layer(middleware::from_fn(move |request: Request, next: Next| {
            let busy = busy.clone();
            async move {
                let _guard = busy.enter();
                next.run(request).await
            }
        }))
        .with_state(ctx)
}
