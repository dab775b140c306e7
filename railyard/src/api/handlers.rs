//! Gateway request handlers.

use super::error::ApiError;
use super::types::{ArrivalRequest, ArrivalResponse, ListStationsQuery, TaskStatusResponse};
use super::ApiContext;
use crate::catalog::{NewStation, Station, StationView};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

/// `POST /railstations`: create a station.
pub async fn create_station(
    State(ctx): State<ApiContext>,
    Json(new): Json<NewStation>,
) -> Result<(StatusCode, Json<Station>), ApiError> {
    let station = ctx.catalog.create_station(new).await?;
    Ok((StatusCode::CREATED, Json(station)))
}

/// `GET /railstations`: list stations with their locomotives.
pub async fn list_stations(
    State(ctx): State<ApiContext>,
    Query(query): Query<ListStationsQuery>,
) -> Result<Json<Vec<StationView>>, ApiError> {
    let views = ctx
        .catalog
        .list_stations(query.locomotive_name.as_deref())
        .await?;
    Ok(Json(views))
}

/// `GET /railstations/{id}`: one station with its locomotives.
pub async fn get_station(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
) -> Result<Json<StationView>, ApiError> {
    let station = ctx
        .catalog
        .station(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Station with id {id} not found.")))?;
    let locomotives = ctx.catalog.locomotives_at(id).await?;
    Ok(Json(StationView::new(station, locomotives)))
}

/// `POST /railstations/{id}/arrival`: submit an arrival.
///
/// Returns 202 immediately; execution happens on the worker. 404 when the
/// station or locomotive is unknown, 409 when the locomotive already has a
/// station.
pub async fn submit_arrival(
    State(ctx): State<ApiContext>,
    Path(station_id): Path<i64>,
    Json(request): Json<ArrivalRequest>,
) -> Result<(StatusCode, Json<ArrivalResponse>), ApiError> {
    let ticket = ctx
        .orchestrator
        .submit(station_id, request.locomotive_id, request.notify_url.clone())
        .await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(ArrivalResponse {
            railwaystation_id: station_id,
            locomotive_id: request.locomotive_id,
            task_id: ticket.task_id,
            estimated_duration: ticket.estimated_duration,
            notify_url: request.notify_url,
            status: ticket.status,
        }),
    ))
}

/// `GET /task-status/{task_id}`: poll a task.
///
/// Always 200. Unknown ids report PENDING: a poll can race the ledger write
/// of a freshly submitted task, and callers are expected to keep polling.
pub async fn task_status(
    State(ctx): State<ApiContext>,
    Path(task_id): Path<Uuid>,
) -> Json<TaskStatusResponse> {
    let status = ctx.orchestrator.query_status(&task_id);
    Json(TaskStatusResponse { task_id, status })
}
