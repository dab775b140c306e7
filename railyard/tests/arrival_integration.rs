//! Integration tests for the arrival pipeline.
//!
//! These tests run the real worker against an in-memory catalog and verify:
//! - A submitted arrival runs to SUCCESS and assigns the locomotive
//! - Task status is observable while the arrival is in flight
//! - A second arrival for an assigned locomotive is rejected with a conflict

use railyard::arrival::{
    ArrivalError, ArrivalOrchestrator, ArrivalWorker, ArrivalWorkerConfig,
};
use railyard::catalog::{EngineType, NewLocomotive, NewStation, SqliteCatalog};
use railyard::ledger::{TaskLedger, TaskStatus};
use railyard::notify::HttpNotifier;
use railyard::state::BusySignal;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

// =============================================================================
// Test Helpers
// =============================================================================

struct Pipeline {
    catalog: Arc<SqliteCatalog>,
    orchestrator: ArrivalOrchestrator,
    shutdown: CancellationToken,
    worker_handle: tokio::task::JoinHandle<()>,
}

impl Pipeline {
    async fn stop(self) {
        self.shutdown.cancel();
        let _ = self.worker_handle.await;
    }
}

async fn pipeline() -> Pipeline {
    let catalog = Arc::new(SqliteCatalog::in_memory().await.unwrap());
    let ledger = TaskLedger::new();
    let busy = BusySignal::in_process();

    let (worker, submitter) = ArrivalWorker::new(
        ArrivalWorkerConfig::default(),
        catalog.clone(),
        ledger.clone(),
        busy,
        Arc::new(HttpNotifier::new()),
    );
    let shutdown = CancellationToken::new();
    let worker_handle = tokio::spawn(worker.run(shutdown.clone()));

    let orchestrator = ArrivalOrchestrator::new(catalog.clone(), ledger, submitter);

    Pipeline {
        catalog,
        orchestrator,
        shutdown,
        worker_handle,
    }
}

async fn seed(catalog: &SqliteCatalog, arrival_duration: f64) -> (i64, i64) {
    let station = catalog
        .create_station(NewStation {
            name: "Warsaw Central".to_string(),
            longitude: 21.003,
            latitude: 52.228,
            arrival_duration,
            departure_duration: 0.1,
        })
        .await
        .unwrap();
    let locomotive = catalog
        .create_locomotive(NewLocomotive {
            name: "EP09-021".to_string(),
            number: "021".to_string(),
            engine_type: EngineType::Electric,
        })
        .await
        .unwrap();
    (station.id, locomotive.id)
}

async fn wait_for_status(
    orchestrator: &ArrivalOrchestrator,
    task_id: &Uuid,
    wanted: TaskStatus,
) -> TaskStatus {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        let status = orchestrator.query_status(task_id);
        if status == wanted || tokio::time::Instant::now() >= deadline {
            return status;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

// =============================================================================
// Integration Tests
// =============================================================================

#[tokio::test]
async fn test_arrival_runs_to_success_and_assigns() {
    let p = pipeline().await;
    let (station_id, locomotive_id) = seed(&p.catalog, 0.05).await;

    let ticket = p
        .orchestrator
        .submit(station_id, locomotive_id, None)
        .await
        .unwrap();
    assert_eq!(ticket.status, TaskStatus::Pending);
    assert!((ticket.estimated_duration - 0.05).abs() < f64::EPSILON);

    let status = wait_for_status(&p.orchestrator, &ticket.task_id, TaskStatus::Success).await;
    assert_eq!(status, TaskStatus::Success);

    let current = p.catalog.current_station(locomotive_id).await.unwrap();
    assert_eq!(current, Some(station_id));

    p.stop().await;
}

#[tokio::test]
async fn test_status_observable_during_travel() {
    let p = pipeline().await;
    let (station_id, locomotive_id) = seed(&p.catalog, 0.3).await;

    let ticket = p
        .orchestrator
        .submit(station_id, locomotive_id, None)
        .await
        .unwrap();

    // While the travel delay runs the task reads PENDING or STARTED, never
    // a terminal state.
    tokio::time::sleep(Duration::from_millis(50)).await;
    let mid = p.orchestrator.query_status(&ticket.task_id);
    assert!(!mid.is_terminal(), "unexpected terminal status {mid} mid-travel");

    let status = wait_for_status(&p.orchestrator, &ticket.task_id, TaskStatus::Success).await;
    assert_eq!(status, TaskStatus::Success);

    p.stop().await;
}

#[tokio::test]
async fn test_second_arrival_conflicts_after_assignment() {
    let p = pipeline().await;
    let (station_id, locomotive_id) = seed(&p.catalog, 0.05).await;

    let ticket = p
        .orchestrator
        .submit(station_id, locomotive_id, None)
        .await
        .unwrap();
    wait_for_status(&p.orchestrator, &ticket.task_id, TaskStatus::Success).await;

    let err = p
        .orchestrator
        .submit(station_id, locomotive_id, None)
        .await
        .unwrap_err();
    match err {
        ArrivalError::Conflict { .. } => {}
        other => panic!("expected conflict, got {other:?}"),
    }

    p.stop().await;
}

#[tokio::test]
async fn test_unknown_station_and_locomotive_are_rejected() {
    let p = pipeline().await;
    let (station_id, locomotive_id) = seed(&p.catalog, 0.05).await;

    let err = p
        .orchestrator
        .submit(1000, locomotive_id, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ArrivalError::StationNotFound(1000)));

    let err = p
        .orchestrator
        .submit(station_id, 1000, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ArrivalError::LocomotiveNotFound(1000)));

    p.stop().await;
}

#[tokio::test]
async fn test_unknown_task_id_reads_pending() {
    let p = pipeline().await;

    let status = p.orchestrator.query_status(&Uuid::new_v4());
    assert_eq!(status, TaskStatus::Pending);

    p.stop().await;
}
