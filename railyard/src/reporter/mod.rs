//! Periodic application-state reporter.
//!
//! Reads the busy signal on an interval and POSTs
//! `{"state": "BUSY" | "STANDBY"}` to a configured URL so an external
//! monitor sees whether the service has work in flight. Delivery is
//! best-effort: failures are logged and the loop keeps going.

use crate::state::BusySignal;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Default seconds between state reports.
pub const DEFAULT_REPORT_INTERVAL_SECS: u64 = 10;

/// Long-running reporter task.
pub struct StateReporter {
    busy: BusySignal,
    client: reqwest::Client,
    state_url: String,
    interval: Duration,
}

impl StateReporter {
    pub fn new(busy: BusySignal, state_url: impl Into<String>, interval: Duration) -> Self {
        Self {
            busy,
            client: reqwest::Client::new(),
            state_url: state_url.into(),
            interval,
        }
    }

    /// Reports on the configured interval until shutdown.
    pub async fn run(self, shutdown: CancellationToken) {
        info!(url = %self.state_url, interval = ?self.interval, "State reporting started");

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => break,

                _ = tokio::time::sleep(self.interval) => {
                    self.send_state().await;
                }
            }
        }

        info!("State reporting shut down");
    }

    async fn send_state(&self) {
        let state = self.busy.read();
        let body = serde_json::json!({ "state": state.as_str() });

        match self.client.post(&self.state_url).json(&body).send().await {
            Ok(response) => {
                info!(
                    status = response.status().as_u16(),
                    state = state.as_str(),
                    "Reported application state"
                );
            }
            Err(err) => {
                error!(
                    error = %err,
                    state = state.as_str(),
                    url = %self.state_url,
                    "Could not report application state"
                );
            }
        }
    }
}
