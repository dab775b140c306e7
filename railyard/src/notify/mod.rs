//! Outbound completion notifications.
//!
//! When an arrival task reaches a terminal state and the submitter supplied a
//! notify URL, the worker issues a single HTTP GET to that URL carrying the
//! outcome as query parameters. Delivery is best-effort and fire-and-forget:
//! no retry, and a failed notification never alters the task's terminal
//! status (the worker logs it and moves on).

use crate::ledger::TaskStatus;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Payload of one completion notification.
#[derive(Clone, Debug)]
pub struct ArrivalNotice {
    pub railwaystation_id: i64,
    pub locomotive_id: i64,
    /// The subscriber URL, echoed back as a query parameter.
    pub notify_url: String,
    /// Terminal status of the task.
    pub status: TaskStatus,
}

/// Errors from dispatching a notification.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The supplied notify URL did not parse.
    #[error("invalid notify url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The request could not be sent or the endpoint answered with an error.
    #[error("notify request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Dispatches completion notifications.
///
/// Object safe so the worker can hold `Arc<dyn Notifier>`; tests substitute
/// recording or failing implementations.
pub trait Notifier: Send + Sync + 'static {
    /// Delivers one notification.
    fn notify(
        &self,
        notice: ArrivalNotice,
    ) -> Pin<Box<dyn Future<Output = Result<(), NotifyError>> + Send + '_>>;
}

/// Builds the GET URL for a notice.
///
/// Appends `railwaystation_id`, `locomotive_id`, `notify_url` and `status`
/// as query parameters to the subscriber URL.
pub fn notice_url(notice: &ArrivalNotice) -> Result<reqwest::Url, NotifyError> {
    let mut url =
        reqwest::Url::parse(&notice.notify_url).map_err(|err| NotifyError::InvalidUrl {
            url: notice.notify_url.clone(),
            reason: err.to_string(),
        })?;
    url.query_pairs_mut()
        .append_pair("railwaystation_id", &notice.railwaystation_id.to_string())
        .append_pair("locomotive_id", &notice.locomotive_id.to_string())
        .append_pair("notify_url", &notice.notify_url)
        .append_pair("status", notice.status.as_str());
    Ok(url)
}

/// HTTP notifier issuing one GET per notice.
#[derive(Clone, Debug, Default)]
pub struct HttpNotifier {
    client: reqwest::Client,
}

impl HttpNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses an existing client (shared connection pool).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Notifier for HttpNotifier {
    fn notify(
        &self,
        notice: ArrivalNotice,
    ) -> Pin<Box<dyn Future<Output = Result<(), NotifyError>> + Send + '_>> {
        let client = self.client.clone();
        Box::pin(async move {
            let url = notice_url(&notice)?;
            client.get(url).send().await?.error_for_status()?;
            Ok(())
        })
    }
}
