//! Effect handlers for the login runtime.
//!
//! Handlers are pure async functions that return the event to feed back to
//! the reducer. They do NOT mutate state.

use std::sync::Arc;

use casper_core::{Job, JobOptions, JobTransport, Notification};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::common::TaskKind;
use crate::events::UiEvent;

/// Submits `job` and waits for its notification.
///
/// Returns `None` when the task was cancelled first. A transport error is
/// reported to the reducer as a 500 notification.
pub async fn submit_job(
    transport: Arc<dyn JobTransport>,
    kind: TaskKind,
    job: Job,
    options: JobOptions,
    cancel: Option<CancellationToken>,
) -> Option<UiEvent> {
    let submission = transport.submit_job(job, options);
    let result = match cancel {
        Some(token) => tokio::select! {
            () = token.cancelled() => return None,
            result = submission => result,
        },
        None => submission.await,
    };

    let notification = match result {
        Ok(notification) => notification,
        Err(err) => {
            let message = format!("{err:#}");
            warn!(error = %message, ?kind, "job submission failed");
            Notification::service_failure(message)
        }
    };
    Some(kind.response_event(notification))
}
