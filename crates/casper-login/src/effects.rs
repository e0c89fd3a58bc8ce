//! UI effect types.
//!
//! Effects are commands returned by the reducer that the runtime executes.
//! They represent I/O and task spawning only (no direct UI mutations).
//!
//! ## Cancellation Effects
//!
//! Unlocking the form cancels the pending sign-in task via
//! `UiEffect::CancelTask`. The runtime executes these by calling
//! `token.cancel()` on the provided token.

use casper_core::{Job, JobOptions, Notification};
use tokio_util::sync::CancellationToken;

use crate::common::{TaskId, TaskKind};

/// Effects returned by the reducer for the runtime to execute.
#[derive(Debug)]
pub enum UiEffect {
    /// Leave the login screen.
    Quit,

    /// Submit a job to the transport. The task id is already marked active.
    SubmitJob {
        task: TaskId,
        job: Job,
        options: JobOptions,
    },

    /// Hand a successful sign-in notification to the transport's login listener.
    HandOffLogin { notification: Notification },

    /// Remove saved email and credentials from the credential store.
    WipeCredentials,

    /// Close the transport connection.
    DisconnectTransport,

    /// Hard navigation of the hosting page.
    Navigate { url: String },

    /// Suppress the host's default handling of the triggering event.
    PreventDefault,

    /// Cancel an in-progress task.
    CancelTask {
        kind: TaskKind,
        token: Option<CancellationToken>,
    },
}
