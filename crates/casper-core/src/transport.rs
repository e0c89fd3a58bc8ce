//! Seams to the outside world: the job transport and page navigation.

use anyhow::Result;
use futures_util::future::BoxFuture;

use crate::job::{Job, JobOptions, Notification, TubeNames};

/// Client for the job queue backend.
///
/// Implementations own the socket, the queue protocol and the credential
/// persistence that follows a successful login.
pub trait JobTransport: Send + Sync {
    /// Tube names this transport submits to.
    fn tubes(&self) -> TubeNames;

    /// URL of the server that issued the current credential, if known.
    fn issuer_url(&self) -> Option<String>;

    /// Submits a job and resolves with its notification.
    ///
    /// The future resolves exactly once. `options.timeout` is enforced by the
    /// transport; a timeout surfaces as a notification with status code 504.
    fn submit_job(&self, job: Job, options: JobOptions) -> BoxFuture<'static, Result<Notification>>;

    /// Domain the session cookie is set on, when running in a cluster.
    fn set_cookie_domain(&self, domain: &str);

    /// Completes a successful login: persists credentials, sets cookies, and so on.
    fn login_listener(&self, notification: Notification);

    /// Closes the underlying connection.
    fn disconnect(&self);
}

/// Performs hard navigations of the hosting page.
pub trait Navigator: Send + Sync {
    fn navigate(&self, url: &str);
}
