//! Login runtime - runs the event loop and executes effects.
//!
//! This is the "Elm runtime" boundary: all side effects happen here.
//! The reducer stays pure and produces effects; this module executes them.
//!
//! ## Inbox Pattern
//!
//! - Spawned tasks send `UiEvent`s to `inbox_tx`
//! - The runtime drains `inbox_rx` every loop iteration (or awaits it in
//!   `process_next`) and feeds the events to the reducer

mod handlers;

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use casper_core::{CredentialStore, JobTransport, Location, LoginConfig, Navigator};
use crossterm::event::{self, Event};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::common::{TaskCompleted, TaskId, TaskKind, TaskStarted};
use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::state::AppState;
use crate::terminal::LoginTerminal;
use crate::{render, update};

/// Interval between `Tick` events (spinner animation, toast expiry).
pub const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Login screen runtime.
///
/// Owns the state and the collaborators. The terminal is borrowed by `run`
/// so the runtime can also be driven headless by an embedding host.
pub struct LoginRuntime {
    pub state: AppState,
    transport: Arc<dyn JobTransport>,
    store: Arc<dyn CredentialStore>,
    navigator: Arc<dyn Navigator>,
    handle: Handle,
    inbox_tx: mpsc::UnboundedSender<UiEvent>,
    inbox_rx: mpsc::UnboundedReceiver<UiEvent>,
    last_tick: Instant,
}

impl LoginRuntime {
    /// Creates a runtime, loading the saved credentials from `store`.
    ///
    /// # Errors
    /// Returns an error if called outside a tokio runtime or if the saved
    /// credentials cannot be loaded.
    pub fn new(
        config: LoginConfig,
        transport: Arc<dyn JobTransport>,
        store: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        let handle = Handle::try_current().context("Login runtime requires a tokio runtime")?;
        let saved = store.load().context("Failed to load saved credentials")?;
        if let Some(domain) = config.cookie_domain.as_deref() {
            debug!(domain, "forwarding cookie domain to the transport");
            transport.set_cookie_domain(domain);
        }

        let mut state = AppState::new(config, saved);
        state.tubes = transport.tubes();
        state.issuer_url = transport.issuer_url();

        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        Ok(Self {
            state,
            transport,
            store,
            navigator,
            handle,
            inbox_tx,
            inbox_rx,
            last_tick: Instant::now(),
        })
    }

    /// Sets the page the component is shown on, enabling the issuer redirect.
    #[must_use]
    pub fn with_location(mut self, location: Location) -> Self {
        self.state.location = Some(location);
        self
    }

    /// Runs the screen until the user quits, a login is handed off or the
    /// page navigates away.
    ///
    /// # Errors
    /// Returns an error if terminal I/O fails.
    pub fn run(&mut self, terminal: &mut LoginTerminal) -> Result<()> {
        self.dispatch(UiEvent::Connected);
        let result = self.event_loop(terminal);
        self.dispatch(UiEvent::Disconnected);
        result
    }

    fn event_loop(&mut self, terminal: &mut LoginTerminal) -> Result<()> {
        while !self.state.is_finished() {
            let mut events = Vec::new();
            while let Ok(ev) = self.inbox_rx.try_recv() {
                events.push(ev);
            }

            let poll_duration = if events.is_empty() {
                TICK_INTERVAL.saturating_sub(self.last_tick.elapsed())
            } else {
                Duration::ZERO
            };
            if event::poll(poll_duration)? {
                events.extend(terminal_event(event::read()?));
            }

            if self.last_tick.elapsed() >= TICK_INTERVAL {
                events.push(UiEvent::Tick);
                self.last_tick = Instant::now();
            }

            for ev in events {
                self.dispatch(ev);
            }

            terminal.draw(|frame| render::render(&self.state, frame))?;
        }
        Ok(())
    }

    /// Feeds one event to the reducer and executes the resulting effects.
    ///
    /// Returns true if the host should suppress its default handling of the
    /// event that triggered it.
    pub fn dispatch(&mut self, event: UiEvent) -> bool {
        let effects = update::update(&mut self.state, event);
        let mut default_prevented = false;
        for effect in effects {
            default_prevented |= matches!(effect, UiEffect::PreventDefault);
            self.execute_effect(effect);
        }
        default_prevented
    }

    /// Dispatches every event already waiting in the inbox.
    pub fn drain_inbox(&mut self) {
        while let Ok(ev) = self.inbox_rx.try_recv() {
            self.dispatch(ev);
        }
    }

    /// Waits for the next inbox event and dispatches it.
    pub async fn process_next(&mut self) -> bool {
        match self.inbox_rx.recv().await {
            Some(ev) => {
                self.dispatch(ev);
                true
            }
            None => false,
        }
    }

    /// Spawns an async task with a uniform TaskStarted/TaskCompleted lifecycle.
    ///
    /// A task resolving to `None` (cancelled) reports nothing.
    fn spawn_task<F, Fut>(&self, kind: TaskKind, id: TaskId, f: F)
    where
        F: FnOnce(Option<CancellationToken>) -> Fut + Send + 'static,
        Fut: Future<Output = Option<UiEvent>> + Send + 'static,
    {
        let tx = self.inbox_tx.clone();
        let cancel = Some(CancellationToken::new());
        let started = TaskStarted {
            id,
            cancel: cancel.clone(),
        };
        let _ = tx.send(UiEvent::TaskStarted { kind, started });
        self.handle.spawn(async move {
            if let Some(inner) = f(cancel).await {
                let completed = TaskCompleted {
                    id,
                    result: Box::new(inner),
                };
                let _ = tx.send(UiEvent::TaskCompleted { kind, completed });
            }
        });
    }

    fn execute_effect(&mut self, effect: UiEffect) {
        match effect {
            UiEffect::Quit => {
                self.state.should_quit = true;
            }
            UiEffect::SubmitJob { task, job, options } => {
                let kind = TaskKind::for_job(&job);
                let transport = Arc::clone(&self.transport);
                self.spawn_task(kind, task, move |cancel| {
                    handlers::submit_job(transport, kind, job, options, cancel)
                });
            }
            UiEffect::HandOffLogin { notification } => {
                info!("sign-in succeeded, handing off to the login listener");
                self.transport.login_listener(notification);
            }
            UiEffect::WipeCredentials => {
                // Errors are logged only - the in-state snapshot is already wiped
                if let Err(err) = self.store.wipe_credentials() {
                    warn!(error = %format!("{err:#}"), "failed to wipe saved credentials");
                }
            }
            UiEffect::DisconnectTransport => {
                self.transport.disconnect();
            }
            UiEffect::Navigate { url } => {
                self.navigator.navigate(&url);
                self.state.should_quit = true;
            }
            UiEffect::PreventDefault => {}
            UiEffect::CancelTask { kind, token } => {
                debug!(?kind, "cancelling task");
                if let Some(cancel) = token {
                    cancel.cancel();
                }
            }
        }
    }
}

/// Translates a terminal event. Only key presses reach the reducer; focus
/// inside the form is driven by Tab and the host.
fn terminal_event(event: Event) -> Option<UiEvent> {
    match event {
        Event::Key(key) => Some(UiEvent::Key(key)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use casper_core::{
        Job, JobOptions, MemoryCredentialStore, Notification, SavedCredentials, TubeNames,
    };
    use futures_util::future::BoxFuture;
    use serde_json::json;

    use super::*;
    use crate::form::FormMode;
    use crate::session::messages;

    #[derive(Default)]
    struct ScriptedTransport {
        issuer: Option<String>,
        responses: Mutex<VecDeque<Result<Notification>>>,
        submitted: Mutex<Vec<(Job, JobOptions)>>,
        cookie_domain: Mutex<Option<String>>,
        handed_off: Mutex<Vec<Notification>>,
        disconnects: AtomicUsize,
    }

    impl ScriptedTransport {
        fn answering(responses: Vec<Result<Notification>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                ..Default::default()
            })
        }
    }

    impl JobTransport for ScriptedTransport {
        fn tubes(&self) -> TubeNames {
            TubeNames::from_prefix("acme")
        }

        fn issuer_url(&self) -> Option<String> {
            self.issuer.clone()
        }

        fn submit_job(
            &self,
            job: Job,
            options: JobOptions,
        ) -> BoxFuture<'static, Result<Notification>> {
            self.submitted.lock().unwrap().push((job, options));
            let next = self.responses.lock().unwrap().pop_front();
            Box::pin(async move {
                match next {
                    Some(result) => result,
                    None => std::future::pending().await,
                }
            })
        }

        fn set_cookie_domain(&self, domain: &str) {
            *self.cookie_domain.lock().unwrap() = Some(domain.to_string());
        }

        fn login_listener(&self, notification: Notification) {
            self.handed_off.lock().unwrap().push(notification);
        }

        fn disconnect(&self) {
            self.disconnects.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[derive(Default)]
    struct RecordingNavigator {
        visited: Mutex<Vec<String>>,
    }

    impl Navigator for RecordingNavigator {
        fn navigate(&self, url: &str) {
            self.visited.lock().unwrap().push(url.to_string());
        }
    }

    fn runtime(
        transport: Arc<ScriptedTransport>,
        store: Arc<MemoryCredentialStore>,
        navigator: Arc<RecordingNavigator>,
    ) -> LoginRuntime {
        LoginRuntime::new(LoginConfig::default(), transport, store, navigator).unwrap()
    }

    fn refresh_bundle() -> SavedCredentials {
        SavedCredentials {
            email: Some("ana@example.com".to_string()),
            refresh_token: Some("rt-1".to_string()),
            session_cookie: None,
            last_entity_id: Some("5".to_string()),
        }
    }

    /// Processes the TaskStarted and TaskCompleted pair of one job.
    async fn finish_job(runtime: &mut LoginRuntime) {
        assert!(runtime.process_next().await);
        assert!(runtime.process_next().await);
    }

    #[tokio::test]
    async fn test_interactive_sign_in_hands_off() {
        let ok = Notification::new(200, true, json!({ "success": true }));
        let transport = ScriptedTransport::answering(vec![Ok(ok.clone())]);
        let store = Arc::new(MemoryCredentialStore::default());
        let mut rt = runtime(Arc::clone(&transport), store, Arc::default());

        rt.state.form.email.set_value("ana@example.com");
        rt.state.form.password.set_value("secret");
        rt.dispatch(UiEvent::SignInPressed);
        finish_job(&mut rt).await;

        let submitted = transport.submitted.lock().unwrap();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].0.tube, "acme-login");
        assert_eq!(submitted[0].1, JobOptions::from_timeout(10));
        assert_eq!(*transport.handed_off.lock().unwrap(), vec![ok]);
        assert!(rt.state.is_finished());
    }

    #[tokio::test]
    async fn test_expired_automatic_login_wipes_store() {
        let transport = ScriptedTransport::answering(vec![Ok(Notification::new(
            401,
            "error",
            json!({}),
        ))]);
        let store = Arc::new(MemoryCredentialStore::new(refresh_bundle()));
        let mut rt = runtime(Arc::clone(&transport), Arc::clone(&store), Arc::default());

        rt.dispatch(UiEvent::Connected);
        finish_job(&mut rt).await;

        assert_eq!(transport.submitted.lock().unwrap()[0].0.tube, "acme-refresh");
        let remaining = store.snapshot();
        assert!(!remaining.can_auto_login());
        assert_eq!(remaining.last_entity_id(), Some("5"));
        assert_eq!(rt.state.form.toast.text, messages::EXPIRED_CREDENTIAL);
        assert!(transport.disconnects.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test]
    async fn test_transport_error_reports_service_unavailable() {
        let transport =
            ScriptedTransport::answering(vec![Err(anyhow::anyhow!("socket closed"))]);
        let store = Arc::new(MemoryCredentialStore::default());
        let mut rt = runtime(transport, store, Arc::default());

        rt.state.form.email.set_value("ana@example.com");
        rt.state.form.password.set_value("secret");
        rt.dispatch(UiEvent::SignInPressed);
        finish_job(&mut rt).await;

        assert_eq!(rt.state.form.toast.text, messages::SERVICE_UNAVAILABLE);
        assert!(!rt.state.form.is_locked());
    }

    #[tokio::test]
    async fn test_cancelled_job_reports_nothing() {
        let transport = ScriptedTransport::answering(vec![]);
        let store = Arc::new(MemoryCredentialStore::default());
        let mut rt = runtime(Arc::clone(&transport), store, Arc::default());

        rt.state.form.email.set_value("ana@example.com");
        rt.state.form.password.set_value("secret");
        rt.dispatch(UiEvent::SignInPressed);
        assert!(rt.process_next().await);
        let token = rt.state.tasks.sign_in.cancel.clone().unwrap();

        rt.dispatch(UiEvent::ShowErrorAndCleanup {
            message: "Closed".to_string(),
        });
        assert!(token.is_cancelled());

        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
        rt.drain_inbox();
        assert!(!rt.state.tasks.is_any_running());
        assert!(transport.handed_off.lock().unwrap().is_empty());
        assert_eq!(rt.state.form.toast.text, "Closed");
    }

    #[tokio::test]
    async fn test_password_recovery_round_trip() {
        let transport = ScriptedTransport::answering(vec![Ok(Notification::completed(
            json!({ "success": true }),
        ))]);
        let store = Arc::new(MemoryCredentialStore::default());
        let mut rt = runtime(Arc::clone(&transport), store, Arc::default());

        assert!(rt.dispatch(UiEvent::ForgotPasswordLink));
        rt.state.form.email.set_value("ana@example.com");
        assert!(rt.dispatch(UiEvent::RecoverPressed));
        finish_job(&mut rt).await;

        assert_eq!(
            transport.submitted.lock().unwrap()[0].0.tube,
            "acme-recover-password"
        );
        assert_eq!(rt.state.form.mode, FormMode::Login);
        assert_eq!(rt.state.form.toast.text, messages::INSTRUCTIONS_SENT);
    }

    #[tokio::test]
    async fn test_connect_navigates_to_issuer() {
        let transport = Arc::new(ScriptedTransport {
            issuer: Some("https://api2.example.com".to_string()),
            ..Default::default()
        });
        let store = Arc::new(MemoryCredentialStore::new(refresh_bundle()));
        let navigator = Arc::new(RecordingNavigator::default());
        let mut rt = runtime(Arc::clone(&transport), store, Arc::clone(&navigator)).with_location(
            Location::new("https://api.example.com", "https://api.example.com/#/login"),
        );

        rt.dispatch(UiEvent::Connected);

        assert_eq!(
            *navigator.visited.lock().unwrap(),
            vec!["https://api2.example.com/#/login".to_string()]
        );
        assert!(rt.state.is_finished());
        assert!(transport.submitted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_disconnect_closes_transport() {
        let transport = ScriptedTransport::answering(vec![]);
        let store = Arc::new(MemoryCredentialStore::default());
        let mut rt = runtime(Arc::clone(&transport), store, Arc::default());

        assert!(!rt.dispatch(UiEvent::Disconnected));
        assert_eq!(transport.disconnects.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cookie_domain_reaches_transport() {
        let transport = ScriptedTransport::answering(vec![]);
        let config = LoginConfig {
            cookie_domain: Some(".example.com".to_string()),
            ..LoginConfig::default()
        };
        LoginRuntime::new(
            config,
            Arc::clone(&transport) as Arc<dyn JobTransport>,
            Arc::new(MemoryCredentialStore::default()),
            Arc::new(RecordingNavigator::default()),
        )
        .unwrap();

        assert_eq!(
            transport.cookie_domain.lock().unwrap().as_deref(),
            Some(".example.com")
        );
    }

    #[tokio::test]
    async fn test_cookie_domain_unset_leaves_transport_alone() {
        let transport = ScriptedTransport::answering(vec![]);
        let _rt = runtime(Arc::clone(&transport), Arc::default(), Arc::default());
        assert!(transport.cookie_domain.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_terminal_focus_events_keep_keyboard_working() {
        use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

        let store = Arc::new(MemoryCredentialStore::default());
        let mut rt = runtime(ScriptedTransport::answering(vec![]), store, Arc::default());

        for ev in [Event::FocusLost, Event::FocusGained] {
            assert!(terminal_event(ev).is_none());
        }
        let key = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE);
        let ev = terminal_event(Event::Key(key)).unwrap();
        rt.dispatch(ev);
        assert_eq!(rt.state.form.email.value, "a");
    }

    #[test]
    fn test_new_requires_tokio_runtime() {
        let result = LoginRuntime::new(
            LoginConfig::default(),
            ScriptedTransport::answering(vec![]),
            Arc::new(MemoryCredentialStore::default()),
            Arc::new(RecordingNavigator::default()),
        );
        assert!(result.is_err());
    }
}
