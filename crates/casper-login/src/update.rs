//! Login reducer (update function).
//!
//! All state mutations happen here. The runtime calls `update(app, event)`
//! and executes the returned effects.

use std::time::Instant;

use tracing::debug;

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::form::{self, FormMode};
use crate::session;
use crate::state::AppState;

/// The main reducer function.
///
/// Takes the current state and an event, mutates state, and returns effects
/// for the runtime to execute.
pub fn update(app: &mut AppState, event: UiEvent) -> Vec<UiEffect> {
    match event {
        UiEvent::Tick => {
            app.spinner_frame = app.spinner_frame.wrapping_add(1);
            app.form.toast.expire(Instant::now());
            vec![]
        }
        UiEvent::Connected => session::connect(app),
        UiEvent::Disconnected => vec![UiEffect::DisconnectTransport],
        UiEvent::Key(key) => form::handle_key(app, key),
        UiEvent::FocusChanged(focus) => {
            form::handle_focus_change(&mut app.form, focus);
            vec![]
        }
        UiEvent::SignInPressed => {
            if app.form.sign_in.accepts_input() {
                session::sign_in(app)
            } else {
                vec![]
            }
        }
        UiEvent::RecoverPressed => {
            if app.form.recover.accepts_input() {
                session::forget_password_job(app)
            } else {
                vec![]
            }
        }
        UiEvent::ForgotPasswordLink => form::handle_mode_link(&mut app.form, FormMode::Recover),
        UiEvent::LoginFormLink => form::handle_mode_link(&mut app.form, FormMode::Login),
        UiEvent::RememberToggled(checked) => {
            if app.form.remember.disabled {
                vec![]
            } else {
                session::set_remember(app, checked)
            }
        }
        UiEvent::ToastClosed => {
            app.form.hide_toast();
            vec![]
        }
        UiEvent::SetToastAnchor(area) => {
            app.form.toast.fit_into = area;
            vec![]
        }
        UiEvent::OverrideAutomaticLogin { email, message } => {
            session::override_automatic_login(app, &email, &message)
        }
        UiEvent::ShowErrorAndCleanup { message } => session::show_error_and_cleanup(app, &message),
        UiEvent::SignInResponse(notification) => {
            session::handle_sign_in_response(app, notification)
        }
        UiEvent::RecoverPasswordResponse(notification) => {
            session::handle_forget_password_response(app, notification)
        }
        UiEvent::TaskStarted { kind, started } => {
            if app.tasks.state_mut(kind).on_started(&started) {
                vec![]
            } else {
                debug!(?kind, id = started.id.0, "stale task started, cancelling");
                vec![UiEffect::CancelTask {
                    kind,
                    token: started.cancel,
                }]
            }
        }
        UiEvent::TaskCompleted { kind, completed } => {
            let ok = app.tasks.state_mut(kind).finish_if_active(completed.id);
            if ok {
                update(app, *completed.result)
            } else {
                debug!(?kind, id = completed.id.0, "dropping stale task result");
                vec![]
            }
        }
    }
}
