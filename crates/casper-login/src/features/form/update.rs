//! Form reducer.
//!
//! Unlocking, toast helpers and keyboard handling. Anything that needs the
//! saved credentials or the job flow delegates to the session slice.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::state::{Focus, FormMode, FormState};
use crate::common::{TaskKind, Tasks};
use crate::effects::UiEffect;
use crate::session;
use crate::state::AppState;

/// Re-enables the form after an attempt ends.
///
/// Cancels a pending sign-in task, re-enables the inputs and the links and
/// closes the transport. Safe to call when nothing is pending.
pub fn unlock_ui(form: &mut FormState, tasks: &mut Tasks) -> Vec<UiEffect> {
    let mut effects = Vec::new();

    let timer = tasks.state_mut(TaskKind::SignIn);
    if timer.is_running() {
        effects.push(UiEffect::CancelTask {
            kind: TaskKind::SignIn,
            token: timer.cancel.clone(),
        });
        timer.clear();
    }

    form.email.disabled = false;
    form.password.disabled = false;
    form.remember.disabled = false;
    effects.push(UiEffect::DisconnectTransport);
    form.sign_in.set_submitting(false);
    form.user_actions.disabled = false;
    effects
}

pub fn show_success(form: &mut FormState, tasks: &mut Tasks, message: &str) -> Vec<UiEffect> {
    form.toast.success = true;
    form.open_toast(message, None);
    unlock_ui(form, tasks)
}

/// Error toast; clears field highlighting and unlocks.
pub fn show_error(form: &mut FormState, tasks: &mut Tasks, message: &str) -> Vec<UiEffect> {
    form.toast.success = false;
    form.email.invalid = false;
    form.password.invalid = false;
    form.open_toast(message, None);
    unlock_ui(form, tasks)
}

/// Wrong email/password combination: both fields selected, password focused.
pub fn show_password_error(
    form: &mut FormState,
    tasks: &mut Tasks,
    message: &str,
) -> Vec<UiEffect> {
    let effects = show_error(form, tasks, message);
    form.password.error_message = message.to_string();
    form.password.invalid = true;
    form.email.select();
    form.password.select();
    form.focus = Some(Focus::Password);
    effects
}

/// Error shown under the fields instead of in the toast.
pub fn show_input_error(form: &mut FormState, tasks: &mut Tasks, message: &str) -> Vec<UiEffect> {
    form.hide_toast();
    form.email.error_message = message.to_string();
    form.password.error_message = String::new();
    form.email.invalid = true;
    form.password.invalid = true;
    unlock_ui(form, tasks)
}

/// Moves keyboard focus. Leaving the password field hides the toast.
pub fn handle_focus_change(form: &mut FormState, focus: Option<Focus>) {
    let previous = form.focus;
    form.focus = focus;
    if previous == Some(Focus::Password) && focus != Some(Focus::Password) {
        form.hide_toast();
    }
}

/// Mode-switch link tapped. Inert while the links are disabled.
pub fn handle_mode_link(form: &mut FormState, mode: FormMode) -> Vec<UiEffect> {
    if form.user_actions.disabled {
        return vec![];
    }
    match mode {
        FormMode::Login => form.show_login(),
        FormMode::Recover => form.show_recover(),
    }
    vec![UiEffect::PreventDefault]
}

/// Handles a key press while the form has keyboard focus.
pub fn handle_key(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    if key.kind != KeyEventKind::Press {
        return vec![];
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return vec![UiEffect::Quit];
    }

    let Some(focus) = app.form.focus else {
        return vec![];
    };
    if !app.form.accepts_keys(focus) {
        return vec![];
    }

    match key.code {
        KeyCode::Enter => handle_enter(app, focus),
        KeyCode::Tab | KeyCode::BackTab => {
            app.form.hide_toast();
            app.form.reset_validation();
            let next = app.form.neighbour_focus(key.code == KeyCode::Tab);
            handle_focus_change(&mut app.form, Some(next));
            vec![]
        }
        _ => {
            app.form.hide_toast();
            app.form.reset_validation();
            match focus {
                Focus::Email => {
                    if app.form.email.edit(key) {
                        app.form.email.auto_validate();
                    }
                    vec![]
                }
                Focus::Password => {
                    if app.form.password.edit(key) {
                        app.form.password.auto_validate();
                    }
                    vec![]
                }
                Focus::Remember if key.code == KeyCode::Char(' ') => {
                    let checked = !app.form.remember.checked;
                    session::set_remember(app, checked)
                }
                _ => vec![],
            }
        }
    }
}

fn handle_enter(app: &mut AppState, focus: Focus) -> Vec<UiEffect> {
    match focus {
        Focus::Password => session::sign_in(app),
        Focus::Email => {
            let next = app.form.neighbour_focus(true);
            handle_focus_change(&mut app.form, Some(next));
            vec![]
        }
        Focus::Remember => {
            let checked = !app.form.remember.checked;
            session::set_remember(app, checked)
        }
        Focus::Submit => match app.form.mode {
            FormMode::Login => session::sign_in(app),
            FormMode::Recover => session::forget_password_job(app),
        },
        Focus::ModeLink => match app.form.mode {
            FormMode::Login => handle_mode_link(&mut app.form, FormMode::Recover),
            FormMode::Recover => handle_mode_link(&mut app.form, FormMode::Login),
        },
    }
}
