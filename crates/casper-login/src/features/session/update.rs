//! Session flow reducer.
//!
//! Every operation returns the effects the runtime must execute. Jobs are
//! submitted through `UiEffect::SubmitJob`; their notifications come back as
//! `UiEvent::SignInResponse` / `UiEvent::RecoverPasswordResponse`.

use casper_core::issuer;
use casper_core::password::encode_password;
use casper_core::{Job, JobPayload, Notification};
use tracing::{debug, info, warn};

use super::state::{AttemptKind, messages};
use crate::common::TaskKind;
use crate::effects::UiEffect;
use crate::form::{self, Focus, PASSWORD_PLACEHOLDER};
use crate::state::AppState;

/// Marks the task active and asks the runtime to submit `job`.
///
/// A task of the same kind still in flight is cancelled first, so at most one
/// job per kind is ever pending.
fn submit_job(app: &mut AppState, job: Job) -> Vec<UiEffect> {
    let kind = TaskKind::for_job(&job);
    let mut effects = Vec::new();

    let state = app.tasks.state_mut(kind);
    if state.is_running() {
        effects.push(UiEffect::CancelTask {
            kind,
            token: state.cancel.clone(),
        });
    }

    let task = app.task_seq.next_id();
    app.tasks.state_mut(kind).begin(task);
    info!(tube = %job.tube, ?kind, "submitting job");
    effects.push(UiEffect::SubmitJob {
        task,
        job,
        options: app.config.job_options(),
    });
    effects
}

/// Flags `field` invalid, focuses it and leaves the submitting state.
fn reject_field(app: &mut AppState, field: Focus) {
    match field {
        Focus::Password => app.form.password.invalid = true,
        _ => app.form.email.invalid = true,
    }
    form::handle_focus_change(&mut app.form, Some(field));
    app.form.sign_in.set_submitting(false);
}

fn email_is_acceptable(app: &AppState) -> bool {
    !app.form.email.is_empty() && !app.form.email.invalid
}

fn password_is_acceptable(app: &AppState) -> bool {
    !app.form.password.is_empty() && !app.form.password.invalid
}

fn last_entity_id(app: &AppState) -> Option<String> {
    app.saved.last_entity_id().map(str::to_string)
}

/// Tries a silent sign-in with the saved refresh token or session cookie.
///
/// Returns whether an attempt was launched. Without any saved credential the
/// attempt kind becomes `Interactive` and nothing else changes.
pub fn attempt_automatic_login(app: &mut AppState) -> (bool, Vec<UiEffect>) {
    let refresh_path = app.saved.has_refresh_credential();
    if !refresh_path && app.saved.session_cookie().is_none() {
        app.session.attempt = AttemptKind::Interactive;
        debug!("no saved credential, skipping automatic login");
        return (false, vec![]);
    }

    let payload = JobPayload::Refresh {
        refresh_token: app.saved.refresh_token().map(str::to_string),
        access_token: app.saved.session_cookie().map(str::to_string),
        last_entity_id: last_entity_id(app),
    };

    let mut effects = Vec::new();
    app.form.sign_in.disabled = true;
    app.form.sign_in.set_submitting(true);
    app.form.lock_ui();

    if refresh_path {
        let email = app.saved.email().unwrap_or_default().to_string();
        app.form.email.set_value(email);
        app.form.password.set_value(PASSWORD_PLACEHOLDER);
        effects.extend(set_remember(app, true));
        app.form.open_toast(messages::AUTOMATIC_SIGN_IN, Some(true));
    } else {
        app.form.open_toast(messages::SESSION_RENEWAL, Some(true));
    }

    let job = Job::new(app.tubes.refresh.clone(), payload);
    effects.extend(submit_job(app, job));
    app.session.attempt = AttemptKind::Automatic;
    let credential = if refresh_path {
        "refresh_token"
    } else {
        "session_cookie"
    };
    info!(credential, "automatic login attempt");
    (true, effects)
}

/// Interactive sign-in. Falls back to an automatic attempt first.
pub fn sign_in(app: &mut AppState) -> Vec<UiEffect> {
    let (launched, effects) = attempt_automatic_login(app);
    if launched {
        return effects;
    }

    if !email_is_acceptable(app) {
        reject_field(app, Focus::Email);
        return vec![];
    }
    if !password_is_acceptable(app) {
        reject_field(app, Focus::Password);
        return vec![];
    }

    app.form.lock_ui();
    app.form.hide_toast();
    app.form.sign_in.set_submitting(true);

    let job = Job::new(
        app.tubes.login.clone(),
        JobPayload::Login {
            email: app.form.email.value.clone(),
            password: encode_password(&app.form.password.value),
            remember: app.form.remember.checked,
            last_entity_id: last_entity_id(app),
        },
    );
    submit_job(app, job)
}

pub fn handle_sign_in_response(app: &mut AppState, notification: Notification) -> Vec<UiEffect> {
    info!(
        status_code = notification.status_code,
        attempt = ?app.session.attempt,
        "sign-in response"
    );

    match notification.status_code {
        200 => {
            if notification.is_status_truthy() && notification.is_response_truthy() {
                app.form.lock_ui();
                app.session.handed_off = true;
                vec![UiEffect::HandOffLogin { notification }]
            } else {
                warn!("sign-in answered 200 without status or response, ignoring");
                vec![]
            }
        }
        401 if app.session.attempt == AttemptKind::Automatic => {
            let mut effects =
                form::show_error(&mut app.form, &mut app.tasks, messages::EXPIRED_CREDENTIAL);
            app.saved.wipe();
            effects.push(UiEffect::WipeCredentials);
            app.form.password.clear();
            app.form.email.select();
            app.form.toast.success = true;
            effects
        }
        401 => form::show_password_error(
            &mut app.form,
            &mut app.tasks,
            messages::WRONG_CREDENTIALS,
        ),
        504 => form::show_error(&mut app.form, &mut app.tasks, messages::TIMEOUT),
        _ => form::show_error(&mut app.form, &mut app.tasks, messages::SERVICE_UNAVAILABLE),
    }
}

/// Password recovery request for the typed email.
pub fn forget_password_job(app: &mut AppState) -> Vec<UiEffect> {
    let mut effects = Vec::new();

    if email_is_acceptable(app) {
        app.form.lock_ui();
        app.form.recover.set_submitting(true);
        app.form.recover.progress = 0;
        let job = Job::new(
            app.tubes.recover_password(),
            JobPayload::RecoverPassword {
                email: app.form.email.value.clone(),
            },
        );
        effects.extend(submit_job(app, job));
    } else {
        reject_field(app, Focus::Email);
    }

    effects.push(UiEffect::PreventDefault);
    effects
}

pub fn handle_forget_password_response(
    app: &mut AppState,
    notification: Notification,
) -> Vec<UiEffect> {
    info!(
        status_code = notification.status_code,
        "password recovery response"
    );

    if !notification.is_completed() {
        return form::show_error(&mut app.form, &mut app.tasks, messages::OPERATION_FAILED);
    }

    app.form.recover.progress = 100;
    app.form.recover.set_submitting(false);
    let mut effects = form::unlock_ui(&mut app.form, &mut app.tasks);

    if notification.is_explicit_failure() {
        effects.extend(form::show_error(
            &mut app.form,
            &mut app.tasks,
            messages::EMAIL_NOT_FOUND,
        ));
    } else {
        effects.extend(form::show_success(
            &mut app.form,
            &mut app.tasks,
            messages::INSTRUCTIONS_SENT,
        ));
        app.form.show_login();
    }
    effects
}

/// Queues a navigation to the issuer when the credential belongs to a sister
/// node. Returns true if the page is leaving.
pub fn redirect_to_issuer(app: &AppState, effects: &mut Vec<UiEffect>) -> bool {
    let Some(location) = app.location.as_ref() else {
        return false;
    };
    match issuer::redirect_target(app.issuer_url.as_deref(), location) {
        Some(url) => {
            warn!(%url, "redirecting to the server that issued the credential");
            effects.push(UiEffect::Navigate { url });
            true
        }
        None => false,
    }
}

/// Component attached: redirect to the issuer or try an automatic login.
pub fn connect(app: &mut AppState) -> Vec<UiEffect> {
    let mut effects = Vec::new();
    if redirect_to_issuer(app, &mut effects) {
        return effects;
    }
    if app.config.no_auto_login {
        debug!("automatic login disabled");
        return effects;
    }
    attempt_automatic_login(app).1
}

/// Shows the automatic-login state without submitting anything.
pub fn override_automatic_login(app: &mut AppState, email: &str, message: &str) -> Vec<UiEffect> {
    app.form.sign_in.disabled = true;
    app.form.sign_in.set_submitting(true);
    app.form.email.set_value(email);
    app.form.password.set_value(PASSWORD_PLACEHOLDER);
    app.form.lock_ui();
    app.form.open_toast(message, Some(true));
    vec![]
}

pub fn show_error_and_cleanup(app: &mut AppState, message: &str) -> Vec<UiEffect> {
    let effects = form::show_error(&mut app.form, &mut app.tasks, message);
    app.form.clear_fields();
    effects
}

/// Single mutation point of the remember checkbox.
///
/// Unchecking after an attempt was made discards the saved refresh token.
pub fn set_remember(app: &mut AppState, checked: bool) -> Vec<UiEffect> {
    let was_checked = app.form.remember.checked;
    app.form.remember.checked = checked;

    if !was_checked
        || checked
        || app.session.attempt == AttemptKind::None
        || app.saved.refresh_token().is_none()
    {
        return vec![];
    }

    info!("remember unchecked, discarding saved credential");
    app.saved.wipe();
    app.form.password.clear();
    app.form.email.select();
    app.form.open_toast(messages::CREDENTIAL_DISCARDED, Some(true));
    vec![UiEffect::WipeCredentials]
}
