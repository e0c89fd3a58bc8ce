//! UI events consumed by the reducer.
//!
//! Events come from three places: the host (connect, taps, public
//! operations), the terminal (keys) and the runtime inbox (task lifecycle and
//! job notifications).

use casper_core::Notification;
use crossterm::event::KeyEvent;
use ratatui::layout::Rect;

use crate::common::{TaskCompleted, TaskKind, TaskStarted};
use crate::form::Focus;

#[derive(Debug)]
pub enum UiEvent {
    /// Periodic tick; expires the toast.
    Tick,

    /// Component attached to the page: redirect or try an automatic login.
    Connected,
    /// Component detached from the page.
    Disconnected,

    /// Key pressed while the form has keyboard focus.
    Key(KeyEvent),
    /// Keyboard focus moved (`None` when the form lost focus entirely).
    FocusChanged(Option<Focus>),

    /// Sign-in control tapped.
    SignInPressed,
    /// Recovery control tapped.
    RecoverPressed,
    /// "Forgot your password?" link tapped.
    ForgotPasswordLink,
    /// "Back to login" link tapped.
    LoginFormLink,
    /// Remember checkbox changed by the user.
    RememberToggled(bool),
    /// Toast close icon tapped.
    ToastClosed,
    /// Area the toast should fit into (`None` resets to the form area).
    SetToastAnchor(Option<Rect>),

    /// An outer orchestrator already started an automatic login elsewhere.
    OverrideAutomaticLogin { email: String, message: String },
    /// Show an error and clear both fields.
    ShowErrorAndCleanup { message: String },

    /// Answer to a login or refresh job.
    SignInResponse(Notification),
    /// Answer to a password recovery job.
    RecoverPasswordResponse(Notification),

    TaskStarted {
        kind: TaskKind,
        started: TaskStarted,
    },
    TaskCompleted {
        kind: TaskKind,
        completed: TaskCompleted<Box<UiEvent>>,
    },
}

impl TaskKind {
    /// Wraps a notification in the response event for this kind of task.
    pub fn response_event(self, notification: Notification) -> UiEvent {
        match self {
            TaskKind::SignIn => UiEvent::SignInResponse(notification),
            TaskKind::RecoverPassword => UiEvent::RecoverPasswordResponse(notification),
        }
    }
}
