//! Form widget state.
//!
//! Named handles for every control of the login form. The UI mode decides
//! which of them are visible; the lock flag decides which accept input.

use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::Rect;

pub const EMAIL_MIN_LEN: usize = 4;
pub const PASSWORD_MIN_LEN: usize = 6;
pub const EMAIL_TOO_SHORT: &str = "Email too short";
pub const PASSWORD_TOO_SHORT: &str = "Password too short";

/// Shown in the password field while a saved credential is in use.
pub const PASSWORD_PLACEHOLDER: &str = "\u{a0}\u{a0}\u{a0}\u{a0}\u{a0}\u{a0}\u{a0}\u{a0}";

/// How long the toast stays open.
pub const TOAST_DURATION: Duration = Duration::from_secs(5);

/// Which form is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormMode {
    #[default]
    Login,
    Recover,
}

/// Focusable controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Email,
    Password,
    Remember,
    /// Sign-in control in login mode, recovery control in recover mode.
    Submit,
    /// The visible mode-switch link.
    ModeLink,
}

/// Single-line text input.
#[derive(Debug, Clone, Default)]
pub struct InputField {
    pub value: String,
    pub invalid: bool,
    pub disabled: bool,
    pub visible: bool,
    pub error_message: String,
    /// Whole text selected; the next edit replaces it.
    pub selected: bool,
    pub min_len: usize,
}

impl InputField {
    fn new(min_len: usize) -> Self {
        Self {
            visible: true,
            min_len,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.selected = false;
    }

    pub fn clear(&mut self) {
        self.set_value(String::new());
    }

    pub fn select(&mut self) {
        self.selected = true;
    }

    /// Flags values shorter than the minimum length. Empty is valid.
    pub fn auto_validate(&mut self) {
        let len = self.value.chars().count();
        self.invalid = len > 0 && len < self.min_len;
    }

    /// Applies an editing key. Returns true if the value changed.
    pub fn edit(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                if self.selected {
                    self.value.clear();
                    self.selected = false;
                }
                self.value.push(c);
                true
            }
            KeyCode::Backspace => {
                if self.selected {
                    self.value.clear();
                    self.selected = false;
                } else {
                    self.value.pop();
                }
                true
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Checkbox {
    pub checked: bool,
    pub disabled: bool,
    pub visible: bool,
}

/// Button with a submitting spinner.
#[derive(Debug, Clone, Default)]
pub struct SubmitControl {
    pub visible: bool,
    pub disabled: bool,
    pub submitting: bool,
    /// Progress shown while submitting, 0..=100.
    pub progress: u8,
}

impl SubmitControl {
    /// Leaving the submitting state re-enables the control.
    pub fn set_submitting(&mut self, submitting: bool) {
        self.submitting = submitting;
        if !submitting {
            self.disabled = false;
        }
    }

    pub fn accepts_input(&self) -> bool {
        self.visible && !self.disabled && !self.submitting
    }
}

/// The mode-switch links container.
#[derive(Debug, Clone, Default)]
pub struct UserActions {
    /// Dims the links and makes them inert.
    pub disabled: bool,
    pub forgot_visible: bool,
    pub login_visible: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Toast {
    pub open: bool,
    pub success: bool,
    pub text: String,
    /// Area the toast is drawn into; the form area when unset.
    pub fit_into: Option<Rect>,
    pub opened_at: Option<Instant>,
}

impl Toast {
    pub fn close(&mut self) {
        self.open = false;
        self.opened_at = None;
    }

    /// Closes the toast once it has been open for [`TOAST_DURATION`].
    pub fn expire(&mut self, now: Instant) {
        if let Some(opened_at) = self.opened_at
            && now.saturating_duration_since(opened_at) >= TOAST_DURATION
        {
            self.close();
        }
    }
}

/// Login form state.
#[derive(Debug, Clone)]
pub struct FormState {
    pub mode: FormMode,
    pub focus: Option<Focus>,
    pub email: InputField,
    pub password: InputField,
    pub remember: Checkbox,
    pub sign_in: SubmitControl,
    pub recover: SubmitControl,
    pub user_actions: UserActions,
    pub toast: Toast,
}

impl FormState {
    pub fn new(remember: bool) -> Self {
        let mut form = Self {
            mode: FormMode::Login,
            focus: Some(Focus::Email),
            email: InputField::new(EMAIL_MIN_LEN),
            password: InputField::new(PASSWORD_MIN_LEN),
            remember: Checkbox {
                checked: remember,
                ..Default::default()
            },
            sign_in: SubmitControl::default(),
            recover: SubmitControl::default(),
            user_actions: UserActions::default(),
            toast: Toast::default(),
        };
        form.reset_validation();
        form.show_login();
        form
    }

    pub fn show_login(&mut self) {
        self.mode = FormMode::Login;
        self.sign_in.visible = true;
        self.user_actions.forgot_visible = true;
        self.password.visible = true;
        self.remember.visible = true;

        self.recover.visible = false;
        self.user_actions.login_visible = false;
    }

    pub fn show_recover(&mut self) {
        self.mode = FormMode::Recover;
        self.recover.visible = true;
        self.user_actions.login_visible = true;

        self.password.visible = false;
        self.remember.visible = false;
        self.sign_in.visible = false;
        self.user_actions.forgot_visible = false;
    }

    /// Disables the inputs and links. Unlocking lives in `form::unlock_ui`
    /// because it also cancels the sign-in task.
    pub fn lock_ui(&mut self) {
        self.hide_toast();
        self.email.disabled = true;
        self.password.disabled = true;
        self.remember.disabled = true;
        self.user_actions.disabled = true;
    }

    pub fn is_locked(&self) -> bool {
        self.email.disabled
            && self.password.disabled
            && self.remember.disabled
            && self.user_actions.disabled
    }

    pub fn hide_toast(&mut self) {
        self.toast.close();
    }

    /// Opens the toast. The style only changes when `success` is given.
    pub fn open_toast(&mut self, message: &str, success: Option<bool>) {
        if let Some(success) = success {
            self.toast.success = success;
        }
        self.toast.text = message.to_string();
        self.toast.open = true;
        self.toast.opened_at = Some(Instant::now());
    }

    pub fn reset_validation(&mut self) {
        self.email.invalid = false;
        self.password.invalid = false;
        self.email.error_message = EMAIL_TOO_SHORT.to_string();
        self.password.error_message = PASSWORD_TOO_SHORT.to_string();
    }

    pub fn clear_fields(&mut self) {
        self.email.clear();
        self.password.clear();
    }

    pub fn submit_control(&self) -> &SubmitControl {
        match self.mode {
            FormMode::Login => &self.sign_in,
            FormMode::Recover => &self.recover,
        }
    }

    /// Visible focusable controls, in tab order.
    pub fn focus_order(&self) -> Vec<Focus> {
        let mut order = vec![Focus::Email];
        if self.password.visible {
            order.push(Focus::Password);
        }
        if self.remember.visible {
            order.push(Focus::Remember);
        }
        order.push(Focus::Submit);
        order.push(Focus::ModeLink);
        order
    }

    /// The control after (or before) the focused one, wrapping around.
    pub fn neighbour_focus(&self, forward: bool) -> Focus {
        let order = self.focus_order();
        let current = self
            .focus
            .and_then(|focus| order.iter().position(|f| *f == focus));
        let len = order.len();
        let index = match (current, forward) {
            (None, _) => 0,
            (Some(i), true) => (i + 1) % len,
            (Some(i), false) => (i + len - 1) % len,
        };
        order[index]
    }

    /// Returns true if the control can currently receive keys.
    pub fn accepts_keys(&self, focus: Focus) -> bool {
        match focus {
            Focus::Email => self.email.visible && !self.email.disabled,
            Focus::Password => self.password.visible && !self.password.disabled,
            Focus::Remember => self.remember.visible && !self.remember.disabled,
            Focus::Submit => self.submit_control().accepts_input(),
            Focus::ModeLink => !self.user_actions.disabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_initial_mode_is_login() {
        let form = FormState::new(false);
        assert_eq!(form.mode, FormMode::Login);
        assert!(form.sign_in.visible && form.password.visible && form.remember.visible);
        assert!(form.user_actions.forgot_visible);
        assert!(!form.recover.visible && !form.user_actions.login_visible);
        assert_eq!(form.email.error_message, EMAIL_TOO_SHORT);
        assert_eq!(form.focus, Some(Focus::Email));
    }

    #[test]
    fn test_modes_are_mutually_exclusive() {
        let mut form = FormState::new(false);
        form.show_recover();
        assert!(form.recover.visible && form.user_actions.login_visible);
        assert!(!form.sign_in.visible && !form.password.visible && !form.remember.visible);
        assert!(!form.user_actions.forgot_visible);

        form.show_login();
        assert!(form.sign_in.visible && !form.recover.visible);
    }

    #[test]
    fn test_lock_disables_inputs_and_hides_toast() {
        let mut form = FormState::new(false);
        form.open_toast("hello", Some(false));
        form.lock_ui();
        assert!(form.is_locked());
        assert!(!form.toast.open);
        assert!(!form.accepts_keys(Focus::Email));
        assert!(!form.accepts_keys(Focus::ModeLink));
    }

    #[test]
    fn test_open_toast_keeps_style_when_unspecified() {
        let mut form = FormState::new(false);
        form.open_toast("ok", Some(true));
        form.open_toast("still ok", None);
        assert!(form.toast.success);
        assert_eq!(form.toast.text, "still ok");
    }

    #[test]
    fn test_toast_expires_after_duration() {
        let mut form = FormState::new(false);
        form.open_toast("bye", None);
        let opened = form.toast.opened_at.unwrap();

        form.toast.expire(opened + Duration::from_secs(1));
        assert!(form.toast.open);
        form.toast.expire(opened + TOAST_DURATION);
        assert!(!form.toast.open);
    }

    #[test]
    fn test_auto_validate_uses_min_len() {
        let mut field = InputField::new(EMAIL_MIN_LEN);
        field.auto_validate();
        assert!(!field.invalid);
        field.set_value("a@b");
        field.auto_validate();
        assert!(field.invalid);
        field.set_value("a@bc");
        field.auto_validate();
        assert!(!field.invalid);
    }

    #[test]
    fn test_edit_replaces_selection() {
        let mut field = InputField::new(PASSWORD_MIN_LEN);
        field.set_value("old");
        field.select();
        assert!(field.edit(key(KeyCode::Char('n'))));
        assert_eq!(field.value, "n");
        assert!(field.edit(key(KeyCode::Backspace)));
        assert_eq!(field.value, "");
        assert!(!field.edit(key(KeyCode::Left)));
        assert!(!field.edit(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
    }

    #[test]
    fn test_focus_order_follows_mode() {
        let mut form = FormState::new(false);
        assert_eq!(form.neighbour_focus(true), Focus::Password);
        assert_eq!(form.neighbour_focus(false), Focus::ModeLink);

        form.show_recover();
        assert_eq!(
            form.focus_order(),
            vec![Focus::Email, Focus::Submit, Focus::ModeLink]
        );
        assert_eq!(form.neighbour_focus(true), Focus::Submit);
    }

    #[test]
    fn test_submit_control_reenabled_when_done() {
        let mut control = SubmitControl {
            visible: true,
            disabled: true,
            submitting: true,
            progress: 0,
        };
        assert!(!control.accepts_input());
        control.set_submitting(false);
        assert!(control.accepts_input());
    }
}
