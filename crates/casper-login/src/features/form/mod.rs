//! Login form feature slice.
//!
//! ## Module Structure
//!
//! - `state.rs`: widget handles, UI mode, lock flags and the toast
//! - `update.rs`: unlock, toast helpers and keyboard handling
//! - `render.rs`: form and toast rendering

mod render;
mod state;
mod update;

pub use render::render_form;
pub use state::{
    Checkbox, EMAIL_MIN_LEN, EMAIL_TOO_SHORT, Focus, FormMode, FormState, InputField,
    PASSWORD_MIN_LEN, PASSWORD_PLACEHOLDER, PASSWORD_TOO_SHORT, SubmitControl, TOAST_DURATION,
    Toast, UserActions,
};
pub use update::{
    handle_focus_change, handle_key, handle_mode_link, show_error, show_input_error,
    show_password_error, show_success, unlock_ui,
};
