//! Session flow feature slice.
//!
//! Decides between automatic and interactive sign-in, submits jobs through
//! the runtime and interprets their notifications.
//!
//! ## Module Structure
//!
//! - `state.rs`: attempt kind and user-facing messages
//! - `update.rs`: the flow operations

mod state;
mod update;

pub use state::{AttemptKind, SessionState, messages};
pub use update::{
    attempt_automatic_login, connect, forget_password_job, handle_forget_password_response,
    handle_sign_in_response, override_automatic_login, redirect_to_issuer, set_remember,
    show_error_and_cleanup, sign_in,
};
