//! Feature slices for the login screen (state/update/render per slice).

pub mod form;
pub mod session;
