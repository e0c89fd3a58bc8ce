/// How the current (or last) sign-in attempt was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttemptKind {
    /// No attempt yet.
    #[default]
    None,
    /// Saved refresh token or session cookie.
    Automatic,
    /// Email and password typed by the user.
    Interactive,
}

#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub attempt: AttemptKind,
    /// A successful notification went to the login listener.
    pub handed_off: bool,
}

pub mod messages {
    pub const AUTOMATIC_SIGN_IN: &str = "Automatic sign-in with saved credential";
    pub const SESSION_RENEWAL: &str = "Session renewal started";
    pub const EXPIRED_CREDENTIAL: &str = "Expired credential, please re-enter email and password";
    pub const WRONG_CREDENTIALS: &str = "Wrong password or email";
    pub const TIMEOUT: &str = "Maximum wait time exceeded, please try again later.";
    pub const SERVICE_UNAVAILABLE: &str = "Service unavailable, please try again later.";
    pub const EMAIL_NOT_FOUND: &str = "Email not found.";
    pub const INSTRUCTIONS_SENT: &str = "Instructions sent by email.";
    pub const OPERATION_FAILED: &str = "Operation failed";
    pub const CREDENTIAL_DISCARDED: &str =
        "The saved credential was deleted, enter email and password again";
}
