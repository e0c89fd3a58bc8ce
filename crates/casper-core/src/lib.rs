//! Core types for the casper login component.
//!
//! Everything the login state machine consumes but does not own lives here:
//! configuration, the job transport and credential store seams, job payloads
//! and notifications, password encoding, and the issuer redirect decision.

pub mod config;
pub mod credentials;
pub mod issuer;
pub mod job;
pub mod logging;
pub mod password;
pub mod transport;

pub use config::LoginConfig;
pub use credentials::{CredentialStore, FileCredentialStore, MemoryCredentialStore, SavedCredentials};
pub use issuer::Location;
pub use job::{Job, JobOptions, JobPayload, Notification, TubeNames};
pub use transport::{JobTransport, Navigator};
