//! Login screen for job-queue backed authentication.
//!
//! Elm-style split: `state` holds everything, `update` is the only place that
//! mutates it, `effects` describe the I/O the `runtime` performs, and
//! `render` draws the form with ratatui.

pub mod common;
pub mod effects;
pub mod events;
pub mod features;
pub mod render;
pub mod runtime;
pub mod state;
pub mod terminal;
pub mod update;

use std::io::{IsTerminal, stdout};
use std::sync::Arc;

use anyhow::Result;
use casper_core::config::paths;
use casper_core::{CredentialStore, JobTransport, Location, LoginConfig, Navigator, logging};
pub use features::{form, session};
pub use runtime::LoginRuntime;

/// Shows the login screen in the terminal until the user signs in, quits or
/// is redirected to the issuing server.
///
/// # Errors
/// Returns an error if stdout is not a terminal, if the saved credentials
/// cannot be loaded, or if terminal I/O fails.
pub fn run_login(
    config: LoginConfig,
    transport: Arc<dyn JobTransport>,
    store: Arc<dyn CredentialStore>,
    navigator: Arc<dyn Navigator>,
    location: Option<Location>,
) -> Result<()> {
    if !stdout().is_terminal() {
        anyhow::bail!("The login screen requires a terminal.");
    }

    // The screen owns the terminal, so logs go to a file. An embedding host
    // that already installed a subscriber keeps its own.
    let _log_guard = match logging::init_to_file(config.log_level.as_deref(), &paths::logs_dir()) {
        Ok(guard) => Some(guard),
        Err(err) => {
            tracing::debug!(error = %format!("{err:#}"), "file logging not installed");
            None
        }
    };

    let mut runtime = LoginRuntime::new(config, transport, store, navigator)?;
    if let Some(location) = location {
        runtime = runtime.with_location(location);
    }

    terminal::install_panic_hook();
    let mut term = terminal::setup_terminal()?;
    let result = runtime.run(&mut term);
    terminal::restore_terminal()?;
    result
}
