//! Application state composition.
//!
//! ```text
//! AppState
//! ├── config: LoginConfig
//! ├── form: FormState       (widgets, UI mode, lock, toast)
//! ├── session: SessionState (attempt kind, hand-off)
//! ├── saved: SavedCredentials (snapshot taken at start, wiped in place)
//! ├── tubes / issuer_url / location (read from the transport and host)
//! ├── task_seq: TaskSeq     (async task id generator)
//! └── tasks: Tasks          (task lifecycle state)
//! ```

use casper_core::{Location, LoginConfig, SavedCredentials, TubeNames};

use crate::common::{TaskSeq, Tasks};
use crate::form::FormState;
use crate::session::SessionState;

pub struct AppState {
    pub should_quit: bool,
    /// Submitting spinner animation frame.
    pub spinner_frame: usize,
    pub config: LoginConfig,
    pub form: FormState,
    pub session: SessionState,
    /// Saved credentials as last seen. The store itself is only touched by the runtime.
    pub saved: SavedCredentials,
    pub tubes: TubeNames,
    /// Server that issued the current credential.
    pub issuer_url: Option<String>,
    /// Page the component is shown on. `None` disables the issuer redirect.
    pub location: Option<Location>,
    pub task_seq: TaskSeq,
    pub tasks: Tasks,
}

impl AppState {
    pub fn new(config: LoginConfig, saved: SavedCredentials) -> Self {
        let form = FormState::new(config.remember);
        let tubes = config.tubes();
        Self {
            should_quit: false,
            spinner_frame: 0,
            config,
            form,
            session: SessionState::default(),
            saved,
            tubes,
            issuer_url: None,
            location: None,
            task_seq: TaskSeq::default(),
            tasks: Tasks::default(),
        }
    }

    /// Returns true once the screen has nothing left to do.
    pub fn is_finished(&self) -> bool {
        self.should_quit || self.session.handed_off
    }
}
