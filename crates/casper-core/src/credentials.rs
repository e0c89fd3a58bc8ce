//! Saved credential storage.
//!
//! The login component only reads the saved bundle when it is created and asks
//! the store to wipe it. `FileCredentialStore` keeps the bundle in
//! `<base>/credentials.json` with restricted permissions (0600).
//! Secrets are never logged.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::paths;

/// Credentials remembered from a previous session.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SavedCredentials {
    pub email: Option<String>,
    /// Long-lived refresh token.
    pub refresh_token: Option<String>,
    /// Access token carried by the current session cookie.
    pub session_cookie: Option<String>,
    /// Entity the user last worked on, hinted to the backend on login.
    pub last_entity_id: Option<String>,
}

impl std::fmt::Debug for SavedCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SavedCredentials")
            .field("email", &self.email)
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("session_cookie", &self.session_cookie.as_ref().map(|_| "<redacted>"))
            .field("last_entity_id", &self.last_entity_id)
            .finish()
    }
}

fn present(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|s| !s.is_empty())
}

impl SavedCredentials {
    pub fn email(&self) -> Option<&str> {
        present(self.email.as_ref())
    }

    pub fn refresh_token(&self) -> Option<&str> {
        present(self.refresh_token.as_ref())
    }

    pub fn session_cookie(&self) -> Option<&str> {
        present(self.session_cookie.as_ref())
    }

    pub fn last_entity_id(&self) -> Option<&str> {
        present(self.last_entity_id.as_ref())
    }

    /// Saved email plus refresh token: enough for an automatic sign-in.
    pub fn has_refresh_credential(&self) -> bool {
        self.email().is_some() && self.refresh_token().is_some()
    }

    /// Returns true if any credential usable for an automatic login exists.
    pub fn can_auto_login(&self) -> bool {
        self.has_refresh_credential() || self.session_cookie().is_some()
    }

    /// Drops every secret and the saved email. The last entity id survives.
    pub fn wipe(&mut self) {
        self.email = None;
        self.refresh_token = None;
        self.session_cookie = None;
    }
}

/// Persistent store for [`SavedCredentials`].
pub trait CredentialStore: Send + Sync {
    /// Loads the saved bundle. A store with nothing saved returns the default.
    ///
    /// # Errors
    /// Returns an error if the backing storage cannot be read.
    fn load(&self) -> Result<SavedCredentials>;

    /// Removes the saved email and credentials.
    ///
    /// # Errors
    /// Returns an error if the backing storage cannot be written.
    fn wipe_credentials(&self) -> Result<()>;
}

/// JSON file backed credential store.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the default location under CASPER_HOME.
    pub fn at_default_path() -> Self {
        Self::new(paths::credentials_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Saves the bundle with restricted permissions (0600).
    ///
    /// # Errors
    /// Returns an error if the file or its parent directory cannot be written.
    pub fn save(&self, credentials: &SavedCredentials) -> Result<()> {
        let path = &self.path;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let contents = serde_json::to_string_pretty(credentials)
            .context("Failed to serialize saved credentials")?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(path)
                .with_context(|| format!("Failed to open {} for writing", path.display()))?;
            file.write_all(contents.as_bytes())
                .with_context(|| format!("Failed to write to {}", path.display()))?;
        }

        #[cfg(not(unix))]
        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(path)
                .with_context(|| format!("Failed to open {} for writing", path.display()))?;
            file.write_all(contents.as_bytes())
                .with_context(|| format!("Failed to write to {}", path.display()))?;
        }

        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<SavedCredentials> {
        if !self.path.exists() {
            return Ok(SavedCredentials::default());
        }

        let contents = fs::read_to_string(&self.path).with_context(|| {
            format!("Failed to read saved credentials from {}", self.path.display())
        })?;

        serde_json::from_str(&contents).with_context(|| {
            format!("Failed to parse saved credentials from {}", self.path.display())
        })
    }

    fn wipe_credentials(&self) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }
        let mut credentials = self.load()?;
        credentials.wipe();
        self.save(&credentials)
    }
}

/// In-memory credential store, for embedding hosts that persist elsewhere.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    inner: Mutex<SavedCredentials>,
}

impl MemoryCredentialStore {
    pub fn new(credentials: SavedCredentials) -> Self {
        Self {
            inner: Mutex::new(credentials),
        }
    }

    pub fn snapshot(&self) -> SavedCredentials {
        self.inner
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<SavedCredentials> {
        Ok(self.snapshot())
    }

    fn wipe_credentials(&self) -> Result<()> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|e| anyhow::anyhow!("credential store lock poisoned: {e}"))?;
        guard.wipe();
        Ok(())
    }
}
