//! Session persistence.
//!
//! A session is a single optional token kept between invocations. The
//! file store writes it as `{"token": ...}` JSON; the memory store exists
//! for tests and embedding.

use crate::error::{ClientError, SessionIoError};
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::io::Write;
use std::path::{Path, PathBuf};

/// State carried from one invocation to the next.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub token: Option<String>,
}

impl Session {
    /// Token for an authenticated request, or `NotLoggedIn`.
    pub fn require_token(&self) -> Result<&str, ClientError> {
        self.token.as_deref().ok_or(ClientError::NotLoggedIn)
    }
}

/// Load/save boundary for the session record.
pub trait SessionStore {
    /// Returns the stored session, creating and persisting an empty one
    /// when none exists yet.
    fn load(&self) -> Result<Session, ClientError>;

    /// Replaces the stored record with `session`.
    fn save(&self, session: &Session) -> Result<(), ClientError>;
}

/// Session kept in a JSON file.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<data dir>/roomchat/session.json`, or `./session.json` when the
    /// platform has no data directory.
    pub fn default_path() -> PathBuf {
        dirs::data_local_dir()
            .map(|dir| dir.join("roomchat"))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("session.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Session, SessionIoError> {
        let content = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn write(&self, session: &Session) -> Result<(), SessionIoError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string(session)?;

        // Write to a sibling then rename so a crash never leaves half a record
        let temp_path = self.path.with_extension("json.tmp");
        let result = write_private(&temp_path, content.as_bytes())
            .and_then(|()| std::fs::rename(&temp_path, &self.path));
        if result.is_err() {
            let _ = std::fs::remove_file(&temp_path);
        }
        Ok(result?)
    }
}

/// Create `path` owner read/write only from the start; the record holds
/// a credential.
fn write_private(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;

    // A leftover temp file keeps its old mode; tighten it before writing
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }

    file.write_all(content)?;
    file.sync_all()
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Session, ClientError> {
        if !self.path.exists() {
            let session = Session::default();
            self.write(&session)
                .map_err(|e| ClientError::session(&self.path, e))?;
            tracing::debug!("Created empty session at {:?}", self.path);
            return Ok(session);
        }
        self.read().map_err(|e| ClientError::session(&self.path, e))
    }

    fn save(&self, session: &Session) -> Result<(), ClientError> {
        self.write(session)
            .map_err(|e| ClientError::session(&self.path, e))?;
        tracing::debug!("Saved session to {:?}", self.path);
        Ok(())
    }
}

/// Session kept in memory for the lifetime of the store.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    session: RefCell<Option<Session>>,
    saves: Cell<usize>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            session: RefCell::new(Some(session)),
            saves: Cell::new(0),
        }
    }

    /// Last stored session, if any was ever loaded or saved.
    pub fn snapshot(&self) -> Option<Session> {
        self.session.borrow().clone()
    }

    /// How many times `save` was called.
    pub fn save_count(&self) -> usize {
        self.saves.get()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Session, ClientError> {
        Ok(self
            .session
            .borrow_mut()
            .get_or_insert_with(Session::default)
            .clone())
    }

    fn save(&self, session: &Session) -> Result<(), ClientError> {
        *self.session.borrow_mut() = Some(session.clone());
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}
