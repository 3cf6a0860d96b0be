//! # Session
//!
//! The logged-in user and their bearer token live in a [`SessionContext`]:
//! one process-wide slot with an explicit `get` / `set` / `clear` lifecycle.
//! The context is cheap to clone (clones share the slot) and is handed to
//! whoever needs it, the HTTP backend and the API facade, instead of being
//! read ad hoc.
//!
//! ## Persistence
//!
//! A persistent context mirrors the slot to `session.json` in the data
//! directory so a login survives between CLI invocations. `clear` removes the
//! file. An unreadable file is treated as "logged out".

use crate::error::{CafeError, Result};
use crate::model::UserId;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info, warn};

pub const SESSION_FILENAME: &str = "session.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub username: String,
    #[serde(default)]
    pub user_id: Option<UserId>,
}

impl Session {
    pub fn new(token: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            username: username.into(),
            user_id: None,
        }
    }

    pub fn with_user_id(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    slot: Arc<RwLock<Option<Session>>>,
    path: Option<PathBuf>,
}

impl SessionContext {
    /// A context that forgets everything when the process exits.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// A context backed by `dir/session.json`, loading any saved session.
    pub fn persistent<P: AsRef<Path>>(dir: P) -> Self {
        let path = dir.as_ref().join(SESSION_FILENAME);
        let saved = load_session(&path);
        Self {
            slot: Arc::new(RwLock::new(saved)),
            path: Some(path),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn get(&self) -> Option<Session> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.get().is_some()
    }

    /// The current session, or [`CafeError::NotAuthenticated`].
    pub fn require(&self) -> Result<Session> {
        self.get().ok_or(CafeError::NotAuthenticated)
    }

    /// `Authorization` header value, if logged in.
    pub fn bearer(&self) -> Option<String> {
        self.get().map(|s| s.bearer())
    }

    pub fn set(&self, session: Session) -> Result<()> {
        if let Some(path) = &self.path {
            save_session(path, &session)?;
        }
        info!(username = %session.username, "session started");
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = Some(session);
        Ok(())
    }

    /// Applies `f` to the current session and persists the result.
    /// Returns `false` when nobody is logged in.
    pub fn update<F>(&self, f: F) -> Result<bool>
    where
        F: FnOnce(&mut Session),
    {
        let Some(mut session) = self.get() else {
            return Ok(false);
        };
        f(&mut session);
        self.set(session)?;
        Ok(true)
    }

    /// Ends the session. Returns `true` if there was one.
    pub fn clear(&self) -> Result<bool> {
        let previous = self
            .slot
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(path) = &self.path {
            if path.exists() {
                fs::remove_file(path)?;
            }
        }
        if let Some(session) = &previous {
            info!(username = %session.username, "session cleared");
        }
        Ok(previous.is_some())
    }
}

fn load_session(path: &Path) -> Option<Session> {
    if !path.exists() {
        return None;
    }
    let parsed = fs::read_to_string(path)
        .map_err(CafeError::Io)
        .and_then(|content| serde_json::from_str(&content).map_err(CafeError::Serialization));
    match parsed {
        Ok(session) => {
            debug!(path = %path.display(), "loaded saved session");
            Some(session)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring unreadable session file");
            None
        }
    }
}

fn save_session(path: &Path, session: &Session) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.exists() {
            fs::create_dir_all(dir)?;
        }
    }
    let content = serde_json::to_string_pretty(session)?;
    fs::write(path, content)?;
    Ok(())
}
