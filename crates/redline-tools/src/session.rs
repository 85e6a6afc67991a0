//! Document access gateway: session handles mapped to document paths.
//!
//! Sessions only remember where a document lives. Every operation re-reads
//! the file at the resolved path, so a session never holds a stale copy;
//! the per-handle operation counter exists to nudge long-running callers to
//! refresh their own view.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use redline_history::canonical_key;
use tracing::{debug, warn};

use crate::error::GatewayError;

/// Tag prefixed to the advisory warning attached to long-running sessions.
pub const SESSION_CONSISTENCY_WARNING: &str = "SESSION_CONSISTENCY_WARNING";

/// How an operation names its document.
///
/// A session handle wins over a filename; with neither, the active session
/// document is used.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentTarget {
    /// Session handle.
    pub document_id: Option<String>,
    /// Path to the document.
    pub filename: Option<PathBuf>,
}

impl DocumentTarget {
    /// Targets the active session document.
    #[must_use]
    pub fn active() -> Self {
        Self::default()
    }

    /// Targets the document behind a session handle.
    #[must_use]
    pub fn handle(id: impl Into<String>) -> Self {
        Self {
            document_id: Some(id.into()),
            filename: None,
        }
    }

    /// Targets a document by path.
    #[must_use]
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            document_id: None,
            filename: Some(path.into()),
        }
    }

    /// Returns `true` when neither a handle nor a filename was given.
    #[must_use]
    pub const fn is_unspecified(&self) -> bool {
        self.document_id.is_none() && self.filename.is_none()
    }
}

/// Authoritative location of a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDocument {
    /// Path every operation reads and writes.
    pub path: PathBuf,
    /// Session handle the target went through, if any.
    pub handle: Option<String>,
}

#[derive(Debug)]
struct Session {
    path: PathBuf,
    operations: u64,
}

#[derive(Debug, Default)]
struct Sessions {
    handles: BTreeMap<String, Session>,
    active: Option<String>,
}

/// Registry of open session handles.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    inner: Mutex<Sessions>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Sessions>, GatewayError> {
        self.inner.lock().map_err(|_| GatewayError::LockPoisoned)
    }

    /// Registers `id` for the document at `path` and makes it active.
    ///
    /// Re-opening an existing handle points it at `path` and resets its
    /// operation counter.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Missing`] when no file exists at `path`.
    pub fn open(&self, id: &str, path: &Path) -> Result<PathBuf, GatewayError> {
        if !path.is_file() {
            return Err(GatewayError::Missing {
                path: path.to_path_buf(),
            });
        }
        let canonical = canonical_key(path);
        let mut sessions = self.lock()?;
        sessions.handles.insert(
            id.to_owned(),
            Session {
                path: canonical.clone(),
                operations: 0,
            },
        );
        sessions.active = Some(id.to_owned());
        debug!(target: "redline_tools::session", id, path = %canonical.display(), "session opened");
        Ok(canonical)
    }

    /// Resolves `target` to the path an operation should use.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::UnknownHandle`] for an unregistered handle
    /// and [`GatewayError::NoActiveDocument`] when the target is unspecified
    /// and no session is active.
    pub fn resolve(&self, target: &DocumentTarget) -> Result<ResolvedDocument, GatewayError> {
        let sessions = self.lock()?;
        let id = match (&target.document_id, &target.filename) {
            (Some(id), _) => id.clone(),
            (None, Some(path)) => {
                return Ok(ResolvedDocument {
                    path: path.clone(),
                    handle: None,
                });
            }
            (None, None) => sessions
                .active
                .clone()
                .ok_or(GatewayError::NoActiveDocument)?,
        };
        let session = sessions
            .handles
            .get(&id)
            .ok_or_else(|| GatewayError::UnknownHandle { id: id.clone() })?;
        Ok(ResolvedDocument {
            path: session.path.clone(),
            handle: Some(id),
        })
    }

    /// Counts one read against `id`.
    ///
    /// Returns the advisory warning once the handle has served more than
    /// `limit` operations since it was opened or refreshed.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::UnknownHandle`] for an unregistered handle.
    pub fn record_read(&self, id: &str, limit: u64) -> Result<Option<String>, GatewayError> {
        let mut sessions = self.lock()?;
        let session = sessions
            .handles
            .get_mut(id)
            .ok_or_else(|| GatewayError::UnknownHandle { id: id.to_owned() })?;
        session.operations = session.operations.saturating_add(1);
        if session.operations <= limit {
            return Ok(None);
        }
        warn!(
            target: "redline_tools::session",
            id,
            operations = session.operations,
            limit,
            "session exceeded operation limit"
        );
        Ok(Some(format!(
            "[{SESSION_CONSISTENCY_WARNING}] Document '{id}' has served {} operations since it was opened or refreshed (session_op_limit={limit}); refresh the session if the file may have changed elsewhere.",
            session.operations
        )))
    }

    /// Operations served by `id` since it was opened or refreshed.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::UnknownHandle`] for an unregistered handle.
    pub fn operations(&self, id: &str) -> Result<u64, GatewayError> {
        let sessions = self.lock()?;
        sessions
            .handles
            .get(id)
            .map(|session| session.operations)
            .ok_or_else(|| GatewayError::UnknownHandle { id: id.to_owned() })
    }

    /// Resets the operation counter of `id`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::UnknownHandle`] for an unregistered handle.
    pub fn refresh(&self, id: &str) -> Result<(), GatewayError> {
        let mut sessions = self.lock()?;
        let session = sessions
            .handles
            .get_mut(id)
            .ok_or_else(|| GatewayError::UnknownHandle { id: id.to_owned() })?;
        session.operations = 0;
        Ok(())
    }

    /// Forgets `id`. Closing the active handle leaves no active document.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::UnknownHandle`] for an unregistered handle.
    pub fn close(&self, id: &str) -> Result<PathBuf, GatewayError> {
        let mut sessions = self.lock()?;
        let session = sessions
            .handles
            .remove(id)
            .ok_or_else(|| GatewayError::UnknownHandle { id: id.to_owned() })?;
        if sessions.active.as_deref() == Some(id) {
            sessions.active = None;
        }
        Ok(session.path)
    }

    /// Handle of the active session document.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::LockPoisoned`] if the lock is poisoned.
    pub fn active(&self) -> Result<Option<String>, GatewayError> {
        Ok(self.lock()?.active.clone())
    }
}
