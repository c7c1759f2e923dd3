//! Session storage.
//!
//! The session is the token + user pair that marks the client as signed in.
//! Everything that needs it (gateway, guard, auth service) goes through the
//! `SessionStore` trait so the backing storage can be swapped: a file under
//! `<home>` for the real client, memory for tests.
//!
//! The file store writes `<home>/session.json` with restricted permissions
//! (0600). Token and user are written in a single rename, so readers never
//! see one without the other.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use amperex_types::{Session, User};
use anyhow::{Context, Result};
use serde_json::Value;

use crate::config::paths;

/// Storage for the client session.
///
/// Only presence is ever checked: any non-empty token counts as signed in.
pub trait SessionStore: Send + Sync {
    /// Returns the stored session, or `None` if never set or cleared.
    ///
    /// # Errors
    /// Returns an error if the backing storage cannot be read.
    fn load(&self) -> Result<Option<Session>>;

    /// Replaces any prior session.
    ///
    /// # Errors
    /// Returns an error if the backing storage cannot be written.
    fn save(&self, session: &Session) -> Result<()>;

    /// Removes token and user. Clearing an empty store is a no-op.
    ///
    /// # Errors
    /// Returns an error if the backing storage cannot be written.
    fn clear(&self) -> Result<()>;

    fn token(&self) -> Option<String> {
        self.load_or_warn().map(|s| s.token)
    }

    fn current_user(&self) -> Option<User> {
        self.load_or_warn().and_then(|s| s.user)
    }

    /// Presence check only; no expiry or signature validation happens here.
    /// The server stays authoritative and answers 401 for a bad token.
    fn is_authenticated(&self) -> bool {
        self.load_or_warn().is_some()
    }

    #[doc(hidden)]
    fn load_or_warn(&self) -> Option<Session> {
        match self.load() {
            Ok(session) => session.filter(|s| !s.token.is_empty()),
            Err(e) => {
                tracing::warn!("Failed to read session: {e:#}");
                None
            }
        }
    }
}

/// In-process store. Used by tests and anything that must not touch disk.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    inner: Mutex<Option<Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            inner: Mutex::new(Some(session)),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<Session>> {
        let guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(guard.clone().filter(|s| !s.token.is_empty()))
    }

    fn save(&self, session: &Session) -> Result<()> {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// JSON file store (`{"authToken": ..., "user": {...}}`).
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<home>/session.json`.
    pub fn default_location() -> Self {
        Self::new(paths::session_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_atomic(&self, contents: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = self.path.with_extension("json.tmp");

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(&tmp_path)
                .with_context(|| format!("Failed to open {} for writing", tmp_path.display()))?;
            file.write_all(contents.as_bytes())
                .with_context(|| format!("Failed to write to {}", tmp_path.display()))?;
            file.sync_all()
                .with_context(|| format!("Failed to flush {}", tmp_path.display()))?;
        }

        #[cfg(not(unix))]
        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&tmp_path)
                .with_context(|| format!("Failed to open {} for writing", tmp_path.display()))?;
            file.write_all(contents.as_bytes())
                .with_context(|| format!("Failed to write to {}", tmp_path.display()))?;
        }

        fs::rename(&tmp_path, &self.path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                self.path.display()
            )
        })
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<Session>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read session from {}", self.path.display()));
            }
        };

        let value: Value = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse session from {}", self.path.display()))?;

        let Some(token) = value
            .get("authToken")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
        else {
            return Ok(None);
        };

        // A mangled user record does not invalidate the token.
        let user = match value.get("user") {
            None | Some(Value::Null) => None,
            Some(raw) => match serde_json::from_value::<User>(raw.clone()) {
                Ok(user) => Some(user),
                Err(e) => {
                    tracing::warn!("Ignoring unreadable user record in session: {e}");
                    None
                }
            },
        };

        Ok(Some(Session::new(token, user)))
    }

    fn save(&self, session: &Session) -> Result<()> {
        let contents =
            serde_json::to_string_pretty(session).context("Failed to serialize session")?;
        self.write_atomic(&contents)?;
        tracing::debug!(
            path = %self.path.display(),
            token = %mask_token(&session.token),
            "session saved"
        );
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "session cleared");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e)
                .with_context(|| format!("Failed to remove session {}", self.path.display())),
        }
    }
}

/// Returns a masked version of a token for display (first 12 chars + ...).
pub fn mask_token(token: &str) -> String {
    if token.len() <= 16 || !token.is_char_boundary(12) {
        return "***".to_string();
    }
    format!("{}...", &token[..12])
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    fn user() -> User {
        User {
            id: "42".to_string(),
            username: "operator".to_string(),
            email: None,
            role: Some("user".to_string()),
            name: None,
        }
    }

    #[test]
    fn test_memory_store_set_get_clear() {
        let store = MemorySessionStore::new();
        assert!(!store.is_authenticated());

        store.save(&Session::new("abc", Some(user()))).unwrap();
        assert!(store.is_authenticated());
        assert_eq!(store.token().as_deref(), Some("abc"));
        assert_eq!(store.current_user(), Some(user()));

        store.save(&Session::new("def", None)).unwrap();
        assert_eq!(store.token().as_deref(), Some("def"));
        assert_eq!(store.current_user(), None);

        store.clear().unwrap();
        store.clear().unwrap();
        assert!(!store.is_authenticated());
        assert_eq!(store.current_user(), None);
    }

    #[test]
    fn test_empty_token_is_not_a_session() {
        let store = MemorySessionStore::with_session(Session::new("", Some(user())));
        assert!(!store.is_authenticated());
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_file_store_roundtrip_uses_storage_keys() {
        let dir = tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("session.json"));
        assert!(store.load().unwrap().is_none());

        store.save(&Session::new("abc", Some(user()))).unwrap();

        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"authToken\": \"abc\""));
        assert_eq!(store.load().unwrap(), Some(Session::new("abc", Some(user()))));
        assert!(!dir.path().join("session.json.tmp").exists());

        store.clear().unwrap();
        assert!(!store.path().exists());
        store.clear().unwrap();
    }

    #[test]
    fn test_file_store_keeps_token_when_user_is_corrupt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, r#"{"authToken": "abc", "user": "not-an-object"}"#).unwrap();

        let store = FileSessionStore::new(&path);
        assert!(store.is_authenticated());
        assert_eq!(store.current_user(), None);
    }

    #[test]
    fn test_file_store_unparseable_file_is_not_authenticated() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{{{{").unwrap();

        let store = FileSessionStore::new(&path);
        assert!(store.load().is_err());
        assert!(!store.is_authenticated());
    }

    #[cfg(unix)]
    #[test]
    fn test_file_store_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("nested").join("session.json"));
        store.save(&Session::new("abc", None)).unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_mask_token() {
        assert_eq!(mask_token("short"), "***");
        assert_eq!(mask_token("eyJ0eXAiOiJKV1QiLCJhbGciOi"), "eyJ0eXAiOiJK...");
    }
}
