use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::error::portal::PortalError;
use crate::model::session_info::SessionInfo;

/// The current login token, shared between the session and the HTTP middleware,
/// mirrored to a JSON file so it survives between runs.
#[derive(Clone, Default)]
pub struct TokenStore {
    current: Arc<RwLock<Option<SessionInfo>>>,
    path: Option<PathBuf>,
}

impl TokenStore {
    /// Loads a previously saved session from `path`. An unreadable file is
    /// logged and treated as logged out.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let session = if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => serde_json::from_str::<SessionInfo>(&text)
                    .map_err(|err| log::warn!("ignoring unreadable session file {}: {}", path.display(), err))
                    .ok(),
                Err(err) => {
                    log::warn!("failed to open session file {}: {}", path.display(), err);
                    None
                }
            }
        } else {
            None
        };

        TokenStore {
            current: Arc::new(RwLock::new(session)),
            path: Some(path),
        }
    }

    /// A store that never touches the filesystem.
    pub fn in_memory() -> Self {
        TokenStore::default()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn session(&self) -> Option<SessionInfo> {
        self.current.read().ok().and_then(|s| s.clone())
    }

    pub fn token(&self) -> Option<String> {
        self.current
            .read()
            .ok()
            .and_then(|s| s.as_ref().map(|info| info.token.clone()))
    }

    pub fn set(&self, session: SessionInfo) -> Result<(), PortalError> {
        if let Some(path) = &self.path {
            save(path, &session)?;
        }
        if let Ok(mut current) = self.current.write() {
            *current = Some(session);
        }
        Ok(())
    }

    /// Forgets the token in memory and removes the session file.
    pub fn clear(&self) -> Result<(), PortalError> {
        if let Ok(mut current) = self.current.write() {
            *current = None;
        }
        if let Some(path) = &self.path {
            if path.exists() {
                std::fs::remove_file(path)?;
            }
        }
        Ok(())
    }

    /// Closure handed to the auth middleware.
    pub fn token_fn(&self) -> Arc<dyn Fn() -> Option<String> + Send + Sync> {
        let store = self.clone();
        Arc::new(move || store.token())
    }
}

fn save(path: &Path, session: &SessionInfo) -> Result<(), PortalError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let file = std::fs::File::create(path)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, session)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_persists_and_open_restores() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let store = TokenStore::open(&path);
        assert!(store.token().is_none());
        store.set(SessionInfo::new("tok-1", "alice")).unwrap();
        assert!(path.exists());

        let reopened = TokenStore::open(&path);
        assert_eq!(reopened.token().as_deref(), Some("tok-1"));
        assert_eq!(reopened.session().unwrap().username, "alice");
    }

    #[test]
    fn clear_removes_file_and_token() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let store = TokenStore::open(&path);
        store.set(SessionInfo::new("tok-2", "bob")).unwrap();

        let shared = store.token_fn();
        store.clear().unwrap();
        assert!(!path.exists());
        assert!(shared().is_none());
    }

    #[test]
    fn garbage_file_is_treated_as_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(TokenStore::open(&path).token().is_none());
    }
}
