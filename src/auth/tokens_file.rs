use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

use crate::auth::store::{SessionStore, StoredSession};

/// Session persisted as `session.json` in the config dir.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_config_dir() -> Result<Self> {
        Ok(Self::new(crate::config::config_dir()?.join("session.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileStore {
    fn load(&self) -> Result<StoredSession> {
        if !self.path.exists() {
            return Ok(StoredSession::default());
        }
        let s = fs::read_to_string(&self.path)?;
        match serde_json::from_str(&s) {
            Ok(session) => Ok(session),
            Err(e) => {
                log::warn!(
                    "Ignoring unreadable session file {}: {e}",
                    self.path.display()
                );
                Ok(StoredSession::default())
            }
        }
    }

    fn save(&self, session: &StoredSession) -> Result<()> {
        if session.is_empty() {
            return self.clear();
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let s = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, s)?;
        restrict_permissions(&self.path)?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
