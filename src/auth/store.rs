use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// The three persisted session fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    pub access_token: Option<String>,
    pub user_email: Option<String>,
    pub token_expiry: Option<String>,
}

impl StoredSession {
    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.user_email.is_none() && self.token_expiry.is_none()
    }
}

/// Where the session survives between runs. Fields are written and cleared
/// together.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<StoredSession>;
    fn save(&self, session: &StoredSession) -> Result<()>;
    fn clear(&self) -> Result<()>;

    fn access_token(&self) -> Result<Option<String>> {
        Ok(self.load()?.access_token)
    }
}

/// Process-local store. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<StoredSession>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(session: StoredSession) -> Self {
        Self {
            inner: Mutex::new(session),
        }
    }
}

impl SessionStore for MemoryStore {
    fn load(&self) -> Result<StoredSession> {
        let guard = self
            .inner
            .lock()
            .map_err(|_| anyhow::anyhow!("session store poisoned"))?;
        Ok(guard.clone())
    }

    fn save(&self, session: &StoredSession) -> Result<()> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| anyhow::anyhow!("session store poisoned"))?;
        *guard = session.clone();
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.save(&StoredSession::default())
    }
}
