use anyhow::{Result, anyhow};
use keyring::{Entry, Error as KeyringError};

use crate::auth::store::{SessionStore, StoredSession};

const SERVICE: &str = "gator_mail";

const ACCESS_TOKEN: &str = "accessToken";
const USER_EMAIL: &str = "userEmail";
const TOKEN_EXPIRY: &str = "tokenExpiry";

/// Session kept in the OS keyring, one entry per field.
pub struct KeyringStore {
    service: String,
}

impl KeyringStore {
    pub fn new() -> Self {
        Self::with_service(SERVICE)
    }

    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, key: &str) -> Result<Entry> {
        Entry::new(&self.service, key).map_err(|e| anyhow!(e.to_string()))
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        match self.entry(key)?.get_password() {
            Ok(v) => Ok(Some(v)),
            Err(KeyringError::NoEntry) => Ok(None),
            Err(e) => Err(anyhow!(e.to_string())),
        }
    }

    fn set(&self, key: &str, value: Option<&str>) -> Result<()> {
        match value {
            Some(v) => self
                .entry(key)?
                .set_password(v)
                .map_err(|e| anyhow!(e.to_string())),
            None => self.remove(key),
        }
    }

    fn remove(&self, key: &str) -> Result<()> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(KeyringError::NoEntry) => Ok(()),
            Err(e) => Err(anyhow!(e.to_string())),
        }
    }
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore for KeyringStore {
    fn load(&self) -> Result<StoredSession> {
        Ok(StoredSession {
            access_token: self.get(ACCESS_TOKEN)?,
            user_email: self.get(USER_EMAIL)?,
            token_expiry: self.get(TOKEN_EXPIRY)?,
        })
    }

    fn save(&self, session: &StoredSession) -> Result<()> {
        self.set(ACCESS_TOKEN, session.access_token.as_deref())?;
        self.set(USER_EMAIL, session.user_email.as_deref())?;
        self.set(TOKEN_EXPIRY, session.token_expiry.as_deref())?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        // every field goes even if one removal fails
        let results = [
            self.remove(ACCESS_TOKEN),
            self.remove(USER_EMAIL),
            self.remove(TOKEN_EXPIRY),
        ];
        results.into_iter().collect()
    }

    fn access_token(&self) -> Result<Option<String>> {
        self.get(ACCESS_TOKEN)
    }
}
