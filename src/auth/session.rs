use anyhow::{Result, anyhow};
use chrono::{DateTime, NaiveDateTime, Utc};
use oauth2::{AccessToken, AuthorizationCode};
use std::sync::Arc;
use std::sync::mpsc::Receiver;
use url::Url;

use crate::api::{ApiClient, UnauthorizedEvent};
use crate::auth::callback::{CallbackListener, CallbackParams};
use crate::auth::store::{SessionStore, StoredSession};
use crate::domain::email::Credentials;

/// Authentication state of the running client.
///
/// Owned by whoever drives the UI and handed to the views by reference.
/// `is_authenticated()` is exactly "an access token is held".
pub struct Session {
    store: Arc<dyn SessionStore>,
    access_token: Option<AccessToken>,
    user_email: Option<String>,
    token_expiry: Option<String>,
    unauthorized: Option<Receiver<UnauthorizedEvent>>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &self.access_token)
            .field("user_email", &self.user_email)
            .field("token_expiry", &self.token_expiry)
            .finish()
    }
}

impl Session {
    /// Hydrates from the store. A stored token counts as signed in; nothing
    /// is checked with the backend here.
    pub fn initialize(store: Arc<dyn SessionStore>) -> Result<Self> {
        let stored = store.load()?;
        let session = Self {
            store,
            access_token: stored.access_token.map(AccessToken::new),
            user_email: stored.user_email,
            token_expiry: stored.token_expiry,
            unauthorized: None,
        };

        if session.is_authenticated() {
            log::debug!("Initializing with stored token");
            if session.expiry_passed(Utc::now()) == Some(true) {
                log::warn!(
                    "Stored token expiry {} has passed; the backend will decide",
                    session.token_expiry.as_deref().unwrap_or_default()
                );
            }
        }
        Ok(session)
    }

    /// Starts listening for the client's 401 events.
    pub fn watch(&mut self, api: &ApiClient) {
        self.unauthorized = Some(api.subscribe_unauthorized());
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    pub fn access_token(&self) -> Option<&AccessToken> {
        self.access_token.as_ref()
    }

    pub fn user_email(&self) -> Option<&str> {
        self.user_email.as_deref()
    }

    pub fn token_expiry(&self) -> Option<&str> {
        self.token_expiry.as_deref()
    }

    /// `None` when there is no expiry or it cannot be parsed.
    pub fn expiry_passed(&self, now: DateTime<Utc>) -> Option<bool> {
        let expiry = parse_expiry(self.token_expiry.as_deref()?)?;
        Some(expiry <= now)
    }

    /// Replaces the whole session with `creds`, in memory and on disk.
    pub fn establish(&mut self, creds: Credentials) -> Result<()> {
        let stored = StoredSession {
            access_token: Some(creds.access_token),
            user_email: creds.email.filter(|s| !s.is_empty()),
            token_expiry: creds.expires_in.filter(|s| !s.is_empty()),
        };
        self.store.save(&stored)?;
        self.access_token = stored.access_token.map(AccessToken::new);
        self.user_email = stored.user_email;
        self.token_expiry = stored.token_expiry;
        log::info!(
            "Signed in{}",
            self.user_email
                .as_deref()
                .map(|e| format!(" as {e}"))
                .unwrap_or_default()
        );
        Ok(())
    }

    /// Forgets everything. Safe to call when already signed out.
    pub fn logout(&mut self) -> Result<()> {
        log::debug!("Logout initiated");
        self.access_token = None;
        self.user_email = None;
        self.token_expiry = None;
        self.store.clear()
    }

    /// Drains pending 401 events; logs out and returns `true` if any arrived.
    pub fn sync_unauthorized(&mut self) -> bool {
        let Some(rx) = &self.unauthorized else {
            return false;
        };
        let mut hit = false;
        while let Ok(event) = rx.try_recv() {
            log::warn!("Backend rejected the session on {}", event.path);
            hit = true;
        }
        if hit && let Err(e) = self.logout() {
            log::error!("Failed to clear session after 401: {e}");
        }
        hit
    }

    /// Runs the whole sign-in: opens the provider page, waits for the
    /// redirect on `listener`, then completes the callback.
    pub fn login(&mut self, api: &ApiClient, listener: &CallbackListener) -> Result<()> {
        begin_login(api)?;
        let params = listener.wait()?;
        self.complete_callback(api, &params)
    }

    /// Applies the provider redirect. On failure no token is left behind.
    pub fn complete_callback(&mut self, api: &ApiClient, params: &CallbackParams) -> Result<()> {
        match resolve_callback(api, params) {
            Ok(creds) => self.establish(creds),
            Err(e) => {
                log::error!("Auth callback failed: {e}");
                self.logout()?;
                Err(e)
            }
        }
    }
}

/// Fetches the provider URL and points the system browser at it. Failing to
/// launch a browser is not fatal; the URL is logged and returned.
pub fn begin_login(api: &ApiClient) -> Result<Url> {
    let auth_url = api
        .get_auth_url()
        .map_err(|e| anyhow!("Error initiating login: {e}"))?;
    log::info!("Opening browser for sign-in");
    if let Err(e) = open::that(auth_url.as_str()) {
        log::warn!("Could not open browser automatically ({e}); open {auth_url}");
    }
    Ok(auth_url)
}

/// Turns redirect parameters into credentials. A `token` is used as is, a
/// `code` is exchanged with the backend.
pub fn resolve_callback(api: &ApiClient, params: &CallbackParams) -> Result<Credentials> {
    if let Some(token) = &params.token {
        log::debug!("Auth callback received with token");
        return Ok(Credentials {
            access_token: token.clone(),
            email: None,
            expires_in: None,
        });
    }

    if let Some(code) = &params.code {
        log::debug!("Auth callback received with code");
        let creds = api
            .exchange_code(&AuthorizationCode::new(code.clone()))
            .map_err(|e| anyhow!("Code exchange failed: {e}"))?;
        if creds.access_token.is_empty() {
            return Err(anyhow!("Code exchange returned an empty access token"));
        }
        return Ok(creds);
    }

    if let Some(err) = &params.error {
        return Err(anyhow!("Provider returned an error: {err}"));
    }

    Err(anyhow!("Redirect carried neither token nor code"))
}

fn parse_expiry(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    // naive ISO timestamps are UTC
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|n| n.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::store::MemoryStore;
    use chrono::TimeZone;

    fn stored(token: Option<&str>) -> Arc<dyn SessionStore> {
        Arc::new(MemoryStore::with(StoredSession {
            access_token: token.map(str::to_string),
            user_email: token.map(|_| "me@example.com".to_string()),
            token_expiry: token.map(|_| "2026-10-18T10:00:00.5".to_string()),
        }))
    }

    #[test]
    fn authenticated_iff_token_present() {
        let s = Session::initialize(stored(Some("t"))).unwrap();
        assert!(s.is_authenticated());
        assert_eq!(s.access_token().map(|t| t.secret().as_str()), Some("t"));

        let s = Session::initialize(stored(None)).unwrap();
        assert!(!s.is_authenticated());
    }

    #[test]
    fn logout_clears_memory_and_store_and_is_idempotent() {
        let store = stored(Some("t"));
        let mut s = Session::initialize(store.clone()).unwrap();

        s.logout().unwrap();
        assert!(!s.is_authenticated());
        assert_eq!(s.user_email(), None);
        assert!(store.load().unwrap().is_empty());

        s.logout().unwrap();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn establish_overwrites_every_field() {
        let store = stored(Some("old"));
        let mut s = Session::initialize(store.clone()).unwrap();

        s.establish(Credentials {
            access_token: "new".into(),
            email: None,
            expires_in: None,
        })
        .unwrap();

        assert_eq!(
            store.load().unwrap(),
            StoredSession {
                access_token: Some("new".into()),
                user_email: None,
                token_expiry: None,
            }
        );
        assert_eq!(s.user_email(), None);
    }

    #[test]
    fn expiry_is_parsed_but_not_enforced() {
        let s = Session::initialize(stored(Some("t"))).unwrap();
        let before = Utc.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap();
        let after = Utc.with_ymd_and_hms(2026, 10, 18, 11, 0, 0).unwrap();
        assert_eq!(s.expiry_passed(before), Some(false));
        assert_eq!(s.expiry_passed(after), Some(true));
        assert!(s.is_authenticated());
    }

    #[test]
    fn expiry_formats() {
        assert!(parse_expiry("2026-10-18T10:00:00Z").is_some());
        assert!(parse_expiry("2026-10-18T10:00:00+02:00").is_some());
        assert!(parse_expiry("2026-10-18T10:00:00").is_some());
        assert!(parse_expiry("3599").is_none());
    }

    #[test]
    fn debug_output_hides_the_token() {
        let s = Session::initialize(stored(Some("supersecret"))).unwrap();
        assert!(!format!("{s:?}").contains("supersecret"));
    }
}
