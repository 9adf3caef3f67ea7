use oauth2::AuthorizationCode;
use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

use crate::api::{ApiError, ApiResult};
use crate::auth::store::SessionStore;
use crate::config::Config;
use crate::domain::email::{
    AuthUrlResponse, Credentials, DraftResponse, EmailAnalysis, EmailDetail, EmailList, Stats,
};

/// Published once per 401 response, after the persisted session is gone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnauthorizedEvent {
    pub path: String,
}

/// Thin blocking client for the assistant backend.
///
/// The bearer token is read from the session store on every request, so a
/// sign-in or sign-out elsewhere is picked up without rebuilding the client.
pub struct ApiClient {
    base: Url,
    http: Client,
    store: Arc<dyn SessionStore>,
    subscribers: Mutex<Vec<Sender<UnauthorizedEvent>>>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Auth {
    Bearer,
    None,
}

impl ApiClient {
    pub fn new(base_url: &str, store: Arc<dyn SessionStore>, timeout: Duration) -> ApiResult<Self> {
        let base = Url::parse(base_url)
            .map_err(|e| ApiError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(base_url.to_string()));
        }
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("gator_mail/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            base,
            http,
            store,
            subscribers: Mutex::new(Vec::new()),
        })
    }

    pub fn from_config(cfg: &Config, store: Arc<dyn SessionStore>) -> ApiResult<Self> {
        Self::new(
            &cfg.api_base_url,
            store,
            Duration::from_secs(cfg.request_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Receives an event for every 401 seen from now on.
    pub fn subscribe_unauthorized(&self) -> Receiver<UnauthorizedEvent> {
        let (tx, rx) = channel();
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.push(tx);
        }
        rx
    }

    // ----- operations -----

    pub fn list_emails(&self) -> ApiResult<EmailList> {
        let url = self.url(&["emails"])?;
        self.json(self.http.get(url), Auth::Bearer)
    }

    pub fn get_email(&self, id: &str) -> ApiResult<EmailDetail> {
        let url = self.url(&["emails", id])?;
        self.json(self.http.get(url), Auth::Bearer)
    }

    pub fn analyze_email(&self, id: &str) -> ApiResult<EmailAnalysis> {
        let url = self.url(&["emails", id, "analyze"])?;
        self.json(self.http.get(url), Auth::Bearer)
    }

    pub fn move_to_trash(&self, id: &str) -> ApiResult<()> {
        let url = self.url(&["emails", id, "trash"])?;
        self.send(self.http.post(url), Auth::Bearer).map(|_| ())
    }

    pub fn get_stats(&self) -> ApiResult<Stats> {
        let url = self.url(&["stats"])?;
        self.json(self.http.get(url), Auth::Bearer)
    }

    /// Asks the backend for a reply draft. The backend takes the token as a
    /// query parameter on this route.
    pub fn draft_response(&self, id: &str, tone: &str) -> ApiResult<DraftResponse> {
        let url = self.url(&["emails", id, "draft-response"])?;
        let token = self.stored_token().unwrap_or_default();
        let req = self
            .http
            .post(url)
            .query(&[("tone", tone), ("access_token", token.as_str())]);
        self.json(req, Auth::Bearer)
    }

    pub fn get_auth_url(&self) -> ApiResult<Url> {
        let url = self.url(&["auth", "url"])?;
        let resp: AuthUrlResponse = self.json(self.http.get(url), Auth::None)?;
        Url::parse(&resp.auth_url).map_err(|e| ApiError::Decode(format!("auth_url: {e}")))
    }

    pub fn exchange_code(&self, code: &AuthorizationCode) -> ApiResult<Credentials> {
        let url = self.url(&["auth", "callback"])?;
        let req = self
            .http
            .post(url)
            .query(&[("code", code.secret().as_str())])
            .json(&serde_json::json!({ "code": code.secret() }));
        self.json(req, Auth::None)
    }

    // ----- plumbing -----

    fn url(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn stored_token(&self) -> Option<String> {
        match self.store.access_token() {
            Ok(t) => t,
            Err(e) => {
                log::warn!("Could not read session store: {e}");
                None
            }
        }
    }

    fn json<T: DeserializeOwned>(&self, req: RequestBuilder, auth: Auth) -> ApiResult<T> {
        let resp = self.send(req, auth)?;
        let body = resp.text()?;
        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    fn send(&self, req: RequestBuilder, auth: Auth) -> ApiResult<Response> {
        let req = match (auth, self.stored_token()) {
            (Auth::Bearer, Some(token)) => req.bearer_auth(token),
            _ => req,
        };

        let resp = req.send()?;
        let status = resp.status();
        let path = resp.url().path().to_string();
        log::debug!("{path} -> {status}");

        if status == StatusCode::UNAUTHORIZED {
            self.handle_unauthorized(&path);
            return Err(ApiError::Unauthorized);
        }

        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(ApiError::Status {
                status,
                detail: error_detail(&body),
            });
        }

        Ok(resp)
    }

    fn handle_unauthorized(&self, path: &str) {
        log::warn!("{path} answered 401; clearing stored session");
        if let Err(e) = self.store.clear() {
            log::error!("Failed to clear session store: {e}");
        }
        let event = UnauthorizedEvent {
            path: path.to_string(),
        };
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.retain(|tx| tx.send(event.clone()).is_ok());
        }
    }
}

/// FastAPI reports errors as `{"detail": "..."}`; fall back to the raw body.
fn error_detail(body: &str) -> String {
    #[derive(serde::Deserialize)]
    struct Detail {
        detail: serde_json::Value,
    }

    match serde_json::from_str::<Detail>(body) {
        Ok(Detail {
            detail: serde_json::Value::String(s),
        }) => s,
        Ok(Detail { detail }) => detail.to_string(),
        Err(_) => body.chars().take(200).collect(),
    }
}
