use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;

use crate::api::{ApiClient, ApiError, ApiResult};
use crate::auth::{CallbackListener, begin_login, resolve_callback};
use crate::domain::email::{
    Credentials, DraftResponse, EmailAnalysis, EmailDetail, EmailList, Stats,
};

/// Lifecycle of one screen-owned fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Fetch<T> {
    #[default]
    Idle,
    Loading,
    Loaded(T),
    Failed(String),
}

impl<T> Fetch<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Fetch::Loading)
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            Fetch::Loaded(v) => Some(v),
            _ => None,
        }
    }
}

/// Request id. Screens remember the ids they are waiting on; anything else
/// that arrives belongs to a screen that is gone and is dropped.
pub type ReqId = u64;

#[derive(Debug)]
pub struct DashboardData {
    pub list: EmailList,
    pub stats: Stats,
}

/// Results posted back to the UI thread.
#[derive(Debug)]
pub enum AppMessage {
    AuthUrl { req: ReqId, url: String },
    SignedIn { req: ReqId, result: anyhow::Result<Credentials> },
    Dashboard { req: ReqId, result: ApiResult<DashboardData> },
    CardAnalysis { req: ReqId, result: ApiResult<EmailAnalysis> },
    Detail { req: ReqId, result: ApiResult<EmailDetail> },
    DetailAnalysis { req: ReqId, result: ApiResult<EmailAnalysis> },
    Trashed { req: ReqId, result: ApiResult<()> },
    Draft { req: ReqId, result: ApiResult<DraftResponse> },
}

fn joined<T>(r: thread::Result<ApiResult<T>>) -> ApiResult<T> {
    r.unwrap_or(Err(ApiError::Interrupted))
}

/// Emails and stats side by side; the result waits for both.
pub fn spawn_dashboard(api: Arc<ApiClient>, tx: Sender<AppMessage>, req: ReqId) {
    thread::spawn(move || {
        let (emails, stats) = thread::scope(|s| {
            let emails = s.spawn(|| api.list_emails());
            let stats = s.spawn(|| api.get_stats());
            (joined(emails.join()), joined(stats.join()))
        });
        let result = emails.and_then(|list| stats.map(|stats| DashboardData { list, stats }));
        let _ = tx.send(AppMessage::Dashboard { req, result });
    });
}

pub fn spawn_card_analysis(api: Arc<ApiClient>, tx: Sender<AppMessage>, req: ReqId, id: String) {
    thread::spawn(move || {
        let result = api.analyze_email(&id);
        let _ = tx.send(AppMessage::CardAnalysis { req, result });
    });
}

/// The message first, then its analysis. A failed message load skips the
/// analysis.
pub fn spawn_detail(api: Arc<ApiClient>, tx: Sender<AppMessage>, req: ReqId, id: String) {
    thread::spawn(move || {
        let detail = api.get_email(&id);
        let ok = detail.is_ok();
        if tx.send(AppMessage::Detail { req, result: detail }).is_err() || !ok {
            return;
        }
        let result = api.analyze_email(&id);
        let _ = tx.send(AppMessage::DetailAnalysis { req, result });
    });
}

pub fn spawn_trash(api: Arc<ApiClient>, tx: Sender<AppMessage>, req: ReqId, id: String) {
    thread::spawn(move || {
        let result = api.move_to_trash(&id);
        let _ = tx.send(AppMessage::Trashed { req, result });
    });
}

pub fn spawn_draft(
    api: Arc<ApiClient>,
    tx: Sender<AppMessage>,
    req: ReqId,
    id: String,
    tone: String,
) {
    thread::spawn(move || {
        let result = api.draft_response(&id, &tone);
        let _ = tx.send(AppMessage::Draft { req, result });
    });
}

/// Binds the redirect listener, sends the browser to the provider and waits
/// for it to come back. Only credentials travel back; the UI thread decides
/// what to do with them.
pub fn spawn_sign_in(
    api: Arc<ApiClient>,
    tx: Sender<AppMessage>,
    req: ReqId,
    redirect_uri: String,
    timeout: Duration,
) {
    thread::spawn(move || {
        let result = sign_in_flow(&api, &tx, req, &redirect_uri, timeout);
        let _ = tx.send(AppMessage::SignedIn { req, result });
    });
}

fn sign_in_flow(
    api: &ApiClient,
    tx: &Sender<AppMessage>,
    req: ReqId,
    redirect_uri: &str,
    timeout: Duration,
) -> anyhow::Result<Credentials> {
    let listener = CallbackListener::bind(redirect_uri, timeout)?;
    let url = begin_login(api)?;
    let _ = tx.send(AppMessage::AuthUrl {
        req,
        url: url.to_string(),
    });
    let params = listener.wait()?;
    resolve_callback(api, &params)
}
