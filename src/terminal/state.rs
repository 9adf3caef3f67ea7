use anyhow::Result;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::time::Duration;

use crate::api::{ApiClient, ApiError};
use crate::auth::Session;
use crate::config::Config;
use crate::router::{Route, Router, after_login};
use crate::terminal::fetch::{self, AppMessage, Fetch, ReqId};
use crate::terminal::screens::dashboard::{ANALYSIS_FAILED, CardAnalysis, FETCH_FAILED};
use crate::terminal::screens::detail::{DRAFT_FAILED, LOAD_FAILED, TRASH_FAILED};
use crate::terminal::screens::login::LOGIN_FAILED;
use crate::terminal::screens::{DashboardScreen, DetailScreen, LoginScreen, Screen};

pub const SESSION_EXPIRED: &str = "Your session has ended. Please sign in again.";

/// Settings the screens need from the config.
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub redirect_uri: String,
    pub callback_timeout: Duration,
    pub draft_tone: String,
}

impl From<&Config> for AppSettings {
    fn from(cfg: &Config) -> Self {
        Self {
            redirect_uri: cfg.redirect_uri.clone(),
            callback_timeout: Duration::from_secs(cfg.callback_timeout_secs),
            draft_tone: cfg.draft_tone.clone(),
        }
    }
}

/// Everything the TUI knows. Lives on the UI thread; workers only talk to
/// it through `AppMessage`.
pub struct AppState {
    pub session: Session,
    pub router: Router,
    pub screen: Screen,
    pub notice: Option<String>,
    pub tick: usize,
    api: Arc<ApiClient>,
    settings: AppSettings,
    next_req: ReqId,
    tx: Sender<AppMessage>,
    rx: Receiver<AppMessage>,
}

impl AppState {
    pub fn new(mut session: Session, api: Arc<ApiClient>, settings: AppSettings, start: Route) -> Self {
        session.watch(&api);
        let router = Router::new(start, &session);
        let (tx, rx) = channel();
        let mut state = Self {
            session,
            router,
            screen: Screen::Login(LoginScreen::default()),
            notice: None,
            tick: 0,
            api,
            settings,
            next_req: 0,
            tx,
            rx,
        };
        state.mount();
        state
    }

    fn req(&mut self) -> ReqId {
        self.next_req += 1;
        self.next_req
    }

    // ----- navigation -----

    pub fn navigate(&mut self, to: Route) {
        if self.router.navigate(to, &self.session) {
            self.mount();
        }
    }

    /// Builds the screen for the current route and starts its fetches.
    fn mount(&mut self) {
        let route = self.router.current().clone();
        match route {
            Route::Login { from } => {
                if self.session.is_authenticated() {
                    let target = after_login(from.as_deref());
                    log::debug!("Already authenticated, redirecting to {}", target.path());
                    self.navigate(target);
                    return;
                }
                self.screen = Screen::Login(LoginScreen::new(from.map(|b| *b)));
            }
            Route::Dashboard => {
                self.screen = Screen::Dashboard(DashboardScreen::default());
                self.load_dashboard();
            }
            Route::EmailDetail { id } => {
                self.screen = Screen::Detail(DetailScreen::new(id));
                self.load_detail();
            }
        }
    }

    pub fn logout(&mut self) {
        if let Err(e) = self.session.logout() {
            log::error!("Logout failed to clear the store: {e}");
        }
        self.navigate(Route::login());
    }

    // ----- actions -----

    pub fn sign_in(&mut self) {
        let req = self.req();
        let Screen::Login(s) = &mut self.screen else {
            return;
        };
        if s.signing_in() {
            return;
        }
        s.error = None;
        s.auth_url = None;
        s.sign_in_req = Some(req);
        fetch::spawn_sign_in(
            self.api.clone(),
            self.tx.clone(),
            req,
            self.settings.redirect_uri.clone(),
            self.settings.callback_timeout,
        );
    }

    pub fn load_dashboard(&mut self) {
        let req = self.req();
        let Screen::Dashboard(s) = &mut self.screen else {
            return;
        };
        s.load_req = Some(req);
        s.data = Fetch::Loading;
        s.card = None;
        fetch::spawn_dashboard(self.api.clone(), self.tx.clone(), req);
    }

    /// Expands the selected card (fetching its analysis) or collapses it.
    pub fn toggle_card(&mut self) {
        let req = self.req();
        let Screen::Dashboard(s) = &mut self.screen else {
            return;
        };
        let Some(key) = s.selected_email().map(|e| e.key().to_string()) else {
            return;
        };
        match &s.card {
            Some(card) if card.key == key && !matches!(card.fetch, Fetch::Failed(_)) => {
                s.card = None;
            }
            _ => {
                s.card = Some(CardAnalysis {
                    key: key.clone(),
                    req,
                    fetch: Fetch::Loading,
                });
                fetch::spawn_card_analysis(self.api.clone(), self.tx.clone(), req, key);
            }
        }
    }

    pub fn open_selected(&mut self) {
        let Screen::Dashboard(s) = &self.screen else {
            return;
        };
        if let Some(key) = s.selected_email().map(|e| e.key().to_string()) {
            self.navigate(Route::EmailDetail { id: key });
        }
    }

    pub fn load_detail(&mut self) {
        let req = self.req();
        let Screen::Detail(s) = &mut self.screen else {
            return;
        };
        s.load_req = Some(req);
        s.email = Fetch::Loading;
        s.analysis = Fetch::Idle;
        s.notice = None;
        fetch::spawn_detail(self.api.clone(), self.tx.clone(), req, s.id.clone());
    }

    pub fn trash(&mut self) {
        let req = self.req();
        let Screen::Detail(s) = &mut self.screen else {
            return;
        };
        if !s.can_trash() {
            return;
        }
        s.notice = None;
        s.trash_req = Some(req);
        fetch::spawn_trash(self.api.clone(), self.tx.clone(), req, s.id.clone());
    }

    pub fn draft(&mut self) {
        let req = self.req();
        let Screen::Detail(s) = &mut self.screen else {
            return;
        };
        if s.email.loaded().is_none() || s.draft.is_loading() {
            return;
        }
        s.draft_req = Some(req);
        s.draft = Fetch::Loading;
        fetch::spawn_draft(
            self.api.clone(),
            self.tx.clone(),
            req,
            s.id.clone(),
            self.settings.draft_tone.clone(),
        );
    }

    // ----- background results -----

    /// Applies everything the workers posted, then enforces a 401 if one was
    /// seen. Never blocks.
    pub fn tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
        while let Ok(msg) = self.rx.try_recv() {
            self.apply(msg);
        }
        self.enforce_unauthorized();
    }

    /// Like `tick`, but waits up to `wait` for the first message. Returns
    /// whether anything arrived.
    pub fn pump(&mut self, wait: Duration) -> bool {
        let got = match self.rx.recv_timeout(wait) {
            Ok(msg) => {
                self.apply(msg);
                true
            }
            Err(_) => false,
        };
        self.tick();
        got
    }

    /// A login screen already on display is left alone so an in-flight
    /// sign-in and its error stay visible.
    fn enforce_unauthorized(&mut self) {
        if !self.session.sync_unauthorized() {
            return;
        }
        self.notice = Some(SESSION_EXPIRED.to_string());
        if matches!(self.screen, Screen::Login(_)) {
            return;
        }
        self.router.force_login();
        self.mount();
    }

    fn apply(&mut self, msg: AppMessage) {
        match msg {
            AppMessage::AuthUrl { req, url } => {
                if let Screen::Login(s) = &mut self.screen
                    && s.sign_in_req == Some(req)
                {
                    s.auth_url = Some(url);
                }
            }
            AppMessage::SignedIn { req, result } => self.apply_sign_in(req, result),
            AppMessage::Dashboard { req, result } => {
                let Screen::Dashboard(s) = &mut self.screen else {
                    return;
                };
                if s.load_req != Some(req) {
                    return;
                }
                s.load_req = None;
                match result {
                    Ok(data) => s.set_data(data),
                    Err(e) => {
                        log::error!("Error fetching data: {e}");
                        s.data = Fetch::Failed(user_message(&e, FETCH_FAILED));
                    }
                }
            }
            AppMessage::CardAnalysis { req, result } => {
                let Screen::Dashboard(s) = &mut self.screen else {
                    return;
                };
                let Some(card) = s.card.as_mut().filter(|c| c.req == req) else {
                    return;
                };
                card.fetch = match result {
                    Ok(a) => Fetch::Loaded(a),
                    Err(e) => {
                        log::error!("Error analyzing email {}: {e}", card.key);
                        Fetch::Failed(user_message(&e, ANALYSIS_FAILED))
                    }
                };
            }
            AppMessage::Detail { req, result } => {
                let Screen::Detail(s) = &mut self.screen else {
                    return;
                };
                if s.load_req != Some(req) {
                    return;
                }
                match result {
                    Ok(email) => s.set_email(email),
                    Err(e) => {
                        log::error!("Error loading email {}: {e}", s.id);
                        s.load_req = None;
                        s.email = Fetch::Failed(user_message(&e, LOAD_FAILED));
                    }
                }
            }
            AppMessage::DetailAnalysis { req, result } => {
                let Screen::Detail(s) = &mut self.screen else {
                    return;
                };
                if s.load_req != Some(req) {
                    return;
                }
                s.load_req = None;
                s.analysis = match result {
                    Ok(a) => Fetch::Loaded(a),
                    Err(e) => {
                        log::error!("Error analyzing email {}: {e}", s.id);
                        Fetch::Failed(user_message(&e, ANALYSIS_FAILED))
                    }
                };
            }
            AppMessage::Trashed { req, result } => {
                let Screen::Detail(s) = &mut self.screen else {
                    return;
                };
                if s.trash_req != Some(req) {
                    return;
                }
                s.trash_req = None;
                match result {
                    Ok(()) => {
                        log::debug!("Email {} moved to trash", s.id);
                        self.navigate(Route::Dashboard);
                    }
                    Err(e) => {
                        log::error!("Error moving email to trash: {e}");
                        s.notice = Some(user_message(&e, TRASH_FAILED));
                    }
                }
            }
            AppMessage::Draft { req, result } => {
                let Screen::Detail(s) = &mut self.screen else {
                    return;
                };
                if s.draft_req != Some(req) {
                    return;
                }
                s.draft_req = None;
                s.draft = match result {
                    Ok(d) => Fetch::Loaded(d),
                    Err(e) => {
                        log::error!("Error drafting response: {e}");
                        Fetch::Failed(user_message(&e, DRAFT_FAILED))
                    }
                };
            }
        }
    }

    fn apply_sign_in(&mut self, req: ReqId, result: Result<crate::domain::email::Credentials>) {
        let Screen::Login(s) = &mut self.screen else {
            return;
        };
        if s.sign_in_req != Some(req) {
            return;
        }
        s.sign_in_req = None;
        let from = s.from.clone();

        let outcome = result.and_then(|creds| self.session.establish(creds));
        match outcome {
            Ok(()) => {
                self.notice = None;
                self.navigate(after_login(from.as_ref()));
            }
            Err(e) => {
                log::error!("Login error: {e:#}");
                if let Err(e) = self.session.logout() {
                    log::error!("Failed to clear session: {e}");
                }
                if let Screen::Login(s) = &mut self.screen {
                    s.error = Some(LOGIN_FAILED.to_string());
                }
            }
        }
    }
}

/// A 401 is handled globally, so the screen shows nothing specific for it.
fn user_message(e: &ApiError, fallback: &str) -> String {
    if e.is_unauthorized() {
        SESSION_EXPIRED.to_string()
    } else {
        fallback.to_string()
    }
}
