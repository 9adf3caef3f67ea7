//! Client-side routes and the guard in front of the protected ones.

use crate::auth::Session;
use crate::domain::email::EmailId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `from` is where the user was headed when the guard stopped them.
    Login { from: Option<Box<Route>> },
    Dashboard,
    EmailDetail { id: EmailId },
}

impl Route {
    pub fn login() -> Self {
        Route::Login { from: None }
    }

    /// Resolves a path the way the app's route table does. `/` and unknown
    /// paths land on the dashboard or login depending on `authenticated`.
    pub fn parse(path: &str, authenticated: bool) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            ["login"] => Route::login(),
            ["dashboard"] => Route::Dashboard,
            ["emails", id] => Route::EmailDetail {
                id: decode_segment(id),
            },
            _ if authenticated => Route::Dashboard,
            _ => Route::login(),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Login { .. } => "/login".to_string(),
            Route::Dashboard => "/dashboard".to_string(),
            Route::EmailDetail { id } => format!("/emails/{}", urlencoding::encode(id)),
        }
    }

    pub fn is_protected(&self) -> bool {
        !matches!(self, Route::Login { .. })
    }
}

fn decode_segment(s: &str) -> String {
    urlencoding::decode(s)
        .map(|d| d.into_owned())
        .unwrap_or_else(|_| s.to_string())
}

/// What the guard lets through for `requested`.
pub fn guard(requested: Route, session: &Session) -> Route {
    if requested.is_protected() && !session.is_authenticated() {
        log::debug!("Not authenticated, redirecting {} to login", requested.path());
        return Route::Login {
            from: Some(Box::new(requested)),
        };
    }
    requested
}

/// Where the login screen sends an authenticated user.
pub fn after_login(from: Option<&Route>) -> Route {
    match from {
        Some(r) if r.is_protected() => r.clone(),
        _ => Route::Dashboard,
    }
}

/// Current location, always passed through the guard.
#[derive(Debug)]
pub struct Router {
    current: Route,
}

impl Router {
    pub fn new(initial: Route, session: &Session) -> Self {
        Self {
            current: guard(initial, session),
        }
    }

    pub fn current(&self) -> &Route {
        &self.current
    }

    /// Replaces the current route. Returns `true` if it changed.
    pub fn navigate(&mut self, to: Route, session: &Session) -> bool {
        let next = guard(to, session);
        if next == self.current {
            return false;
        }
        log::debug!("navigate {} -> {}", self.current.path(), next.path());
        self.current = next;
        true
    }

    /// Forced trip to login, e.g. after a 401. Keeps the location the user
    /// was on so signing back in returns there.
    pub fn force_login(&mut self) {
        let from = match &self.current {
            Route::Login { from } => from.clone(),
            other => Some(Box::new(other.clone())),
        };
        self.current = Route::Login { from };
    }
}
