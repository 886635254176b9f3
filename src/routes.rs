use serde::Serialize;

use crate::config::SessionConfig;
use crate::navigation::{Navigation, Navigator};
use crate::session::{Session, SessionContext};

/// Screens of the dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "screen", content = "id", rename_all = "snake_case")]
pub enum Route {
    Landing,
    Login,
    Dashboard,
    Agents,
    Architecture,
    Compliance,
    Contract(String),
    /// Any path outside the catalog; gated like a protected screen
    Other(String),
}

impl Route {
    /// Match a navigation path, ignoring query string, fragment and trailing slashes
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Route::Landing,
            ["login"] => Route::Login,
            ["dashboard"] => Route::Dashboard,
            ["agents"] => Route::Agents,
            ["architecture"] => Route::Architecture,
            ["compliance"] => Route::Compliance,
            ["contracts", id] => Route::Contract((*id).to_string()),
            _ => Route::Other(format!("/{}", segments.join("/"))),
        }
    }

    /// Login and landing are only for visitors without a session
    pub fn is_public(&self) -> bool {
        matches!(self, Route::Landing | Route::Login)
    }

    pub fn path(&self) -> String {
        match self {
            Route::Landing => "/".to_string(),
            Route::Login => "/login".to_string(),
            Route::Dashboard => "/dashboard".to_string(),
            Route::Agents => "/agents".to_string(),
            Route::Architecture => "/architecture".to_string(),
            Route::Compliance => "/compliance".to_string(),
            Route::Contract(id) => format!("/contracts/{}", id),
            Route::Other(path) => path.clone(),
        }
    }
}

/// Outcome of one navigation attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Admission {
    Admitted,
    Denied { redirect: Navigation },
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Admission::Admitted)
    }

    pub fn redirect(&self) -> Option<&Navigation> {
        match self {
            Admission::Admitted => None,
            Admission::Denied { redirect } => Some(redirect),
        }
    }
}

/// Admission rule for a route under a given session snapshot
pub fn decide(route: &Route, session: &Session) -> Admission {
    match (route.is_public(), session.is_present()) {
        (false, true) | (true, false) => Admission::Admitted,
        (false, false) => Admission::Denied {
            redirect: Navigation::ToLogin,
        },
        (true, true) => Admission::Denied {
            redirect: Navigation::ToDefault,
        },
    }
}

/// Per-navigation admission check against the live session.
/// Nothing is remembered between attempts, including the denied destination.
#[derive(Debug, Clone)]
pub struct RouteGate {
    session: SessionContext,
    navigator: Navigator,
    paths: SessionConfig,
}

impl RouteGate {
    pub fn new(session: SessionContext, navigator: Navigator, paths: SessionConfig) -> Self {
        Self {
            session,
            navigator,
            paths,
        }
    }

    /// Match a path against the catalog, with the login screen at its configured path
    pub fn route(&self, path: &str) -> Route {
        let route = Route::parse(path);
        let login = Route::parse(&self.paths.login_path);
        if route.path() == login.path() {
            return Route::Login;
        }
        match route {
            // Relocated login: the stock path is an ordinary screen
            Route::Login => Route::Other(Route::Login.path()),
            other => other,
        }
    }

    /// Decide without side effects
    pub fn check(&self, path: &str) -> Admission {
        decide(&self.route(path), &self.session.current())
    }

    /// Decide and, when denied, emit the redirect for the host to follow
    pub fn navigate(&self, path: &str) -> Admission {
        let admission = self.check(path);
        if let Admission::Denied { redirect } = &admission {
            tracing::debug!("Navigation to {} denied, redirecting to {}", path, self.redirect_path(redirect));
            self.navigator.emit(redirect.clone());
        }
        admission
    }

    /// Concrete path a redirect resolves to
    pub fn redirect_path(&self, redirect: &Navigation) -> &str {
        redirect.path(&self.paths)
    }
}
