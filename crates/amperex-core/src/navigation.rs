//! Routes, redirects, and the route guard.
//!
//! The routing surface is a fixed set of paths, each mapped to one page.
//! `/` is the entry route (the login page). Every other route is protected:
//! entering it requires a stored token, checked synchronously by
//! [`RouteGuard`] before the page does any work.
//!
//! Redirects are delivered through the [`Navigator`] trait so the gateway and
//! the auth service can force a return to the entry route without knowing
//! which front end is running.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use crate::session::SessionStore;

/// A page of the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// `/`: sign in, forgot password, OTP verification.
    Login,
    /// `/dashboard`
    Dashboard,
    /// `/team` and anything below it.
    Team,
}

impl Route {
    /// The route every redirect lands on.
    pub const ENTRY: Route = Route::Login;

    /// Routes reachable from the page navigation, in display order.
    pub const PAGES: [Route; 2] = [Route::Dashboard, Route::Team];

    pub fn path(self) -> &'static str {
        match self {
            Route::Login => "/",
            Route::Dashboard => "/dashboard",
            Route::Team => "/team",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Route::Login => "Sign in",
            Route::Dashboard => "Dashboard",
            Route::Team => "Team",
        }
    }

    pub fn is_protected(self) -> bool {
        !matches!(self, Route::Login)
    }

    /// Maps a URL path to its route. Query strings, fragments, and trailing
    /// slashes are ignored. Returns `None` for paths outside the surface.
    pub fn resolve(path: &str) -> Option<Route> {
        let path = normalize_path(path);
        match path.as_str() {
            "/" => Some(Route::Login),
            "/dashboard" => Some(Route::Dashboard),
            "/team" => Some(Route::Team),
            p if p.starts_with("/team/") => Some(Route::Team),
            _ => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

fn normalize_path(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or_default().trim();
    let path = path.trim_end_matches('/');
    if path.is_empty() {
        "/".to_string()
    } else if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

/// A forced navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub to: Route,
    /// The originally requested location, for returning after sign-in.
    pub from: Option<String>,
}

impl Redirect {
    /// Plain redirect to the entry route (logout, 401, unmatched path).
    pub fn to_entry() -> Self {
        Self {
            to: Route::ENTRY,
            from: None,
        }
    }

    /// Redirect to the entry route remembering where the user was going.
    pub fn to_entry_from(path: impl Into<String>) -> Self {
        Self {
            to: Route::ENTRY,
            from: Some(path.into()),
        }
    }

    /// Protected route to land on after a successful sign-in, if any.
    pub fn return_route(&self) -> Option<Route> {
        self.from
            .as_deref()
            .and_then(Route::resolve)
            .filter(|route| route.is_protected())
    }
}

/// Receives forced navigations.
pub trait Navigator: Send + Sync {
    fn navigate(&self, redirect: Redirect);
}

/// Navigator that records every redirect. Used by the CLI and tests.
#[derive(Debug, Default)]
pub struct NavigationLog {
    redirects: Mutex<Vec<Redirect>>,
}

impl NavigationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<Redirect> {
        self.redirects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.redirects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Navigator for NavigationLog {
    fn navigate(&self, redirect: Redirect) {
        tracing::info!(to = %redirect.to, from = ?redirect.from, "redirect");
        self.redirects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(redirect);
    }
}

/// Result of checking a path against the guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    Allowed(Route),
    Redirected(Redirect),
}

/// Gates protected routes on session presence.
///
/// Optimistic client-side gate: a forged or stale token passes until the
/// first server round trip answers 401 and the gateway evicts it.
#[derive(Clone)]
pub struct RouteGuard {
    store: Arc<dyn SessionStore>,
}

impl RouteGuard {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Decides whether `path` may be rendered.
    pub fn check(&self, path: &str) -> GuardOutcome {
        let Some(route) = Route::resolve(path) else {
            tracing::debug!(path, "unmatched path, redirecting to entry");
            return GuardOutcome::Redirected(Redirect::to_entry());
        };

        if route.is_protected() && !self.store.is_authenticated() {
            tracing::debug!(path, "no session, redirecting to entry");
            return GuardOutcome::Redirected(Redirect::to_entry_from(normalize_path(path)));
        }

        GuardOutcome::Allowed(route)
    }

    /// Like [`check`](Self::check) for a known route.
    pub fn check_route(&self, route: Route) -> GuardOutcome {
        self.check(route.path())
    }

    /// Checks `path` and performs the redirect when it is refused.
    /// Returns the route to render when allowed.
    pub fn admit(&self, path: &str, navigator: &dyn Navigator) -> Option<Route> {
        match self.check(path) {
            GuardOutcome::Allowed(route) => Some(route),
            GuardOutcome::Redirected(redirect) => {
                navigator.navigate(redirect);
                None
            }
        }
    }
}
