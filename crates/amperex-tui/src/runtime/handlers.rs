//! Effect handlers.
//!
//! Async handlers are plain async functions returning the `UiEvent` that
//! carries their result; the runtime spawns them and forwards the result to
//! the inbox. Nothing here touches `AppState`.

use std::time::Duration;

use amperex_core::auth::AuthService;
use amperex_core::auth::reset::demo_session;
use amperex_core::dashboard::DashboardService;
use amperex_core::login_flow::{DemoStep, LoginOutcome};
use amperex_core::navigation::{GuardOutcome, Redirect, Route, RouteGuard};
use amperex_core::session::SessionStore;
use amperex_types::Credentials;

use crate::events::UiEvent;

/// Runs the guard for `path`.
pub fn enter_path(guard: &RouteGuard, store: &dyn SessionStore, path: &str) -> UiEvent {
    match guard.check(path) {
        GuardOutcome::Allowed(route) if route.is_protected() => UiEvent::RouteEntered {
            route,
            user: store.current_user(),
        },
        GuardOutcome::Allowed(_) => UiEvent::Navigate(Redirect::to_entry()),
        GuardOutcome::Redirected(redirect) => UiEvent::Navigate(redirect),
    }
}

pub fn enter_route(guard: &RouteGuard, store: &dyn SessionStore, route: Route) -> UiEvent {
    enter_path(guard, store, route.path())
}

/// Writes the demo session. Failure is logged; the guard then refuses the
/// next route and the user lands back on a fresh login form.
pub fn start_demo_session(store: &dyn SessionStore, email: &str) {
    if let Err(e) = store.save(&demo_session(email)) {
        tracing::error!("Failed to store demo session: {e:#}");
    }
}

pub async fn authenticate(auth: AuthService, epoch: u64, credentials: Credentials) -> UiEvent {
    let result = auth.login(&credentials).await;
    UiEvent::LoginFinished {
        epoch,
        outcome: LoginOutcome::from_result(&result),
    }
}

pub async fn wait(epoch: u64, step: DemoStep, duration: Duration) -> UiEvent {
    tokio::time::sleep(duration).await;
    UiEvent::DelayElapsed { epoch, step }
}

pub async fn load_stats(dashboard: DashboardService, guard: RouteGuard) -> UiEvent {
    let bootstrap = dashboard.bootstrap(&guard).await;
    UiEvent::StatsLoaded {
        bootstrap,
        at: chrono::Local::now(),
    }
}

pub async fn logout(auth: AuthService) -> UiEvent {
    auth.logout().await;
    UiEvent::LoggedOut
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use amperex_core::session::MemorySessionStore;
    use amperex_types::Session;

    use super::*;

    #[test]
    fn test_enter_path_without_session_redirects() {
        let store = Arc::new(MemorySessionStore::new());
        let guard = RouteGuard::new(store.clone());
        let UiEvent::Navigate(redirect) = enter_path(&guard, store.as_ref(), "/team") else {
            panic!("expected redirect");
        };
        assert_eq!(redirect, Redirect::to_entry_from("/team"));
    }

    #[test]
    fn test_demo_session_makes_dashboard_reachable() {
        let store = Arc::new(MemorySessionStore::new());
        let guard = RouteGuard::new(store.clone());
        start_demo_session(store.as_ref(), "ops@amperex.io");

        let UiEvent::RouteEntered { route, user } =
            enter_route(&guard, store.as_ref(), Route::Dashboard)
        else {
            panic!("expected dashboard");
        };
        assert_eq!(route, Route::Dashboard);
        assert_eq!(user.unwrap().email.as_deref(), Some("ops@amperex.io"));
    }

    #[test]
    fn test_entry_path_with_session_stays_on_login() {
        let store = Arc::new(MemorySessionStore::with_session(Session::new("abc", None)));
        let guard = RouteGuard::new(store.clone());
        assert!(matches!(
            enter_path(&guard, store.as_ref(), "/"),
            UiEvent::Navigate(_)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_reports_step() {
        let event = wait(3, DemoStep::SendOtp, Duration::from_secs(1)).await;
        assert!(matches!(
            event,
            UiEvent::DelayElapsed {
                epoch: 3,
                step: DemoStep::SendOtp
            }
        ));
    }
}
