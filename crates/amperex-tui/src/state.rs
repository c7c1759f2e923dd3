//! Application state.
//!
//! ```text
//! AppState
//! ├── route: Route              (page currently shown)
//! ├── login: LoginState         (entry route forms)
//! ├── dashboard: DashboardState (summary statistics)
//! └── user: Option<User>        (signed-in user, for protected pages)
//! ```

use amperex_core::auth::reset::PasswordReset;
use amperex_core::navigation::{Redirect, Route};
use amperex_types::User;

use crate::dashboard::DashboardState;
use crate::login::LoginState;

pub struct AppState {
    pub route: Route,
    pub login: LoginState,
    pub dashboard: DashboardState,
    pub user: Option<User>,
    /// Demo reset settings, reused for every fresh login form.
    pub reset: PasswordReset,
    pub spinner_frame: usize,
    pub should_quit: bool,
}

impl AppState {
    pub fn new(reset: PasswordReset) -> Self {
        Self {
            route: Route::ENTRY,
            login: LoginState::new(reset.clone(), None),
            dashboard: DashboardState::default(),
            user: None,
            reset,
            spinner_frame: 0,
            should_quit: false,
        }
    }

    /// Shows the login page after a forced navigation.
    ///
    /// Coming from a protected page starts a fresh form and drops everything
    /// the protected pages held. When the login page is already showing, the
    /// form is kept so an inline error from the same request survives,
    /// unless the flow already exited and the guard sent it back.
    pub fn show_login(&mut self, redirect: &Redirect) {
        let return_to = redirect.return_route();
        if self.route == Route::ENTRY && self.login.flow.exit().is_none() {
            if let Some(route) = return_to {
                self.login.flow.retarget(route);
            }
        } else {
            self.route = Route::ENTRY;
            self.login = LoginState::new(self.reset.clone(), return_to);
        }
        self.user = None;
        self.dashboard = DashboardState::default();
    }
}
