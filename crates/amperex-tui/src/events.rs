//! UI events consumed by the reducer.

use amperex_core::dashboard::Bootstrap;
use amperex_core::login_flow::{DemoStep, LoginOutcome};
use amperex_core::navigation::{Redirect, Route};
use amperex_types::User;
use chrono::{DateTime, Local};
use crossterm::event::Event;

#[derive(Debug, Clone)]
pub enum UiEvent {
    /// Animation/render cadence.
    Tick,
    Terminal(Event),
    /// Forced navigation to the entry route (guard refusal, 401, logout).
    Navigate(Redirect),
    /// The guard admitted a protected route.
    RouteEntered { route: Route, user: Option<User> },
    LoginFinished { epoch: u64, outcome: LoginOutcome },
    DelayElapsed { epoch: u64, step: DemoStep },
    StatsLoaded {
        bootstrap: Bootstrap,
        at: DateTime<Local>,
    },
    LoggedOut,
}
