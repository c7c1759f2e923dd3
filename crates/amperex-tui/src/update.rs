//! TUI reducer.
//!
//! All state mutations happen here. The runtime calls `update(app, event)`
//! and executes the returned effects.

use amperex_core::dashboard::Bootstrap;
use amperex_core::navigation::Route;
use amperex_types::User;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::login;
use crate::state::AppState;

pub fn update(app: &mut AppState, event: UiEvent) -> Vec<UiEffect> {
    match event {
        UiEvent::Tick => {
            app.spinner_frame = app.spinner_frame.wrapping_add(1);
            vec![]
        }
        UiEvent::Terminal(Event::Key(key)) if key.kind == KeyEventKind::Press => {
            handle_key(app, key)
        }
        UiEvent::Terminal(_) => vec![],
        UiEvent::Navigate(redirect) => {
            app.show_login(&redirect);
            vec![]
        }
        UiEvent::RouteEntered { route, user } => enter_route(app, route, user),
        UiEvent::LoginFinished { epoch, outcome } => {
            login::handle_login_finished(&mut app.login, epoch, outcome)
        }
        UiEvent::DelayElapsed { epoch, step } => {
            login::handle_delay_elapsed(&mut app.login, epoch, step)
        }
        UiEvent::StatsLoaded { bootstrap, at } => {
            match bootstrap {
                Bootstrap::Redirected(redirect) => app.show_login(&redirect),
                Bootstrap::Ready(outcome) => app.dashboard.finish(outcome, at),
            }
            vec![]
        }
        UiEvent::LoggedOut => {
            app.user = None;
            vec![]
        }
    }
}

fn enter_route(app: &mut AppState, route: Route, user: Option<User>) -> Vec<UiEffect> {
    if !route.is_protected() {
        return vec![];
    }
    app.route = route;
    app.user = user;
    if route == Route::Dashboard && app.dashboard.start_loading() {
        return vec![UiEffect::LoadStats];
    }
    vec![]
}

fn handle_key(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return vec![UiEffect::Quit];
    }

    if app.route == Route::Login {
        return login::handle_key(&mut app.login, key);
    }

    match key.code {
        KeyCode::Char('d') => vec![UiEffect::EnterRoute(Route::Dashboard)],
        KeyCode::Char('t') => vec![UiEffect::EnterRoute(Route::Team)],
        KeyCode::Char('r') if app.route == Route::Dashboard => {
            if app.dashboard.start_loading() {
                vec![UiEffect::LoadStats]
            } else {
                vec![]
            }
        }
        KeyCode::Char('l') => vec![UiEffect::Logout],
        KeyCode::Char('q') | KeyCode::Esc => vec![UiEffect::Quit],
        _ => vec![],
    }
}
