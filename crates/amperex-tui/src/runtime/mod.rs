//! TUI runtime: owns the terminal, runs the event loop, executes effects.
//!
//! All side effects happen here. The reducer produces effects; this module
//! executes them. Async results come back through the inbox channel, which
//! is also where the gateway's forced navigations arrive.

mod handlers;
mod inbox;

use std::future::Future;
use std::io::Stdout;
use std::sync::Arc;
use std::time::{Duration, Instant};

use amperex_core::auth::AuthService;
use amperex_core::auth::reset::PasswordReset;
use amperex_core::config::Config;
use amperex_core::dashboard::DashboardService;
use amperex_core::gateway::Gateway;
use amperex_core::navigation::{Navigator, RouteGuard};
use amperex_core::session::{FileSessionStore, SessionStore};
use anyhow::{Context, Result};
use crossterm::event;
pub use inbox::InboxNavigator;
use inbox::{UiEventReceiver, UiEventSender};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc;

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::state::AppState;
use crate::{render, terminal, update};

/// Poll/tick interval while something is loading (spinner animation).
pub const FRAME_DURATION: Duration = Duration::from_millis(50);

/// Poll/tick interval when idle.
pub const IDLE_POLL_DURATION: Duration = Duration::from_millis(250);

/// Backend-facing services shared by the handlers.
struct Services {
    store: Arc<dyn SessionStore>,
    guard: RouteGuard,
    auth: AuthService,
    dashboard: DashboardService,
}

impl Services {
    fn new(config: &Config, store: Arc<dyn SessionStore>, navigator: Arc<dyn Navigator>) -> Result<Self> {
        let gateway = Gateway::new(config, Arc::clone(&store), navigator)?;
        Ok(Self {
            guard: RouteGuard::new(Arc::clone(&store)),
            auth: AuthService::new(gateway.clone()),
            dashboard: DashboardService::new(gateway),
            store,
        })
    }
}

/// Full-screen TUI runtime.
pub struct TuiRuntime {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    pub state: AppState,
    services: Services,
    inbox_tx: UiEventSender,
    inbox_rx: UiEventReceiver,
    last_tick: Instant,
}

impl TuiRuntime {
    /// Sets up the terminal and opens `start` through the route guard.
    ///
    /// # Errors
    /// Returns an error if the services or the terminal cannot be set up.
    pub fn new(config: &Config, start: &str) -> Result<Self> {
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        let store: Arc<dyn SessionStore> = Arc::new(FileSessionStore::default_location());
        let navigator = Arc::new(InboxNavigator::new(inbox_tx.clone()));
        let services = Services::new(config, store, navigator)?;

        terminal::install_panic_hook();
        let terminal = terminal::setup_terminal().context("Failed to setup terminal")?;

        let mut runtime = Self {
            terminal,
            state: AppState::new(PasswordReset::from_config(config)),
            services,
            inbox_tx,
            inbox_rx,
            last_tick: Instant::now(),
        };

        let entered = handlers::enter_path(
            &runtime.services.guard,
            runtime.services.store.as_ref(),
            start,
        );
        runtime.dispatch_event(entered);
        Ok(runtime)
    }

    /// Runs the event loop until the user quits, then restores the terminal.
    ///
    /// # Errors
    /// Returns an error if drawing or reading terminal input fails.
    pub fn run(&mut self) -> Result<()> {
        let result = self.event_loop();
        let _ = terminal::restore_terminal();
        result
    }

    fn event_loop(&mut self) -> Result<()> {
        let mut dirty = true;

        while !self.state.should_quit {
            let events = self.collect_events()?;
            for event in events {
                if !matches!(event, UiEvent::Tick) || self.is_busy() {
                    dirty = true;
                }
                self.dispatch_event(event);
            }

            if dirty {
                self.terminal.draw(|frame| {
                    render::render(&self.state, frame);
                })?;
                dirty = false;
            }
        }

        Ok(())
    }

    fn is_busy(&self) -> bool {
        self.state.login.flow.is_loading() || self.state.dashboard.loading
    }

    /// Drains the inbox, then waits for terminal input until the next tick.
    fn collect_events(&mut self) -> Result<Vec<UiEvent>> {
        let mut events = Vec::new();

        while let Ok(ev) = self.inbox_rx.try_recv() {
            events.push(ev);
        }

        let tick_interval = if self.is_busy() {
            FRAME_DURATION
        } else {
            IDLE_POLL_DURATION
        };
        let poll_duration = if events.is_empty() {
            tick_interval.saturating_sub(self.last_tick.elapsed())
        } else {
            Duration::ZERO
        };

        if event::poll(poll_duration)? {
            events.push(UiEvent::Terminal(event::read()?));
            while event::poll(Duration::ZERO)? {
                events.push(UiEvent::Terminal(event::read()?));
            }
        }

        if self.last_tick.elapsed() >= tick_interval {
            events.push(UiEvent::Tick);
            self.last_tick = Instant::now();
        }

        Ok(events)
    }

    fn dispatch_event(&mut self, event: UiEvent) {
        let effects = update::update(&mut self.state, event);
        for effect in effects {
            self.execute_effect(effect);
        }
    }

    /// Spawns an async handler and forwards its result to the inbox.
    fn spawn_effect<Fut>(&self, fut: Fut)
    where
        Fut: Future<Output = UiEvent> + Send + 'static,
    {
        let tx = self.inbox_tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(fut.await);
        });
    }

    fn execute_effect(&mut self, effect: UiEffect) {
        match effect {
            UiEffect::Quit => {
                self.state.should_quit = true;
            }
            UiEffect::EnterRoute(route) => {
                let event = handlers::enter_route(
                    &self.services.guard,
                    self.services.store.as_ref(),
                    route,
                );
                self.dispatch_event(event);
            }
            UiEffect::Authenticate { epoch, credentials } => {
                let auth = self.services.auth.clone();
                self.spawn_effect(handlers::authenticate(auth, epoch, credentials));
            }
            UiEffect::StartDelay {
                epoch,
                step,
                duration,
            } => {
                self.spawn_effect(handlers::wait(epoch, step, duration));
            }
            UiEffect::StartDemoSession { email } => {
                handlers::start_demo_session(self.services.store.as_ref(), &email);
            }
            UiEffect::LoadStats => {
                let dashboard = self.services.dashboard.clone();
                let guard = self.services.guard.clone();
                self.spawn_effect(handlers::load_stats(dashboard, guard));
            }
            UiEffect::Logout => {
                let auth = self.services.auth.clone();
                self.spawn_effect(handlers::logout(auth));
            }
        }
    }
}
