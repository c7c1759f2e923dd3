//! CLI command handlers.

pub mod auth;
pub mod config;
pub mod console;
pub mod dashboard;
pub mod reset;
pub mod route;

use std::io::{self, BufRead, IsTerminal, Write};
use std::sync::Arc;

use amperex_core::auth::AuthService;
use amperex_core::config::Config;
use amperex_core::dashboard::DashboardService;
use amperex_core::gateway::Gateway;
use amperex_core::navigation::{NavigationLog, RouteGuard};
use amperex_core::session::{FileSessionStore, SessionStore};
use anyhow::{Context, Result, bail};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal;

/// Services wired to the on-disk session.
///
/// Forced navigations have nowhere to go outside the console, so they are
/// recorded in `navigations`; a command that finds one there knows the
/// backend rejected the stored token.
pub struct Backend {
    pub navigations: Arc<NavigationLog>,
    pub guard: RouteGuard,
    pub auth: AuthService,
    pub dashboard: DashboardService,
}

impl Backend {
    pub fn connect(config: &Config) -> Result<Self> {
        let store: Arc<dyn SessionStore> = Arc::new(FileSessionStore::default_location());
        let navigations = Arc::new(NavigationLog::new());
        let gateway = Gateway::new(config, Arc::clone(&store), navigations.clone())
            .context("create backend client")?;
        Ok(Self {
            guard: RouteGuard::new(store),
            auth: AuthService::new(gateway.clone()),
            dashboard: DashboardService::new(gateway),
            navigations,
        })
    }

    /// Whether a request in this command was answered with 401.
    pub fn session_rejected(&self) -> bool {
        !self.navigations.is_empty()
    }
}

/// Prints `prompt` to stderr and reads one line from stdin.
pub fn read_line(prompt: &str) -> Result<String> {
    eprint!("{prompt}");
    io::stderr().flush().ok();

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("read from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Like [`read_line`], without echo when stdin is a terminal.
pub fn read_secret(prompt: &str) -> Result<String> {
    if !io::stdin().is_terminal() {
        return read_line(prompt);
    }

    eprint!("{prompt}");
    io::stderr().flush().ok();

    terminal::enable_raw_mode().context("enable raw mode")?;
    let result = read_hidden();
    let _ = terminal::disable_raw_mode();
    eprintln!();
    result
}

fn read_hidden() -> Result<String> {
    let mut secret = String::new();
    loop {
        let Event::Key(key) = event::read().context("read key")? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match key.code {
            KeyCode::Enter => return Ok(secret),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                bail!("Interrupted")
            }
            KeyCode::Char(c) => secret.push(c),
            KeyCode::Backspace => {
                secret.pop();
            }
            _ => {}
        }
    }
}
