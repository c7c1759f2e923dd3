//! Full-screen terminal console for AmpereX.

pub mod effects;
pub mod events;
pub mod features;
pub mod render;
pub mod runtime;
pub mod state;
pub mod terminal;
pub mod update;

use std::io::{IsTerminal, Write, stderr};

use amperex_core::config::Config;
use anyhow::Result;
pub use features::{dashboard, login, team};
pub use runtime::TuiRuntime;

/// Runs the console until the user quits.
///
/// `start` is the first path to open; the route guard decides whether it is
/// shown or the login page comes first.
pub async fn run_console(config: &Config, start: &str) -> Result<()> {
    if !stderr().is_terminal() {
        anyhow::bail!(
            "The console requires a terminal.\n\
             Use `amperex login` and `amperex stats` for non-interactive use."
        );
    }

    let mut runtime = TuiRuntime::new(config, start)?;
    runtime.run()?;

    writeln!(stderr(), "Goodbye!")?;
    Ok(())
}
