//! Interactive console (no subcommand).

use amperex_core::config::Config;
use anyhow::Result;

#[cfg(feature = "tui")]
pub async fn run(config: &Config, start: &str) -> Result<()> {
    amperex_tui::run_console(config, start).await
}

#[cfg(not(feature = "tui"))]
#[allow(clippy::unused_async)]
pub async fn run(_config: &Config, _start: &str) -> Result<()> {
    anyhow::bail!("This build has no interactive console; run `amperex --help` for commands")
}
