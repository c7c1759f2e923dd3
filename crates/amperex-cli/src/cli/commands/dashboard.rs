//! `amperex stats`.

use amperex_core::config::Config;
use amperex_core::dashboard::{Bootstrap, StatsOutcome};
use anyhow::{Result, bail};
use serde_json::json;

use super::Backend;

pub async fn stats(config: &Config, as_json: bool) -> Result<()> {
    let backend = Backend::connect(config)?;
    match backend.dashboard.bootstrap(&backend.guard).await {
        Bootstrap::Redirected(redirect) => {
            tracing::debug!(?redirect, "dashboard refused");
            if backend.session_rejected() {
                bail!("Session expired; it has been cleared. Run `amperex login` again.")
            }
            bail!("Not logged in. Run `amperex login` first.")
        }
        Bootstrap::Ready(outcome) if as_json => {
            println!("{}", serde_json::to_string_pretty(&to_json(&outcome))?);
            Ok(())
        }
        Bootstrap::Ready(outcome) => {
            print_summary(&outcome);
            Ok(())
        }
    }
}

fn to_json(outcome: &StatsOutcome) -> serde_json::Value {
    json!({
        "testsExecuted": outcome.summary.tests_executed,
        "activeSessions": outcome.summary.active_sessions,
        "systemUptime": outcome.summary.system_uptime,
        "complianceRate": outcome.summary.compliance_rate,
        "source": outcome.source.to_string(),
        "live": outcome.is_live(),
    })
}

fn print_summary(outcome: &StatsOutcome) {
    let s = &outcome.summary;
    println!("Tests executed:   {}", s.tests_executed);
    println!("Active sessions:  {}", s.active_sessions);
    println!("System uptime:    {}%", s.system_uptime);
    println!("Compliance rate:  {}%", s.compliance_rate);
    println!("Source: {}", outcome.source);
}
