//! `amperex reset-password`: the email + OTP branch of the sign-in page.

use amperex_core::auth::reset::{PasswordReset, demo_session};
use amperex_core::config::Config;
use amperex_core::login_flow::{FlowCommand, FlowExit, LoginFlow};
use amperex_core::session::{FileSessionStore, SessionStore};
use anyhow::{Context, Result, bail};

use super::read_line;

pub async fn run(config: &Config, email: &str) -> Result<()> {
    let store = FileSessionStore::default_location();
    let mut flow = LoginFlow::new(PasswordReset::from_config(config), None);

    flow.forgot_password();
    let commands = flow.submit_email(email);
    fail_on_error(&flow)?;
    execute(&mut flow, &store, commands).await?;

    eprintln!("A verification code was sent to {}.", flow.reset_email());
    let code = read_line("Code: ")?;
    flow.set_otp(&code);
    let commands = flow.submit_otp();
    if commands.is_empty() && flow.error().is_none() {
        bail!("Enter the 6-digit code");
    }
    let exit = execute(&mut flow, &store, commands).await?;
    fail_on_error(&flow)?;

    match exit {
        Some(FlowExit::Authenticated { .. }) => {
            let name = store
                .current_user()
                .map_or_else(String::new, |u| u.display_name().to_string());
            println!("Logged in as {name}");
            Ok(())
        }
        None => bail!("Password reset did not complete"),
    }
}

fn fail_on_error(flow: &LoginFlow) -> Result<()> {
    match flow.error() {
        Some(message) => bail!(message.to_string()),
        None => Ok(()),
    }
}

/// Runs commands (and the commands they produce) until the machine settles.
async fn execute(
    flow: &mut LoginFlow,
    store: &FileSessionStore,
    mut pending: Vec<FlowCommand>,
) -> Result<Option<FlowExit>> {
    let mut exit = None;
    while !pending.is_empty() {
        let mut next = Vec::new();
        for command in pending {
            match command {
                FlowCommand::Delay {
                    epoch,
                    step,
                    duration,
                } => {
                    tokio::time::sleep(duration).await;
                    next.extend(flow.delay_elapsed(epoch, step));
                }
                FlowCommand::StartDemoSession { email } => {
                    store
                        .save(&demo_session(&email))
                        .context("Failed to store session")?;
                    tracing::info!(%email, "signed in through password reset");
                }
                FlowCommand::Exit(flow_exit) => exit = Some(flow_exit),
                FlowCommand::Authenticate { .. } => {
                    tracing::debug!("ignoring sign-in request during password reset");
                }
            }
        }
        pending = next;
    }
    Ok(exit)
}
