//! Login, logout and status handlers.

use amperex_core::config::Config;
use amperex_core::login_flow::LoginOutcome;
use amperex_core::session::mask_token;
use amperex_types::Credentials;
use anyhow::{Result, bail};

use super::{Backend, read_secret};

pub async fn login(config: &Config, username: &str, password: Option<String>) -> Result<()> {
    let password = match password {
        Some(password) => password,
        None => read_secret("Password: ")?,
    };

    let credentials = Credentials::new(username.trim(), password);
    if let Err(message) = credentials.validate() {
        bail!(message);
    }

    let backend = Backend::connect(config)?;
    let result = backend.auth.login(&credentials).await;
    match LoginOutcome::from_result(&result) {
        LoginOutcome::Accepted => {
            let name = backend
                .auth
                .current_user()
                .map_or_else(|| credentials.username.clone(), |u| u.display_name().to_string());
            println!("Logged in as {name}");
            Ok(())
        }
        LoginOutcome::Rejected(message) => {
            if let Err(e) = &result {
                tracing::debug!("login failed: {e:#}");
            }
            bail!(message)
        }
    }
}

pub async fn logout(config: &Config) -> Result<()> {
    let backend = Backend::connect(config)?;
    let was_signed_in = backend.auth.is_authenticated();
    backend.auth.logout().await;
    if was_signed_in {
        println!("Logged out");
    } else {
        println!("Not logged in");
    }
    Ok(())
}

pub async fn status(config: &Config, remote: bool) -> Result<()> {
    let backend = Backend::connect(config)?;
    let Some(token) = backend.auth.token() else {
        println!("Not logged in");
        return Ok(());
    };

    match backend.auth.current_user() {
        Some(user) => println!("Logged in as {} ({})", user.display_name(), user.display_email()),
        None => println!("Logged in"),
    }
    println!("Token: {}", mask_token(&token));

    if remote {
        match backend.auth.fetch_me().await {
            Ok(user) => println!("Backend: token belongs to {}", user.display_name()),
            Err(e) if backend.session_rejected() => {
                tracing::debug!("token rejected: {e:#}");
                bail!("Session expired; it has been cleared. Run `amperex login` again.");
            }
            Err(e) => return Err(e.context("check session with backend")),
        }
    }
    Ok(())
}
