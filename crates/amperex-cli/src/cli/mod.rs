//! CLI entry and dispatch.

use amperex_core::config::{self, paths};
use amperex_core::logging;
use anyhow::{Context, Result};
use clap::Parser;

mod commands;

#[derive(Parser)]
#[command(name = "amperex")]
#[command(version)]
#[command(about = "AmpereX MCB testing console")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Page the console opens first
    #[arg(long, value_name = "PATH", default_value = "/dashboard")]
    open: String,

    /// Backend origin (overrides api.base_url)
    #[arg(long, env = config::BASE_URL_ENV, global = true, value_name = "URL")]
    base_url: Option<String>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Sign in and store the session
    Login {
        #[arg(short, long)]
        username: String,
        /// Read from stdin when omitted
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Sign out and clear the stored session
    Logout,

    /// Show whether a session is stored
    Status {
        /// Also ask the backend who the token belongs to
        #[arg(long)]
        remote: bool,
    },

    /// Show dashboard summary statistics
    Stats {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Resolve a path through the router and the route guard
    Route {
        #[arg(value_name = "PATH")]
        path: String,
    },

    /// Reset the password with an emailed verification code (demo)
    ResetPassword {
        #[arg(short, long)]
        email: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
    /// Set api.base_url in the config file
    SetBaseUrl {
        #[arg(value_name = "URL")]
        url: String,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = match logging::init(&paths::logs_dir()) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: logging disabled: {e:#}");
            None
        }
    };

    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;
    rt.block_on(dispatch(cli))
}

async fn dispatch(cli: Cli) -> Result<()> {
    let mut config = config::Config::load().context("load config")?;
    if let Some(url) = cli.base_url.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
        config.api.base_url = url.to_string();
    }

    let Some(command) = cli.command else {
        return commands::console::run(&config, &cli.open).await;
    };

    match command {
        Commands::Login { username, password } => {
            commands::auth::login(&config, &username, password).await
        }
        Commands::Logout => commands::auth::logout(&config).await,
        Commands::Status { remote } => commands::auth::status(&config, remote).await,
        Commands::Stats { json } => commands::dashboard::stats(&config, json).await,
        Commands::Route { path } => commands::route::resolve(&path),
        Commands::ResetPassword { email } => commands::reset::run(&config, &email).await,
        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
            ConfigCommands::SetBaseUrl { url } => commands::config::set_base_url(&url),
        },
    }
}
