//! services/client/src/bin/learn.rs

use clap::{Parser, Subcommand};
use client_lib::{
    adapters::{FileUsernameStore, HttpProgressStore},
    config::Config,
    error::ClientError,
    terminal::{run_journey_view, run_quiz, show_available_skills, show_dashboard, stdin_console},
};
use learning_journey_core::{
    current_username, register_username, ports::ProgressStore, UsernameStore,
};
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "learn", version, about = "Quizzes and learning journeys in your terminal")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Choose a username and remember it on this machine
    Login { name: String },
    /// Forget the remembered username
    Logout,
    /// Show the remembered username
    Whoami,
    /// List the skills a quiz can be taken for
    Skills,
    /// Take the quiz for a skill
    Quiz {
        skill: String,
        /// Skip the already-taken check
        #[arg(long)]
        force: bool,
    },
    /// Open the learning journey for a skill
    Journey { skill: String },
    /// Show progress across all skills
    Dashboard,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("{}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), ClientError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    info!("Configuration loaded, store at {}", config.store_url);

    // --- 2. Initialize Adapters ---
    let store: Arc<dyn ProgressStore> =
        Arc::new(HttpProgressStore::new(&config.store_url, config.request_timeout)?);
    let local = FileUsernameStore::new(&config.config_dir);
    let mut console = stdin_console();

    // --- 3. Dispatch ---
    match cli.command {
        Command::Login { name } => {
            let username = register_username(store.as_ref(), &local, &name).await?;
            console.say(format!("Welcome, {}!", username))?;
        }
        Command::Logout => {
            local.clear()?;
            console.say("Logged out.")?;
        }
        Command::Whoami => match current_username(&local)? {
            Some(username) => console.say(username)?,
            None => return Err(ClientError::NotLoggedIn),
        },
        Command::Skills => show_available_skills(store.as_ref(), &mut console).await?,
        Command::Quiz { skill, force } => {
            let username = require_username(&local)?;
            run_quiz(store.as_ref(), &username, &skill, force, &mut console).await?;
        }
        Command::Journey { skill } => {
            let username = require_username(&local)?;
            let shutdown = CancellationToken::new();
            let signal_token = shutdown.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("Ctrl-C received, closing the journey.");
                    signal_token.cancel();
                }
            });
            run_journey_view(store, &username, &skill, &mut console, shutdown).await?;
        }
        Command::Dashboard => {
            let username = require_username(&local)?;
            show_dashboard(store.as_ref(), &username, &mut console).await?;
        }
    }
    Ok(())
}

fn require_username(local: &FileUsernameStore) -> Result<String, ClientError> {
    current_username(local)?.ok_or(ClientError::NotLoggedIn)
}
