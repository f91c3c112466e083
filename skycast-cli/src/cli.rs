use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use inquire::{InquireError, Password, PasswordDisplayMode, Text};
use skycast_core::{Action, Config, OpenWeatherProvider, Phase, Session};
use tracing::warn;

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skycast", version, about = "City weather lookup")]
pub struct Cli {
    /// OpenWeather API key; overrides the configured one for this run.
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Show temperatures in Fahrenheit.
    #[arg(long, global = true)]
    pub fahrenheit: bool,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and the default city.
    Configure,

    /// Show current weather and the 5-day forecast for a city.
    Show {
        /// City name; the configured default city if absent.
        city: Option<String>,

        /// Print the session state as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Search cities interactively.
    Interactive,
}

impl Cli {
    pub async fn run(self) -> Result<ExitCode> {
        let Cli { api_key, fahrenheit, command, .. } = self;

        match command {
            Command::Configure => configure(),
            Command::Show { city, json } => {
                let config = load_config(api_key)?;
                show(&config, city, fahrenheit, json).await
            }
            Command::Interactive => {
                let config = load_config(api_key)?;
                interactive(&config, fahrenheit).await
            }
        }
    }
}

fn load_config(api_key: Option<String>) -> Result<Config> {
    let mut config = Config::load()?;

    if let Some(key) = api_key {
        config.set_api_key(key);
    }

    if config.api_key().is_none() {
        warn!("No API key configured; run `skycast configure` or pass --api-key");
    }

    Ok(config)
}

fn configure() -> Result<ExitCode> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    config.set_api_key(api_key);

    let city = Text::new("Default city:")
        .with_default(&config.default_city)
        .prompt()
        .context("Failed to read default city")?;
    config.set_default_city(&city);

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());

    Ok(ExitCode::SUCCESS)
}

async fn start_session(
    config: &Config,
    city: String,
    fahrenheit: bool,
) -> Session<OpenWeatherProvider> {
    let provider = OpenWeatherProvider::from_config(config);
    let mut session = Session::new(provider, city);

    // Unit first: the toggle is display-only and needs no lookup.
    if fahrenheit {
        session.dispatch(Action::ToggleUnit).await;
    }
    session.dispatch(Action::Startup).await;

    session
}

async fn show(
    config: &Config,
    city: Option<String>,
    fahrenheit: bool,
    json: bool,
) -> Result<ExitCode> {
    let city = city.unwrap_or_else(|| config.default_city.clone());
    let session = start_session(config, city, fahrenheit).await;
    let state = session.state();

    if json {
        let out = serde_json::to_string_pretty(state).context("Failed to serialize session")?;
        println!("{out}");
    } else {
        println!("{}", render::render(state));
    }

    Ok(if state.phase() == Phase::Failed { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}

/// One line of interactive input.
#[derive(Debug, PartialEq, Eq)]
enum Intent<'a> {
    Search(&'a str),
    Retry,
    ToggleUnit,
    Quit,
    Unknown(&'a str),
}

fn parse_intent(input: &str) -> Intent<'_> {
    let trimmed = input.trim();

    match trimmed.strip_prefix('/') {
        Some("retry" | "r") => Intent::Retry,
        Some("unit" | "u") => Intent::ToggleUnit,
        Some("quit" | "q" | "exit") => Intent::Quit,
        Some(_) => Intent::Unknown(trimmed),
        None => Intent::Search(input),
    }
}

async fn interactive(config: &Config, fahrenheit: bool) -> Result<ExitCode> {
    let mut session = start_session(config, config.default_city.clone(), fahrenheit).await;
    println!("{}", render::render(session.state()));

    loop {
        let input = match Text::new("City:")
            .with_help_message("Enter a city name, /retry, /unit or /quit")
            .prompt()
        {
            Ok(input) => input,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(err) => return Err(err).context("Failed to read input"),
        };

        match parse_intent(&input) {
            Intent::Quit => break,
            Intent::Retry => session.dispatch(Action::Retry).await,
            Intent::ToggleUnit => session.dispatch(Action::ToggleUnit).await,
            Intent::Unknown(cmd) => {
                println!("Unknown command {cmd}; use /retry, /unit or /quit");
                continue;
            }
            Intent::Search(query) => {
                let blank = query.trim().is_empty();
                // Blank queries are a no-op inside the session.
                session.search(query).await;
                if blank {
                    continue;
                }
            }
        }

        println!();
        println!("{}", render::render(session.state()));
    }

    Ok(ExitCode::SUCCESS)
}
