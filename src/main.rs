use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};

use symptocare::controller::Action;
use symptocare::shell::{self, ConsoleNotifier};
use symptocare::{
    Controller, Page, SpeechCapabilities, SymptoCareClient, SymptoCareConfig, telemetry,
};

#[derive(Parser)]
#[command(
    name = "symptocare",
    version,
    about = "SymptoCare symptom checker: disease prediction, nearby hospitals and medical shops, precautions"
)]
struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL, overrides the configured one
    #[arg(long, global = true)]
    server: Option<String>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Predict a disease from comma-separated symptoms
    Predict {
        #[arg(required = true, num_args = 1..)]
        symptoms: Vec<String>,
    },
    /// Speak your symptoms and predict from the transcript
    Voice,
    /// Find hospitals near a city
    Hospitals {
        #[arg(required = true, num_args = 1..)]
        city: Vec<String>,
    },
    /// Find medical shops near a city
    Shops {
        #[arg(required = true, num_args = 1..)]
        city: Vec<String>,
    },
    /// Look up precautions for a disease
    Precautions {
        #[arg(required = true, num_args = 1..)]
        disease: Vec<String>,
        /// Read the precautions aloud
        #[arg(long)]
        speak: bool,
    },
    /// Interactive shell (default)
    Shell,
}

impl Command {
    fn actions(self) -> Vec<Action> {
        match self {
            Command::Predict { symptoms } => vec![Action::Predict(symptoms.join(" "))],
            Command::Voice => vec![Action::VoiceCapture],
            Command::Hospitals { city } => vec![Action::FindHospitals(city.join(" "))],
            Command::Shops { city } => vec![Action::FindMedicalShops(city.join(" "))],
            Command::Precautions { disease, speak } => {
                let mut actions = vec![Action::Precautions(disease.join(" "))];
                if speak {
                    actions.push(Action::SpeakResult);
                }
                actions
            }
            Command::Shell => Vec::new(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = SymptoCareConfig::load_from_path(cli.config.clone())?;
    if let Some(server) = cli.server {
        config.server.base_url = server;
        config.validate()?;
    }

    let _telemetry = telemetry::init(&config.logging, &config.telemetry, cli.verbose)?;

    let config_path = cli.config.or_else(SymptoCareConfig::get_config_path);
    debug!(
        "Using config from: {}",
        config_path.map_or_else(|| "defaults".to_string(), |p| p.display().to_string())
    );
    info!("Backend: {}", config.server.base_url);

    let client = SymptoCareClient::new(&config.server)
        .with_context(|| "Failed to set up backend client")?;
    let speech = SpeechCapabilities::from_config(&config.speech);
    let (page, updates) = Page::watched();
    let controller = Controller::new(
        Arc::new(client),
        Arc::new(page),
        Arc::new(ConsoleNotifier),
        speech,
    );

    match cli.command.unwrap_or(Command::Shell) {
        Command::Shell => shell::run(controller, updates).await?,
        command => {
            let printer = shell::print_updates(updates);
            for action in command.actions() {
                controller.handle(action).await;
            }
            drop(controller);
            printer.await.with_context(|| "Update printer panicked")?;
        }
    }

    Ok(())
}
