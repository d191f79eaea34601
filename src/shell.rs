//! Interactive terminal front end
//!
//! Every command line becomes a control activation running as its own
//! task, so a slow lookup never blocks the prompt. View changes are
//! printed as the page applies them.

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::controller::{Action, Controller};
use crate::view::{ListContent, Notifier, PageSnapshot, ViewUpdate};

const HELP: &str = "\
Commands:
  predict <symptom, symptom, ...>   predict a disease from symptoms
  voice                             speak your symptoms
  hospitals <city>                  find hospitals near a city
  shops <city>                      find medical shops near a city
  precautions <disease>             look up precautions
  speak                             read the precautions aloud
  show                              print the whole page
  help                              show this help
  quit                              exit";

/// Prints prompts to the terminal
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, message: &str) {
        println!("⚠️  {message}");
    }
}

/// One parsed line of shell input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Run(Action),
    Show,
    Help,
    Quit,
    Nothing,
}

/// Parse a shell line. A missing argument is passed on as an empty string;
/// the controller decides what counts as missing input.
pub fn parse_command(line: &str) -> std::result::Result<ShellCommand, String> {
    let line = line.trim();
    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(word, rest)| (word, rest.trim()));

    let command = match word.to_ascii_lowercase().as_str() {
        "" => ShellCommand::Nothing,
        "predict" => ShellCommand::Run(Action::Predict(rest.to_string())),
        "voice" => ShellCommand::Run(Action::VoiceCapture),
        "hospitals" => ShellCommand::Run(Action::FindHospitals(rest.to_string())),
        "shops" => ShellCommand::Run(Action::FindMedicalShops(rest.to_string())),
        "precautions" => ShellCommand::Run(Action::Precautions(rest.to_string())),
        "speak" => ShellCommand::Run(Action::SpeakResult),
        "show" => ShellCommand::Show,
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" => ShellCommand::Quit,
        other => return Err(format!("Unknown command '{other}'. Type 'help'.")),
    };
    Ok(command)
}

/// Print every view update until the page goes away
pub fn print_updates(mut updates: UnboundedReceiver<ViewUpdate>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(update) = updates.recv().await {
            println!("{update}");
        }
    })
}

fn render_list(content: &ListContent) -> String {
    match content {
        ListContent::Placeholder(text) => text.clone(),
        ListContent::Entries(entries) => entries
            .iter()
            .map(|e| format!("\n  - {}", e.text))
            .collect(),
    }
}

/// The whole page as text, for the `show` command
#[must_use]
pub fn render_page(page: &PageSnapshot) -> String {
    format!(
        "Symptoms:      {}\nPrediction:    {}\nHospitals:     {}\nMedical shops: {}\nPrecautions:   {}\nVoice:         {}{}",
        page.symptoms_input,
        page.prediction,
        render_list(&page.hospitals),
        render_list(&page.medical_shops),
        page.precautions,
        page.voice_trigger.label,
        if page.voice_trigger.enabled { "" } else { " (disabled)" },
    )
}

/// Read commands from stdin until `quit` or end of input, then wait for
/// every command still running so its result is printed.
pub async fn run(controller: Controller, updates: UnboundedReceiver<ViewUpdate>) -> Result<()> {
    let printer = print_updates(updates);
    println!("SymptoCare {}\n{HELP}", crate::VERSION);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut in_flight: Vec<JoinHandle<()>> = Vec::new();

    while let Some(line) = lines
        .next_line()
        .await
        .with_context(|| "Failed to read from stdin")?
    {
        in_flight.retain(|task| !task.is_finished());

        match parse_command(&line) {
            Ok(ShellCommand::Run(action)) => in_flight.push(controller.dispatch(action)),
            Ok(ShellCommand::Show) => println!("{}", render_page(&controller.page().snapshot())),
            Ok(ShellCommand::Help) => println!("{HELP}"),
            Ok(ShellCommand::Quit) => break,
            Ok(ShellCommand::Nothing) => {}
            Err(message) => println!("{message}"),
        }
    }

    debug!("Waiting for {} tasks before leaving the shell", in_flight.len());
    for result in futures::future::join_all(in_flight).await {
        if let Err(e) = result {
            warn!("Shell task failed: {e}");
        }
    }

    drop(controller);
    printer.await.with_context(|| "Update printer panicked")?;
    Ok(())
}
