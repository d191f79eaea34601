//! Speech capabilities backed by external programs
//!
//! Synthesis spawns a TTS program (`espeak-ng`, `say`, ...) with the text
//! as its last argument. Recognition runs a transcription program that
//! listens on the microphone and prints what it heard to stdout; it is
//! invoked with `--language <locale>` appended to its configured
//! arguments.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};

use super::{RecognitionOptions, RecognitionOutcome, SpeechRecognizer, SpeechSynthesizer};
use crate::SymptoCareError;

/// Text-to-speech through an external program
#[derive(Debug, Clone)]
pub struct CommandSynthesizer {
    program: String,
    args: Vec<String>,
}

impl CommandSynthesizer {
    /// `command[0]` is the program, the rest are leading arguments.
    /// Returns `None` for an empty command.
    #[must_use]
    pub fn from_command(command: &[String]) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }
}

impl SpeechSynthesizer for CommandSynthesizer {
    fn speak(&self, text: &str) -> Result<(), SymptoCareError> {
        debug!(program = %self.program, "Speaking {} chars", text.len());
        // The child is not awaited; tokio reaps it once it exits
        Command::new(&self.program)
            .args(&self.args)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                SymptoCareError::speech(format!("Failed to start '{}': {e}", self.program))
            })?;
        Ok(())
    }
}

/// Speech-to-text through an external program
#[derive(Debug, Clone)]
pub struct CommandRecognizer {
    program: String,
    args: Vec<String>,
}

impl CommandRecognizer {
    /// `command[0]` is the program, the rest are leading arguments.
    /// Returns `None` for an empty command.
    #[must_use]
    pub fn from_command(command: &[String]) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }
}

/// First non-blank line of the program's output, trimmed
fn first_transcript_line(stdout: &[u8]) -> Option<String> {
    String::from_utf8_lossy(stdout)
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl SpeechRecognizer for CommandRecognizer {
    #[instrument(skip(self, options), fields(program = %self.program, locale = %options.locale))]
    async fn recognize(&self, options: &RecognitionOptions) -> RecognitionOutcome {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg("--language")
            .arg(&options.locale)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match tokio::time::timeout(options.session_timeout, command.output()).await {
            Err(_) => {
                info!(
                    "No transcript within {:.0}s, ending session",
                    options.session_timeout.as_secs_f64()
                );
                return RecognitionOutcome::NoSpeech;
            }
            Ok(Err(e)) => {
                warn!("Failed to start recognizer: {e}");
                return RecognitionOutcome::Error(format!(
                    "Failed to start '{}': {e}",
                    self.program
                ));
            }
            Ok(Ok(output)) => output,
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!(status = %output.status, "Recognizer exited with an error: {stderr}");
            return RecognitionOutcome::Error(if stderr.is_empty() {
                format!("recognizer exited with {}", output.status)
            } else {
                stderr
            });
        }

        match first_transcript_line(&output.stdout) {
            Some(transcript) => {
                debug!("Recognized: {transcript}");
                RecognitionOutcome::Transcript(transcript)
            }
            None => RecognitionOutcome::NoSpeech,
        }
    }
}
