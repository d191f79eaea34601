//! Speech bridge
//!
//! Speech-to-text and text-to-speech sit behind two traits. Which of them
//! exist is decided once, at startup, into a [`Capability`]; handlers only
//! ever branch on that.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::SymptoCareError;
use crate::config::SpeechConfig;

pub mod command;

pub use command::{CommandRecognizer, CommandSynthesizer};

/// An optional platform feature, resolved once
#[derive(Debug, Clone)]
pub enum Capability<T> {
    Available(T),
    Unavailable,
}

impl<T> Capability<T> {
    #[must_use]
    pub fn get(&self) -> Option<&T> {
        match self {
            Capability::Available(inner) => Some(inner),
            Capability::Unavailable => None,
        }
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        matches!(self, Capability::Available(_))
    }
}

impl<T> From<Option<T>> for Capability<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Capability::Unavailable, Capability::Available)
    }
}

/// How a recognition session is run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionOptions {
    /// BCP 47 language tag, e.g. `en-IN`
    pub locale: String,
    /// Keep listening after the first utterance
    pub continuous: bool,
    /// Deliver partial transcripts while the user is still speaking
    pub interim_results: bool,
    /// Cap on the whole session, speech included. Reaching it ends the
    /// session with [`RecognitionOutcome::NoSpeech`]
    pub session_timeout: Duration,
}

impl RecognitionOptions {
    /// One utterance, final result only
    #[must_use]
    pub fn single_utterance(locale: impl Into<String>, session_timeout: Duration) -> Self {
        Self {
            locale: locale.into(),
            continuous: false,
            interim_results: false,
            session_timeout,
        }
    }
}

/// How a recognition session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionOutcome {
    Transcript(String),
    Error(String),
    /// Session ended without hearing anything
    NoSpeech,
}

#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Run one session to completion
    async fn recognize(&self, options: &RecognitionOptions) -> RecognitionOutcome;
}

pub trait SpeechSynthesizer: Send + Sync {
    /// Queue `text` for playback and return without waiting for it
    fn speak(&self, text: &str) -> Result<(), SymptoCareError>;
}

/// The speech features this process can use
#[derive(Clone)]
pub struct SpeechCapabilities {
    pub synthesis: Capability<Arc<dyn SpeechSynthesizer>>,
    pub recognition: Capability<Arc<dyn SpeechRecognizer>>,
    pub options: RecognitionOptions,
}

impl SpeechCapabilities {
    /// Resolve from configuration: a configured command is an available
    /// capability, a missing one is not.
    #[must_use]
    pub fn from_config(config: &SpeechConfig) -> Self {
        let synthesis = config
            .synthesis_command
            .as_deref()
            .and_then(CommandSynthesizer::from_command)
            .map(|s| Arc::new(s) as Arc<dyn SpeechSynthesizer>);

        let recognition = config
            .recognition_command
            .as_deref()
            .and_then(CommandRecognizer::from_command)
            .map(|r| Arc::new(r) as Arc<dyn SpeechRecognizer>);

        let capabilities = Self {
            synthesis: synthesis.into(),
            recognition: recognition.into(),
            options: RecognitionOptions::single_utterance(
                config.locale.clone(),
                Duration::from_secs(config.recognition_timeout_seconds.into()),
            ),
        };

        debug!(
            synthesis = capabilities.synthesis.is_available(),
            recognition = capabilities.recognition.is_available(),
            locale = %capabilities.options.locale,
            "Resolved speech capabilities"
        );

        capabilities
    }

    /// Neither recognition nor synthesis
    #[must_use]
    pub fn none() -> Self {
        Self {
            synthesis: Capability::Unavailable,
            recognition: Capability::Unavailable,
            options: RecognitionOptions::single_utterance("en-IN", Duration::from_secs(10)),
        }
    }

    /// Hand `text` to the synthesizer. Nothing happens when synthesis is
    /// unavailable; playback failures are logged, not returned.
    pub fn speak(&self, text: &str) {
        let Some(synthesizer) = self.synthesis.get() else {
            debug!("Speech synthesis unavailable, not speaking");
            return;
        };
        if let Err(e) = synthesizer.speak(text) {
            warn!("Speech synthesis failed: {e}");
        }
    }
}
