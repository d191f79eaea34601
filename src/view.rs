//! View models for the five controls
//!
//! The [`Page`] owns every piece of display state. Handlers never touch it
//! directly; they build a [`ViewUpdate`] and hand it to the page, which
//! applies it and forwards it to whoever is watching.

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;

use crate::api::PlaceKind;

/// Label of the voice trigger while no session is running
pub const IDLE_LABEL: &str = "🎤 Speak";
/// Label of the voice trigger during a recognition session
pub const LISTENING_LABEL: &str = "🎙 Listening...";

/// User-facing prompt channel, the terminal stand-in for `alert()`
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

/// Visual treatment of a list entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStyle {
    Hospital,
    MedicalShop,
    /// Status rows: "not found" and errors
    Plain,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub text: String,
    pub style: EntryStyle,
}

impl ListEntry {
    #[must_use]
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: EntryStyle::Plain,
        }
    }
}

/// Contents of a result list: a bare status line, or entries
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListContent {
    Placeholder(String),
    Entries(Vec<ListEntry>),
}

impl Default for ListContent {
    fn default() -> Self {
        ListContent::Entries(Vec::new())
    }
}

impl ListContent {
    #[must_use]
    pub fn entries(&self) -> &[ListEntry] {
        match self {
            ListContent::Entries(entries) => entries.as_slice(),
            ListContent::Placeholder(_) => &[],
        }
    }
}

/// Voice capture button, idle ⇄ listening
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerButton {
    pub label: String,
    pub enabled: bool,
}

impl TriggerButton {
    #[must_use]
    pub fn idle() -> Self {
        Self {
            label: IDLE_LABEL.to_string(),
            enabled: true,
        }
    }

    #[must_use]
    pub fn listening() -> Self {
        Self {
            label: LISTENING_LABEL.to_string(),
            enabled: false,
        }
    }

    #[must_use]
    pub fn is_listening(&self) -> bool {
        !self.enabled
    }
}

impl Default for TriggerButton {
    fn default() -> Self {
        Self::idle()
    }
}

/// Full display state of the page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSnapshot {
    pub symptoms_input: String,
    pub prediction: String,
    pub hospitals: ListContent,
    pub medical_shops: ListContent,
    pub precautions: String,
    pub voice_trigger: TriggerButton,
}

impl PageSnapshot {
    #[must_use]
    pub fn places(&self, kind: PlaceKind) -> &ListContent {
        match kind {
            PlaceKind::Hospital => &self.hospitals,
            PlaceKind::MedicalShop => &self.medical_shops,
        }
    }
}

/// One change to one element of the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewUpdate {
    SymptomsInput(String),
    Prediction(String),
    Places(PlaceKind, ListContent),
    Precautions(String),
    VoiceTrigger(TriggerButton),
}

impl ViewUpdate {
    fn apply(&self, state: &mut PageSnapshot) {
        match self {
            ViewUpdate::SymptomsInput(text) => state.symptoms_input.clone_from(text),
            ViewUpdate::Prediction(text) => state.prediction.clone_from(text),
            ViewUpdate::Places(PlaceKind::Hospital, content) => {
                state.hospitals.clone_from(content);
            }
            ViewUpdate::Places(PlaceKind::MedicalShop, content) => {
                state.medical_shops.clone_from(content);
            }
            ViewUpdate::Precautions(text) => state.precautions.clone_from(text),
            ViewUpdate::VoiceTrigger(button) => state.voice_trigger.clone_from(button),
        }
    }
}

impl fmt::Display for ViewUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewUpdate::SymptomsInput(text) => write!(f, "[symptoms] {text}"),
            ViewUpdate::Prediction(text) => write!(f, "[prediction] {text}"),
            ViewUpdate::Places(kind, content) => {
                let tag = match kind {
                    PlaceKind::Hospital => "hospitals",
                    PlaceKind::MedicalShop => "medical shops",
                };
                match content {
                    ListContent::Placeholder(text) => write!(f, "[{tag}] {text}"),
                    ListContent::Entries(entries) => {
                        write!(f, "[{tag}]")?;
                        for entry in entries {
                            write!(f, "\n  - {}", entry.text)?;
                        }
                        Ok(())
                    }
                }
            }
            ViewUpdate::Precautions(text) => write!(f, "[precautions] {text}"),
            ViewUpdate::VoiceTrigger(button) => {
                let state = if button.enabled { "enabled" } else { "disabled" };
                write!(f, "[voice] {} ({state})", button.label)
            }
        }
    }
}

/// Owner of the display state
pub struct Page {
    state: Mutex<PageSnapshot>,
    updates: Option<mpsc::UnboundedSender<ViewUpdate>>,
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

impl Page {
    /// A page nobody is watching
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(PageSnapshot::default()),
            updates: None,
        }
    }

    /// A page that forwards every applied update to the returned receiver
    #[must_use]
    pub fn watched() -> (Self, mpsc::UnboundedReceiver<ViewUpdate>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let page = Self {
            state: Mutex::new(PageSnapshot::default()),
            updates: Some(tx),
        };
        (page, rx)
    }

    fn lock(&self) -> MutexGuard<'_, PageSnapshot> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn apply(&self, update: ViewUpdate) {
        self.apply_if(|| true, update);
    }

    /// Apply `update` only if `still_wanted` holds. The check runs under
    /// the page lock so it cannot interleave with another render.
    pub fn apply_if(&self, still_wanted: impl FnOnce() -> bool, update: ViewUpdate) -> bool {
        let mut state = self.lock();
        if !still_wanted() {
            return false;
        }
        update.apply(&mut state);
        if let Some(tx) = &self.updates {
            // A closed receiver only means nobody is watching anymore
            let _ = tx.send(update);
        }
        true
    }

    #[must_use]
    pub fn snapshot(&self) -> PageSnapshot {
        self.lock().clone()
    }

    /// Precaution text as currently displayed
    #[must_use]
    pub fn precautions_text(&self) -> String {
        self.lock().precautions.clone()
    }
}
