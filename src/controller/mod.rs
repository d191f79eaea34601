//! UI event controller
//!
//! One handler per control. Each handler reads its input, validates it,
//! shows a loading placeholder, issues one request and renders the result
//! into its own view. Handlers share nothing but the [`Page`], and every
//! control stamps its requests with a [`Ticket`] so a slow response can
//! never overwrite a newer one.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::api::{PlaceKind, SymptoCareApi};
use crate::models::{DiseaseQuery, LocationQuery, SymptomQuery};
use crate::speech::{RecognitionOutcome, SpeechCapabilities};
use crate::view::{Notifier, Page, TriggerButton, ViewUpdate};

pub mod render;
pub mod sequencer;

pub use sequencer::{RequestSequencer, Ticket};

/// A control activation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Predict(String),
    VoiceCapture,
    FindHospitals(String),
    FindMedicalShops(String),
    Precautions(String),
    SpeakResult,
}

#[derive(Default)]
struct Sequencers {
    prediction: RequestSequencer,
    hospitals: RequestSequencer,
    medical_shops: RequestSequencer,
    precautions: RequestSequencer,
}

impl Sequencers {
    fn places(&self, kind: PlaceKind) -> &RequestSequencer {
        match kind {
            PlaceKind::Hospital => &self.hospitals,
            PlaceKind::MedicalShop => &self.medical_shops,
        }
    }
}

/// Restores the voice trigger when dropped, whatever ended the session
struct ListeningGuard {
    page: Arc<Page>,
}

impl ListeningGuard {
    fn engage(page: Arc<Page>) -> Self {
        page.apply(ViewUpdate::VoiceTrigger(TriggerButton::listening()));
        Self { page }
    }
}

impl Drop for ListeningGuard {
    fn drop(&mut self) {
        self.page
            .apply(ViewUpdate::VoiceTrigger(TriggerButton::idle()));
    }
}

/// Binds the five controls to the backend and the speech bridge
#[derive(Clone)]
pub struct Controller {
    api: Arc<dyn SymptoCareApi>,
    page: Arc<Page>,
    notifier: Arc<dyn Notifier>,
    speech: SpeechCapabilities,
    sequencers: Arc<Sequencers>,
}

impl Controller {
    pub fn new(
        api: Arc<dyn SymptoCareApi>,
        page: Arc<Page>,
        notifier: Arc<dyn Notifier>,
        speech: SpeechCapabilities,
    ) -> Self {
        Self {
            api,
            page,
            notifier,
            speech,
            sequencers: Arc::new(Sequencers::default()),
        }
    }

    #[must_use]
    pub fn page(&self) -> &Arc<Page> {
        &self.page
    }

    /// Run `action` as its own task. Nothing is cancelled: earlier
    /// activations keep running and simply lose the right to render.
    pub fn dispatch(&self, action: Action) -> JoinHandle<()> {
        let controller = self.clone();
        tokio::spawn(async move { controller.handle(action).await })
    }

    /// Run `action` to completion on the current task
    pub async fn handle(&self, action: Action) {
        debug!(?action, "Handling action");
        match action {
            Action::Predict(text) => self.predict(&text).await,
            Action::VoiceCapture => self.voice_capture().await,
            Action::FindHospitals(city) => self.find_hospitals(&city).await,
            Action::FindMedicalShops(city) => self.find_medical_shops(&city).await,
            Action::Precautions(disease) => self.precautions(&disease).await,
            Action::SpeakResult => self.speak_result(),
        }
    }

    /// Predict button: symptom text in, predicted disease out
    pub async fn predict(&self, text: &str) {
        let Ok(query) = SymptomQuery::parse(text) else {
            self.notifier.notify(render::PROMPT_SYMPTOMS);
            return;
        };
        self.run_prediction(query).await;
    }

    #[instrument(skip(self, query), fields(symptoms = ?query.symptoms))]
    async fn run_prediction(&self, query: SymptomQuery) {
        let sequencer = &self.sequencers.prediction;
        let ticket = sequencer.issue();
        self.page
            .apply(ViewUpdate::Prediction(render::PREDICTING.to_string()));

        let text = match self.api.predict_disease(&query).await {
            Ok(payload) => render::prediction(&payload),
            Err(e) => {
                warn!("Prediction failed: {e}");
                render::prediction_error(&e)
            }
        };

        if !self
            .page
            .apply_if(|| sequencer.is_current(ticket), ViewUpdate::Prediction(text))
        {
            debug!(?ticket, "Discarding superseded prediction");
        }
    }

    /// Voice button: one recognition session feeding the predict flow
    #[instrument(skip(self))]
    pub async fn voice_capture(&self) {
        let Some(recognizer) = self.speech.recognition.get() else {
            self.notifier.notify(render::VOICE_UNSUPPORTED);
            return;
        };

        let transcript = {
            let _listening = ListeningGuard::engage(Arc::clone(&self.page));
            match recognizer.recognize(&self.speech.options).await {
                RecognitionOutcome::Transcript(spoken) => Some(spoken.trim().to_string()),
                RecognitionOutcome::Error(reason) => {
                    warn!("Recognition failed: {reason}");
                    self.notifier.notify(render::VOICE_FAILED);
                    None
                }
                RecognitionOutcome::NoSpeech => {
                    info!("Recognition session ended without speech");
                    None
                }
            }
        };

        let Some(spoken) = transcript.filter(|s| !s.is_empty()) else {
            return;
        };

        self.page.apply(ViewUpdate::SymptomsInput(spoken.clone()));
        self.run_prediction(SymptomQuery::from_text(&spoken)).await;
    }

    pub async fn find_hospitals(&self, city: &str) {
        self.find_places(PlaceKind::Hospital, city).await;
    }

    pub async fn find_medical_shops(&self, city: &str) {
        self.find_places(PlaceKind::MedicalShop, city).await;
    }

    #[instrument(skip(self))]
    async fn find_places(&self, kind: PlaceKind, city: &str) {
        let Ok(query) = LocationQuery::parse(city) else {
            self.notifier.notify(render::PROMPT_CITY);
            return;
        };

        let sequencer = self.sequencers.places(kind);
        let ticket = sequencer.issue();
        self.page.apply(ViewUpdate::Places(
            kind,
            render::searching(kind, query.city()),
        ));

        let content = match self.api.find_places(kind, &query).await {
            Ok(places) => render::places(kind, &places),
            Err(e) => {
                warn!("Lookup at {} failed: {e}", kind.endpoint());
                render::places_error(kind)
            }
        };

        if !self
            .page
            .apply_if(|| sequencer.is_current(ticket), ViewUpdate::Places(kind, content))
        {
            debug!(?ticket, "Discarding superseded lookup");
        }
    }

    /// Precautions button: disease name in, precaution text out
    #[instrument(skip(self))]
    pub async fn precautions(&self, disease: &str) {
        let Ok(query) = DiseaseQuery::parse(disease) else {
            self.notifier.notify(render::PROMPT_DISEASE);
            return;
        };

        let sequencer = &self.sequencers.precautions;
        let ticket = sequencer.issue();
        self.page.apply(ViewUpdate::Precautions(render::fetching_precautions(
            &query.disease,
        )));

        let text = match self.api.precautions(&query).await {
            Ok(response) => render::precautions(&response),
            Err(e) => {
                warn!("Precautions lookup failed: {e}");
                render::PRECAUTIONS_ERROR.to_string()
            }
        };

        if !self
            .page
            .apply_if(|| sequencer.is_current(ticket), ViewUpdate::Precautions(text))
        {
            debug!(?ticket, "Discarding superseded precautions");
        }
    }

    /// Speak button: read the displayed precautions aloud
    pub fn speak_result(&self) {
        let text = self.page.precautions_text();
        let text = text.trim();
        if text.is_empty() {
            self.notifier.notify(render::PROMPT_NOTHING_TO_READ);
            return;
        }
        self.speech.speak(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::PrecautionsResponse;
    use crate::error::ApiError;
    use crate::models::Place;
    use crate::speech::{
        Capability, RecognitionOptions, SpeechRecognizer, SpeechSynthesizer,
    };
    use crate::view::{EntryStyle, ListContent, ListEntry, PageSnapshot};
    use crate::SymptoCareError;
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use serde_json::{Value, json};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::oneshot;

    /// Scripted backend. Every call is counted; responses come from the
    /// fields, or from a gate the test releases by hand.
    #[derive(Default)]
    struct ScriptedApi {
        calls: AtomicUsize,
        predictions: Mutex<Vec<Result<Value, ApiError>>>,
        places: Mutex<Vec<Result<Vec<Place>, ApiError>>>,
        precautions: Mutex<Vec<Result<PrecautionsResponse, ApiError>>>,
        gates: Mutex<Vec<oneshot::Receiver<()>>>,
        seen_symptoms: Mutex<Vec<Vec<String>>>,
    }

    impl ScriptedApi {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        async fn wait_gate(&self) {
            let gate = self.gates.lock().unwrap().pop();
            if let Some(gate) = gate {
                let _ = gate.await;
            }
        }
    }

    #[async_trait]
    impl SymptoCareApi for ScriptedApi {
        async fn predict_disease(&self, query: &SymptomQuery) -> Result<Value, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen_symptoms
                .lock()
                .unwrap()
                .push(query.symptoms.clone());
            let next = self.predictions.lock().unwrap().remove(0);
            self.wait_gate().await;
            next
        }

        async fn find_places(
            &self,
            _kind: PlaceKind,
            _query: &LocationQuery,
        ) -> Result<Vec<Place>, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self.places.lock().unwrap().remove(0);
            self.wait_gate().await;
            next
        }

        async fn precautions(
            &self,
            _query: &DiseaseQuery,
        ) -> Result<PrecautionsResponse, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self.precautions.lock().unwrap().remove(0);
            self.wait_gate().await;
            next
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        messages: Mutex<Vec<String>>,
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, message: &str) {
            self.messages.lock().unwrap().push(message.to_string());
        }
    }

    struct FixedRecognizer(RecognitionOutcome);

    #[async_trait]
    impl SpeechRecognizer for FixedRecognizer {
        async fn recognize(&self, _options: &RecognitionOptions) -> RecognitionOutcome {
            self.0.clone()
        }
    }

    /// Never finishes; used to cancel a session mid-flight
    struct HangingRecognizer;

    #[async_trait]
    impl SpeechRecognizer for HangingRecognizer {
        async fn recognize(&self, _options: &RecognitionOptions) -> RecognitionOutcome {
            std::future::pending().await
        }
    }

    #[derive(Default)]
    struct RecordingSynthesizer {
        spoken: Mutex<Vec<String>>,
    }

    impl SpeechSynthesizer for RecordingSynthesizer {
        fn speak(&self, text: &str) -> Result<(), SymptoCareError> {
            self.spoken.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    struct Harness {
        controller: Controller,
        api: Arc<ScriptedApi>,
        notifier: Arc<RecordingNotifier>,
    }

    fn harness(api: ScriptedApi, speech: SpeechCapabilities) -> Harness {
        let api = Arc::new(api);
        let notifier = Arc::new(RecordingNotifier::default());
        let controller = Controller::new(
            api.clone(),
            Arc::new(Page::new()),
            notifier.clone(),
            speech,
        );
        Harness {
            controller,
            api,
            notifier,
        }
    }

    fn speech_with_recognizer(recognizer: impl SpeechRecognizer + 'static) -> SpeechCapabilities {
        SpeechCapabilities {
            recognition: Capability::Available(Arc::new(recognizer) as Arc<dyn SpeechRecognizer>),
            ..SpeechCapabilities::none()
        }
    }

    fn server_error(message: Option<&str>) -> ApiError {
        ApiError::Status {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            server_message: message.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_predict_sends_split_symptoms() {
        let api = ScriptedApi {
            predictions: Mutex::new(vec![Ok(json!({"disease": "Flu"}))]),
            ..Default::default()
        };
        let h = harness(api, SpeechCapabilities::none());

        h.controller.predict("fever, , cough ").await;

        assert_eq!(
            *h.api.seen_symptoms.lock().unwrap(),
            vec![vec!["fever".to_string(), "cough".to_string()]]
        );
        assert_eq!(
            h.controller.page().snapshot().prediction,
            "Predicted Disease: Flu"
        );
    }

    #[tokio::test]
    async fn test_blank_inputs_never_call_the_server() {
        let h = harness(ScriptedApi::default(), SpeechCapabilities::none());

        h.controller.predict("   ").await;
        h.controller.find_hospitals("").await;
        h.controller.find_medical_shops(" \t").await;
        h.controller.precautions("").await;

        assert_eq!(h.api.calls(), 0);
        assert_eq!(
            *h.notifier.messages.lock().unwrap(),
            vec![
                render::PROMPT_SYMPTOMS,
                render::PROMPT_CITY,
                render::PROMPT_CITY,
                render::PROMPT_DISEASE,
            ]
        );
        assert_eq!(h.controller.page().snapshot(), PageSnapshot::default());
    }

    #[tokio::test]
    async fn test_predict_error_prefers_server_message() {
        let api = ScriptedApi {
            predictions: Mutex::new(vec![
                Err(server_error(Some("Model not loaded"))),
                Err(server_error(None)),
            ]),
            ..Default::default()
        };
        let h = harness(api, SpeechCapabilities::none());

        h.controller.predict("fever").await;
        assert_eq!(
            h.controller.page().snapshot().prediction,
            "Error: Model not loaded"
        );

        h.controller.predict("fever").await;
        assert_eq!(
            h.controller.page().snapshot().prediction,
            "Error: Request failed with status code 500"
        );
    }

    #[tokio::test]
    async fn test_empty_results_render_single_not_found_entry() {
        let api = ScriptedApi {
            places: Mutex::new(vec![Ok(Vec::new())]),
            ..Default::default()
        };
        let h = harness(api, SpeechCapabilities::none());

        h.controller.find_hospitals("Atlantis").await;

        let snapshot = h.controller.page().snapshot();
        assert_eq!(
            snapshot.hospitals,
            ListContent::Entries(vec![ListEntry::plain("No hospitals found nearby.")])
        );
    }

    #[tokio::test]
    async fn test_places_render_rounded_coordinates() {
        let api = ScriptedApi {
            places: Mutex::new(vec![Ok(vec![Place::new("City Hospital", 12.34567, 77.12345)])]),
            ..Default::default()
        };
        let h = harness(api, SpeechCapabilities::none());

        h.controller.find_hospitals("Bengaluru").await;

        let snapshot = h.controller.page().snapshot();
        assert_eq!(
            snapshot.hospitals.entries(),
            &[ListEntry {
                text: "🏥 City Hospital (12.346, 77.123)".to_string(),
                style: EntryStyle::Hospital,
            }]
        );
        assert_eq!(snapshot.medical_shops, ListContent::default());
    }

    #[tokio::test]
    async fn test_failures_render_one_message_each() {
        let api = ScriptedApi {
            places: Mutex::new(vec![Err(server_error(None))]),
            precautions: Mutex::new(vec![Err(ApiError::Transport("connection reset".into()))]),
            ..Default::default()
        };
        let h = harness(api, SpeechCapabilities::none());

        h.controller.find_medical_shops("Pune").await;
        h.controller.precautions("Dengue").await;

        let snapshot = h.controller.page().snapshot();
        assert_eq!(
            snapshot.medical_shops,
            ListContent::Entries(vec![ListEntry::plain("❌ Error fetching medical shop data.")])
        );
        assert_eq!(snapshot.precautions, render::PRECAUTIONS_ERROR);
    }

    #[tokio::test]
    async fn test_placeholder_shown_while_in_flight() {
        let (release, gate) = oneshot::channel();
        let api = ScriptedApi {
            precautions: Mutex::new(vec![Ok(PrecautionsResponse {
                precautions: Some("Stay hydrated".into()),
            })]),
            gates: Mutex::new(vec![gate]),
            ..Default::default()
        };
        let h = harness(api, SpeechCapabilities::none());

        let task = h.controller.dispatch(Action::Precautions("Dengue".into()));
        while h.api.calls() == 0 {
            tokio::task::yield_now().await;
        }
        assert_eq!(
            h.controller.page().snapshot().precautions,
            "⏳ Getting precautions for Dengue..."
        );

        release.send(()).unwrap();
        task.await.unwrap();
        assert_eq!(h.controller.page().snapshot().precautions, "Stay hydrated");
    }

    #[tokio::test]
    async fn test_stale_response_does_not_overwrite_newer() {
        let (release_first, first_gate) = oneshot::channel();
        let api = ScriptedApi {
            predictions: Mutex::new(vec![
                Ok(json!({"disease": "Common Cold"})),
                Ok(json!({"disease": "Malaria"})),
            ]),
            // popped from the back: the first request waits, the second does not
            gates: Mutex::new(vec![first_gate]),
            ..Default::default()
        };
        let h = harness(api, SpeechCapabilities::none());

        let first = h.controller.dispatch(Action::Predict("sneezing".into()));
        while h.api.calls() == 0 {
            tokio::task::yield_now().await;
        }

        h.controller.predict("chills, high fever").await;
        assert_eq!(
            h.controller.page().snapshot().prediction,
            "Predicted Disease: Malaria"
        );

        release_first.send(()).unwrap();
        first.await.unwrap();
        assert_eq!(
            h.controller.page().snapshot().prediction,
            "Predicted Disease: Malaria"
        );
    }

    #[tokio::test]
    async fn test_voice_unsupported_notifies() {
        let h = harness(ScriptedApi::default(), SpeechCapabilities::none());

        h.controller.voice_capture().await;

        assert_eq!(
            *h.notifier.messages.lock().unwrap(),
            vec![render::VOICE_UNSUPPORTED]
        );
        assert_eq!(h.controller.page().snapshot().voice_trigger, TriggerButton::idle());
    }

    #[tokio::test]
    async fn test_voice_transcript_feeds_prediction() {
        let api = ScriptedApi {
            predictions: Mutex::new(vec![Ok(json!({"disease": "Migraine"}))]),
            ..Default::default()
        };
        let recognizer =
            FixedRecognizer(RecognitionOutcome::Transcript(" headache, nausea ".into()));
        let h = harness(api, speech_with_recognizer(recognizer));

        h.controller.voice_capture().await;

        let snapshot = h.controller.page().snapshot();
        assert_eq!(snapshot.symptoms_input, "headache, nausea");
        assert_eq!(snapshot.prediction, "Predicted Disease: Migraine");
        assert_eq!(snapshot.voice_trigger, TriggerButton::idle());
        assert_eq!(
            *h.api.seen_symptoms.lock().unwrap(),
            vec![vec!["headache".to_string(), "nausea".to_string()]]
        );
    }

    #[tokio::test]
    async fn test_voice_error_notifies_and_restores() {
        let recognizer = FixedRecognizer(RecognitionOutcome::Error("no-speech".into()));
        let h = harness(ScriptedApi::default(), speech_with_recognizer(recognizer));

        h.controller.voice_capture().await;

        assert_eq!(*h.notifier.messages.lock().unwrap(), vec![render::VOICE_FAILED]);
        assert_eq!(h.controller.page().snapshot().voice_trigger, TriggerButton::idle());
        assert_eq!(h.api.calls(), 0);
    }

    #[tokio::test]
    async fn test_voice_silence_restores_without_request() {
        let h = harness(
            ScriptedApi::default(),
            speech_with_recognizer(FixedRecognizer(RecognitionOutcome::NoSpeech)),
        );

        h.controller.voice_capture().await;

        assert!(h.notifier.messages.lock().unwrap().is_empty());
        assert_eq!(h.controller.page().snapshot().voice_trigger, TriggerButton::idle());
        assert_eq!(h.api.calls(), 0);
    }

    #[tokio::test]
    async fn test_voice_trigger_restored_when_session_cancelled() {
        let h = harness(
            ScriptedApi::default(),
            speech_with_recognizer(HangingRecognizer),
        );

        let session = h.controller.dispatch(Action::VoiceCapture);
        while !h.controller.page().snapshot().voice_trigger.is_listening() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        session.abort();
        let _ = session.await;
        assert_eq!(h.controller.page().snapshot().voice_trigger, TriggerButton::idle());
    }

    #[tokio::test]
    async fn test_speak_result_reads_displayed_precautions() {
        let synthesizer = Arc::new(RecordingSynthesizer::default());
        let speech = SpeechCapabilities {
            synthesis: Capability::Available(synthesizer.clone() as Arc<dyn SpeechSynthesizer>),
            ..SpeechCapabilities::none()
        };
        let api = ScriptedApi {
            precautions: Mutex::new(vec![Ok(PrecautionsResponse {
                precautions: Some("  1. Rest 2. Fluids  ".into()),
            })]),
            ..Default::default()
        };
        let h = harness(api, speech);

        h.controller.speak_result();
        assert_eq!(
            *h.notifier.messages.lock().unwrap(),
            vec![render::PROMPT_NOTHING_TO_READ]
        );

        h.controller.precautions("Flu").await;
        h.controller.speak_result();
        assert_eq!(*synthesizer.spoken.lock().unwrap(), vec!["1. Rest 2. Fluids"]);
    }
}
