//! Display text for each control's loading, success and failure states

use serde_json::Value;

use crate::api::{PlaceKind, PrecautionsResponse};
use crate::error::ApiError;
use crate::models::Place;
use crate::view::{EntryStyle, ListContent, ListEntry};

pub const PREDICTING: &str = "Predicting...";
pub const NO_PRECAUTIONS: &str = "No precautions found.";
pub const PRECAUTIONS_ERROR: &str = "❌ Error fetching precautions.";

pub const PROMPT_SYMPTOMS: &str = "Please enter symptoms.";
pub const PROMPT_CITY: &str = "Please enter a city name.";
pub const PROMPT_DISEASE: &str = "Enter a disease name.";
pub const PROMPT_NOTHING_TO_READ: &str = "No precautions to read";
pub const VOICE_UNSUPPORTED: &str = "Voice recognition not supported.";
pub const VOICE_FAILED: &str = "Could not recognize voice, please try again.";

/// Wording and styling that differ between the two place lookups
struct PlaceLabels {
    noun: &'static str,
    icon: &'static str,
    style: EntryStyle,
    data: &'static str,
}

fn labels(kind: PlaceKind) -> PlaceLabels {
    match kind {
        PlaceKind::Hospital => PlaceLabels {
            noun: "hospitals",
            icon: "🏥",
            style: EntryStyle::Hospital,
            data: "hospital data",
        },
        PlaceKind::MedicalShop => PlaceLabels {
            noun: "medical shops",
            icon: "💊",
            style: EntryStyle::MedicalShop,
            data: "medical shop data",
        },
    }
}

/// `Predicted Disease: <name>`, falling back to the whole payload as JSON
/// when it has no usable `disease` field.
#[must_use]
pub fn prediction(payload: &Value) -> String {
    let disease = match payload.get("disease") {
        Some(Value::String(name)) if !name.is_empty() => name.clone(),
        Some(Value::Number(n)) if n.as_f64() != Some(0.0) => n.to_string(),
        Some(Value::Bool(true)) => "true".to_string(),
        Some(other @ (Value::Array(_) | Value::Object(_))) => other.to_string(),
        _ => payload.to_string(),
    };
    format!("Predicted Disease: {disease}")
}

#[must_use]
pub fn prediction_error(err: &ApiError) -> String {
    format!("Error: {}", err.display_message())
}

#[must_use]
pub fn searching(kind: PlaceKind, city: &str) -> ListContent {
    ListContent::Placeholder(format!("🔎 Searching for {} near {city}...", labels(kind).noun))
}

/// One entry per place, or a single "none found" entry for no places
#[must_use]
pub fn places(kind: PlaceKind, places: &[Place]) -> ListContent {
    let labels = labels(kind);
    if places.is_empty() {
        return ListContent::Entries(vec![ListEntry::plain(format!(
            "No {} found nearby.",
            labels.noun
        ))]);
    }

    ListContent::Entries(
        places
            .iter()
            .map(|place| ListEntry {
                text: format!(
                    "{} {} {}",
                    labels.icon,
                    place.name,
                    place.format_coordinates()
                ),
                style: labels.style,
            })
            .collect(),
    )
}

#[must_use]
pub fn places_error(kind: PlaceKind) -> ListContent {
    ListContent::Entries(vec![ListEntry::plain(format!(
        "❌ Error fetching {}.",
        labels(kind).data
    ))])
}

#[must_use]
pub fn fetching_precautions(disease: &str) -> String {
    format!("⏳ Getting precautions for {disease}...")
}

#[must_use]
pub fn precautions(response: &PrecautionsResponse) -> String {
    match response.precautions.as_deref() {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => NO_PRECAUTIONS.to_string(),
    }
}
