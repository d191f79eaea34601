//! `SymptoCare` - symptom checking client
//!
//! This library wires the symptom checker's controls (disease prediction,
//! hospital and medical shop lookup, precautions) to the SymptoCare
//! backend, with optional speech input and output.

pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod models;
pub mod shell;
pub mod speech;
pub mod telemetry;
pub mod view;

// Re-export core types for public API
pub use api::{PlaceKind, SymptoCareApi, SymptoCareClient};
pub use config::SymptoCareConfig;
pub use controller::{Action, Controller};
pub use error::{ApiError, SymptoCareError};
pub use models::{DiseaseQuery, LocationQuery, Place, SymptomQuery};
pub use speech::{Capability, SpeechCapabilities};
pub use view::{Notifier, Page, PageSnapshot, ViewUpdate};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, SymptoCareError>;
