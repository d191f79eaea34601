//! Data models for the SymptoCare client
//!
//! Everything here is transient: built on a control activation, consumed
//! by one request and dropped once rendered.
//! - Query: validated user input for each endpoint
//! - Place: hospital and medical shop lookup results

pub mod place;
pub mod query;

pub use place::{Place, PlaceResults};
pub use query::{DiseaseQuery, LocationQuery, SymptomQuery};
