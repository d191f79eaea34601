//! SymptoCare backend endpoints
//!
//! [`SymptoCareApi`] is the seam the controller talks through. The HTTP
//! implementation lives in [`client`]; tests drive the controller with
//! scripted doubles instead.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::models::{DiseaseQuery, LocationQuery, Place, SymptomQuery};

pub mod client;
pub mod middleware;

pub use client::SymptoCareClient;

/// Which lookup endpoint a city search goes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaceKind {
    Hospital,
    MedicalShop,
}

impl PlaceKind {
    #[must_use]
    pub fn endpoint(self) -> &'static str {
        match self {
            PlaceKind::Hospital => "/find-hospitals",
            PlaceKind::MedicalShop => "/find-medicalshops",
        }
    }
}

/// Body of a successful `/precautions` response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PrecautionsResponse {
    #[serde(default)]
    pub precautions: Option<String>,
}

/// Body of an error response; only `error` is read
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: Option<String>,
}

#[async_trait]
pub trait SymptoCareApi: Send + Sync {
    /// `POST /predict-disease`. The payload stays untyped: rendering falls
    /// back to the whole body when `disease` is missing.
    async fn predict_disease(&self, query: &SymptomQuery) -> Result<Value, ApiError>;

    /// `GET /find-hospitals` or `GET /find-medicalshops`
    async fn find_places(
        &self,
        kind: PlaceKind,
        query: &LocationQuery,
    ) -> Result<Vec<Place>, ApiError>;

    /// `POST /precautions`
    async fn precautions(&self, query: &DiseaseQuery) -> Result<PrecautionsResponse, ApiError>;
}
