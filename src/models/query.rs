//! User queries, built from raw input text on each activation

use serde::Serialize;

use crate::SymptoCareError;

/// Ordered symptom list sent to the prediction endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymptomQuery {
    pub symptoms: Vec<String>,
}

impl SymptomQuery {
    /// Split free text on commas, trimming each token and dropping empty
    /// ones. Order and duplicates are kept as typed.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        let symptoms = text
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        Self { symptoms }
    }

    /// Like [`SymptomQuery::from_text`] but rejects blank input.
    pub fn parse(text: &str) -> Result<Self, SymptoCareError> {
        if text.trim().is_empty() {
            return Err(SymptoCareError::validation("Symptoms cannot be empty"));
        }
        Ok(Self::from_text(text))
    }
}

/// City name for the hospital and medical shop lookups
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationQuery {
    city: String,
}

impl LocationQuery {
    pub fn parse(text: &str) -> Result<Self, SymptoCareError> {
        let city = text.trim();
        if city.is_empty() {
            return Err(SymptoCareError::validation("City cannot be empty"));
        }
        Ok(Self {
            city: city.to_string(),
        })
    }

    #[must_use]
    pub fn city(&self) -> &str {
        &self.city
    }

    /// City name ready to be placed in a query string
    #[must_use]
    pub fn encoded(&self) -> String {
        urlencoding::encode(&self.city).into_owned()
    }
}

/// Disease name for the precautions endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiseaseQuery {
    pub disease: String,
}

impl DiseaseQuery {
    pub fn parse(text: &str) -> Result<Self, SymptoCareError> {
        let disease = text.trim();
        if disease.is_empty() {
            return Err(SymptoCareError::validation("Disease cannot be empty"));
        }
        Ok(Self {
            disease: disease.to_string(),
        })
    }
}
