//! HTTP client for the SymptoCare backend

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Response;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::middleware::RequestLogging;
use super::{ErrorBody, PlaceKind, PrecautionsResponse, SymptoCareApi};
use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::models::{DiseaseQuery, LocationQuery, Place, PlaceResults, SymptomQuery};

/// Client for the four backend endpoints. No retries: a failure is
/// reported once and rendered by the caller.
#[derive(Clone)]
pub struct SymptoCareClient {
    client: ClientWithMiddleware,
    base_url: String,
}

impl SymptoCareClient {
    /// Create a new client from the server settings
    pub fn new(config: &ServerConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("SymptoCare/", env!("CARGO_PKG_VERSION")));

        if config.timeout_seconds > 0 {
            builder = builder.timeout(Duration::from_secs(config.timeout_seconds.into()));
        }

        let http = builder
            .build()
            .with_context(|| "Failed to create HTTP client")?;

        let client = ClientBuilder::new(http).with(RequestLogging).build();

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Turn a response into `T`, or into a status error carrying the body's
/// `error` field when the server sent one.
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let server_message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.error);
        warn!(
            status = status.as_u16(),
            server_message = server_message.as_deref().unwrap_or(""),
            "Endpoint returned an error status"
        );
        return Err(ApiError::Status {
            status,
            server_message,
        });
    }

    response.json::<T>().await.map_err(ApiError::from)
}

#[async_trait]
impl SymptoCareApi for SymptoCareClient {
    #[instrument(skip(self, query), fields(symptoms = query.symptoms.len()))]
    async fn predict_disease(&self, query: &SymptomQuery) -> Result<Value, ApiError> {
        let start_time = Instant::now();
        let response = self
            .client
            .post(self.url("/predict-disease"))
            .json(query)
            .send()
            .await?;

        let payload: Value = read_json(response).await?;
        info!(
            "Prediction received in {:.3}s",
            start_time.elapsed().as_secs_f64()
        );
        debug!(%payload, "Prediction payload");
        Ok(payload)
    }

    #[instrument(skip(self, query), fields(city = query.city()))]
    async fn find_places(
        &self,
        kind: PlaceKind,
        query: &LocationQuery,
    ) -> Result<Vec<Place>, ApiError> {
        let url = format!("{}?city={}", self.url(kind.endpoint()), query.encoded());
        let response = self.client.get(url).send().await?;

        let body: PlaceResults = read_json(response).await?;
        info!(
            "Found {} results at {} for '{}'",
            body.results.len(),
            kind.endpoint(),
            query.city()
        );
        Ok(body.results)
    }

    #[instrument(skip(self, query), fields(disease = %query.disease))]
    async fn precautions(&self, query: &DiseaseQuery) -> Result<PrecautionsResponse, ApiError> {
        let response = self
            .client
            .post(self.url("/precautions"))
            .json(query)
            .send()
            .await?;

        let body: PrecautionsResponse = read_json(response).await?;
        debug!(
            "Precautions received ({} chars)",
            body.precautions.as_deref().map_or(0, str::len)
        );
        Ok(body)
    }
}
