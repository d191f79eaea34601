use std::time::Instant;

use async_trait::async_trait;
use http::Extensions;
use reqwest::{Request, Response};
use reqwest_middleware::{Middleware, Next, Result};
use tracing::{debug, warn};

/// Logs method, path, status and latency of every backend call
pub struct RequestLogging;

#[async_trait]
impl Middleware for RequestLogging {
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> Result<Response> {
        let method = req.method().clone();
        let path = req.url().path().to_string();
        let start = Instant::now();

        debug!(%method, %path, "Sending request");
        let result = next.run(req, extensions).await;
        let elapsed = start.elapsed().as_secs_f64();

        match &result {
            Ok(response) => debug!(
                %method,
                %path,
                status = response.status().as_u16(),
                "Response in {elapsed:.3}s"
            ),
            Err(e) => warn!(%method, %path, "Request failed after {elapsed:.3}s: {e}"),
        }

        result
    }
}
