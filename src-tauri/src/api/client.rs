//! HTTP client for the image-processing service.

use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::{info, warn};
use url::Url;

use crate::api::types::{ImagePayload, JobRecord, ProcessingSummary, StartResponse};
use crate::error::SightlineError;

const USER_AGENT: &str = "Sightline/0.1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Which rendition of a job's image to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Original,
    Processed,
}

impl ImageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageKind::Original => "original",
            ImageKind::Processed => "processed",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, SightlineError> {
        match raw {
            "original" => Ok(ImageKind::Original),
            "processed" => Ok(ImageKind::Processed),
            other => Err(SightlineError::Api(format!(
                "unknown image kind '{}', expected 'original' or 'processed'",
                other
            ))),
        }
    }
}

/// Thin client over the service's REST endpoints.
///
/// One request timeout, no retries: a failed poll surfaces as a single
/// error string and the caller stops polling.
pub struct ApiClient {
    client: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, SightlineError> {
        // A trailing slash matters to Url::join; without it the last path
        // segment of the base would be replaced instead of appended to.
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let base_url = Url::parse(&normalized).map_err(|e| {
            SightlineError::Config(format!("invalid backend URL '{}': {}", normalized, e))
        })?;

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| SightlineError::Api(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// `GET /processing-summary/`
    pub async fn processing_summary(&self) -> Result<ProcessingSummary, SightlineError> {
        self.get_json(self.endpoint("processing-summary/")?).await
    }

    /// `GET /jobs/?limit=N`, sorted by id ascending for stable table rows.
    pub async fn jobs(&self, limit: u32) -> Result<Vec<JobRecord>, SightlineError> {
        let mut url = self.endpoint("jobs/")?;
        url.query_pairs_mut().append_pair("limit", &limit.to_string());
        let mut jobs: Vec<JobRecord> = self.get_json(url).await?;
        jobs.sort_by_key(|job| job.id);
        Ok(jobs)
    }

    /// `POST /start-processing/`
    pub async fn start_processing(&self) -> Result<StartResponse, SightlineError> {
        let url = self.endpoint("start-processing/")?;
        info!("POST {}", url);
        let response = self
            .client
            .post(url.clone())
            .send()
            .await
            .map_err(|e| SightlineError::Api(format!("request to '{}' failed: {}", url, e)))?;
        Self::decode_response(url, response).await
    }

    /// `GET /image/{id}?type=original|processed`
    pub async fn job_image(
        &self,
        job_db_id: i64,
        kind: ImageKind,
    ) -> Result<ImagePayload, SightlineError> {
        let mut url = self.endpoint(&format!("image/{}", job_db_id))?;
        url.query_pairs_mut().append_pair("type", kind.as_str());
        self.get_json(url).await
    }

    fn endpoint(&self, path: &str) -> Result<Url, SightlineError> {
        self.base_url
            .join(path)
            .map_err(|e| SightlineError::Api(format!("invalid endpoint path '{}': {}", path, e)))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, SightlineError> {
        info!("GET {}", url);
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| SightlineError::Api(format!("request to '{}' failed: {}", url, e)))?;
        Self::decode_response(url, response).await
    }

    async fn decode_response<T: DeserializeOwned>(
        url: Url,
        response: reqwest::Response,
    ) -> Result<T, SightlineError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("HTTP {} from {}: {}", status.as_u16(), url, body);
            return Err(match extract_detail(&body) {
                Some(detail) => SightlineError::Backend(detail),
                None => SightlineError::Api(format!(
                    "HTTP {} {} from '{}'",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("Unknown"),
                    url
                )),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| SightlineError::Api(format!("malformed response from '{}': {}", url, e)))
    }
}

/// Pull the human-readable `detail` field out of a FastAPI error body.
fn extract_detail(body: &str) -> Option<String> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()?
        .get("detail")?
        .as_str()
        .map(|s| s.to_string())
}
