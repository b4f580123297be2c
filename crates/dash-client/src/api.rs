//! Receiver API client.
//!
//! One async function per feed, all sharing a single `reqwest::Client`.
//! Every function returns `Result<_, FeedError>`; the caller decides what
//! staleness policy to apply (the poll loop keeps the previous value).

use dash_proto::api::{
    DownloadProgress, LatestImageResponse, PartialImageInfo, ProgressResponse, PartialResponse,
    ReceiverConfig, ScheduleResponse, VcidResponse,
};
use std::time::Duration;

use reqwest::Client;

use crate::error::FeedError;

/// Cap on any single request round trip. A receiver that stops responding
/// mid-connection must surface as a feed error, not an indefinite hang.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Thin wrapper binding a `reqwest::Client` to the receiver base URL.
#[derive(Debug, Clone)]
pub struct ReceiverApi {
    client: Client,
    base_url: String,
}

impl ReceiverApi {
    pub fn new(base_url: &str) -> Self {
        Self::with_timeout(base_url, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The underlying HTTP client, shared with the schedule fetch.
    pub fn client(&self) -> &Client {
        &self.client
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, FeedError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(FeedError::Status(response.status()));
        }
        Ok(response.json().await?)
    }

    /// `GET /api` — fetched once at startup.
    pub async fn fetch_config(&self) -> Result<ReceiverConfig, FeedError> {
        self.get_json("/api").await
    }

    /// `GET /api/current/vcid`.
    pub async fn fetch_vcid(&self) -> Result<Option<u8>, FeedError> {
        let r: VcidResponse = self.get_json("/api/current/vcid").await?;
        Ok(r.vcid)
    }

    /// `GET /api/latest/image`.
    pub async fn fetch_latest_image(&self) -> Result<Option<String>, FeedError> {
        let r: LatestImageResponse = self.get_json("/api/latest/image").await?;
        Ok(r.image)
    }

    /// `GET /api/current/progress`, flattened to upstream key order.
    pub async fn fetch_progress(&self) -> Result<Vec<(String, DownloadProgress)>, FeedError> {
        let r: ProgressResponse = self.get_json("/api/current/progress").await?;
        Ok(r.into_downloads()?)
    }

    /// `GET /api/current/partial`, flattened to upstream key order.
    pub async fn fetch_partial(&self) -> Result<Vec<(String, PartialImageInfo)>, FeedError> {
        let r: PartialResponse = self.get_json("/api/current/partial").await?;
        Ok(r.into_partials()?)
    }
}

/// Fetch the raw DOP document for one UTC date from the schedule proxy.
///
/// Third-party endpoint; failure is non-fatal and leaves the schedule empty.
pub async fn fetch_schedule_lines(
    client: &Client,
    proxy_url: &str,
    date: &str,
    downlink: &str,
) -> Result<Vec<String>, FeedError> {
    let response = client
        .get(proxy_url)
        .query(&[("searchDate", date), ("searchType", downlink)])
        .send()
        .await?;
    if !response.status().is_success() {
        return Err(FeedError::Status(response.status()));
    }
    let r: ScheduleResponse = response.json().await?;
    Ok(r.data)
}
