//! Wire models for the xrit-rx receiver API.
//!
//! Every feed is a small JSON document polled read-only. The progress and
//! partial feeds are JSON objects whose key order is the order the receiver
//! reports products in; that order is presentation order, so the mapping
//! feeds deserialise through `serde_json::Map` (insertion-ordered) and are
//! converted into ordered `Vec<(key, value)>` pairs.

use serde::Deserialize;
use serde_json::Value;

/// Receiver configuration, fetched once from `GET /api` at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct ReceiverConfig {
    pub spacecraft: String,
    pub downlink: String,
    /// Poll period in seconds.
    pub interval: u64,
    /// False when the receiver has no decryption key and writes no images.
    #[serde(default = "default_images")]
    pub images: bool,
    #[serde(default)]
    pub vcid_blacklist: Vec<u8>,
    #[serde(default)]
    pub version: String,
}

fn default_images() -> bool {
    true
}

/// `GET /api/current/vcid` — the VCID the demuxer is currently locked to.
/// Null before the first frame arrives.
#[derive(Debug, Clone, Deserialize)]
pub struct VcidResponse {
    pub vcid: Option<u8>,
}

/// `GET /api/latest/image` — path of the most recent completed image,
/// relative to the receiver's output root.
#[derive(Debug, Clone, Deserialize)]
pub struct LatestImageResponse {
    pub image: Option<String>,
}

/// Per-channel segment bookkeeping inside a download in progress.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChannelProgress {
    pub segment_count: u32,
    #[serde(default)]
    pub segments: Vec<u32>,
}

/// One product currently being assembled by the demuxer.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadProgress {
    pub product_type: String,
    pub product_name: String,
    pub segments_received: u32,
    pub total_segments: u32,
    /// Raw percentage as reported; may exceed 100 when the segment count
    /// estimate was low. Clamping is a presentation concern.
    pub progress_percent: f64,
    /// Channel id → progress, in upstream order.
    pub channels: Vec<(String, ChannelProgress)>,
}

#[derive(Debug, Deserialize)]
struct WireDownload {
    product_type: String,
    product_name: String,
    segments_received: u32,
    total_segments: u32,
    progress_percent: f64,
    #[serde(default)]
    channels: serde_json::Map<String, Value>,
}

impl WireDownload {
    fn into_progress(self) -> serde_json::Result<DownloadProgress> {
        let channels = self
            .channels
            .into_iter()
            .map(|(id, v)| Ok((id, serde_json::from_value(v)?)))
            .collect::<serde_json::Result<Vec<_>>>()?;
        Ok(DownloadProgress {
            product_type: self.product_type,
            product_name: self.product_name,
            segments_received: self.segments_received,
            total_segments: self.total_segments,
            progress_percent: self.progress_percent,
            channels,
        })
    }
}

/// `GET /api/current/progress` — all products currently downloading.
#[derive(Debug, Deserialize)]
pub struct ProgressResponse {
    #[serde(default)]
    pub active_downloads: serde_json::Map<String, Value>,
}

impl ProgressResponse {
    /// Typed downloads in upstream key order.
    pub fn into_downloads(self) -> serde_json::Result<Vec<(String, DownloadProgress)>> {
        self.active_downloads
            .into_iter()
            .map(|(key, v)| {
                let wire: WireDownload = serde_json::from_value(v)?;
                Ok((key, wire.into_progress()?))
            })
            .collect()
    }
}

/// An in-progress product that already has a displayable preview file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PartialImageInfo {
    /// Empty when no preview has been written yet.
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub segments: u32,
    #[serde(default)]
    pub total_segments: u32,
}

impl PartialImageInfo {
    /// A partial is displayable once the receiver has written a preview file.
    pub fn is_displayable(&self) -> bool {
        !self.path.is_empty()
    }
}

/// `GET /api/current/partial` — preview images per product type.
#[derive(Debug, Deserialize)]
pub struct PartialResponse {
    #[serde(default)]
    pub partial_images: serde_json::Map<String, Value>,
}

impl PartialResponse {
    /// Typed partials in upstream key order.
    pub fn into_partials(self) -> serde_json::Result<Vec<(String, PartialImageInfo)>> {
        self.partial_images
            .into_iter()
            .map(|(ty, v)| Ok((ty, serde_json::from_value(v)?)))
            .collect()
    }
}

/// Response from the DOP schedule provider: raw document lines.
#[derive(Debug, Deserialize)]
pub struct ScheduleResponse {
    #[serde(default)]
    pub data: Vec<String>,
}
