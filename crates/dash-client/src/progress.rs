//! Download-progress aggregation for the Progress block.

use dash_proto::api::DownloadProgress;

/// Per-channel line under a product's progress bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSummary {
    pub channel_id: String,
    pub count: u32,
    pub segments: Vec<u32>,
}

/// One product's render summary.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductSummary {
    pub product_type: String,
    pub product_name: String,
    /// Clamped to [0, 100] for the bar fill.
    pub percent: f64,
    /// Raw upstream percentage for the numeric label; may exceed 100.
    pub raw_percent: f64,
    pub segments_received: u32,
    pub total_segments: u32,
    pub per_channel: Vec<ChannelSummary>,
}

/// Progress block contents.
///
/// `NoActiveDownloads` is an explicit state the block renders as such; it is
/// not the same as the feed never having been fetched (the caller skips
/// rendering entirely until the first progress payload lands).
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressView {
    NoActiveDownloads,
    Active(Vec<ProductSummary>),
}

impl ProgressView {
    /// Number of products downloading.
    pub fn count(&self) -> usize {
        match self {
            ProgressView::NoActiveDownloads => 0,
            ProgressView::Active(items) => items.len(),
        }
    }
}

/// Summarise the active-downloads feed, preserving upstream product and
/// channel order.
pub fn summarize(active_downloads: &[(String, DownloadProgress)]) -> ProgressView {
    if active_downloads.is_empty() {
        return ProgressView::NoActiveDownloads;
    }

    let items = active_downloads
        .iter()
        .map(|(_, p)| ProductSummary {
            product_type: p.product_type.clone(),
            product_name: p.product_name.clone(),
            percent: p.progress_percent.clamp(0.0, 100.0),
            raw_percent: p.progress_percent,
            segments_received: p.segments_received,
            total_segments: p.total_segments,
            per_channel: p
                .channels
                .iter()
                .map(|(id, ch)| ChannelSummary {
                    channel_id: id.clone(),
                    count: ch.segment_count,
                    segments: ch.segments.clone(),
                })
                .collect(),
        })
        .collect();

    ProgressView::Active(items)
}
