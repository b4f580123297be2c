//! ViewSnapshot — the one shared view model, written only by feed updates.
//!
//! Blocks read this for render decisions, but never mutate it. The poll loop
//! is the only writer, via [`ViewSnapshot::apply`].

use dash_proto::api::{DownloadProgress, PartialImageInfo};

/// One slice-replacing update from a successfully fetched feed.
///
/// The four feeds are independent time series with no cross-feed ordering or
/// consistency guarantee; applying them is commutative across feeds and
/// idempotent per feed.
#[derive(Debug, Clone)]
pub enum FeedUpdate {
    Vcid(Option<u8>),
    LatestImage(Option<String>),
    /// Product key → progress, upstream order. None until first fetched.
    Progress(Vec<(String, DownloadProgress)>),
    /// Product type → partial info, upstream order.
    Partial(Vec<(String, PartialImageInfo)>),
}

impl FeedUpdate {
    /// Short feed name for log lines.
    pub fn feed_name(&self) -> &'static str {
        match self {
            FeedUpdate::Vcid(_) => "vcid",
            FeedUpdate::LatestImage(_) => "latest_image",
            FeedUpdate::Progress(_) => "progress",
            FeedUpdate::Partial(_) => "partial",
        }
    }
}

/// The reconciled view of all feeds.
///
/// Each field is one feed's slice. A failed fetch never touches its slice, so
/// a slice is always either "not yet fetched" (None) or the last good value,
/// possibly one poll tick stale.
#[derive(Debug, Clone, Default)]
pub struct ViewSnapshot {
    /// VCID the demuxer is locked to; inner None = receiver reports no lock.
    pub current_vcid: Option<Option<u8>>,
    /// Path of the most recent completed image.
    pub latest_image: Option<Option<String>>,
    /// Active downloads in upstream order; None until the feed first lands.
    pub active_downloads: Option<Vec<(String, DownloadProgress)>>,
    /// Partial images per product type; None until the feed first lands.
    pub partial_images: Option<Vec<(String, PartialImageInfo)>>,
}

impl ViewSnapshot {
    /// Replace exactly the slice named by `update`; all others untouched.
    pub fn apply(&mut self, update: FeedUpdate) {
        match update {
            FeedUpdate::Vcid(v) => self.current_vcid = Some(v),
            FeedUpdate::LatestImage(path) => self.latest_image = Some(path),
            FeedUpdate::Progress(downloads) => self.active_downloads = Some(downloads),
            FeedUpdate::Partial(partials) => self.partial_images = Some(partials),
        }
    }

    /// Latest completed image path, if a fetch has landed and reported one.
    pub fn latest_image_path(&self) -> Option<&str> {
        self.latest_image.as_ref()?.as_deref()
    }

    /// Partial info for one product type (e.g. "FD").
    pub fn partial_for(&self, product_type: &str) -> Option<&PartialImageInfo> {
        self.partial_images
            .as_ref()?
            .iter()
            .find(|(ty, _)| ty == product_type)
            .map(|(_, info)| info)
    }
}
