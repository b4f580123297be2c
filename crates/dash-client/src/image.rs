//! Image selection for the Latest Image block.
//!
//! An in-progress full-disk partial always wins over the last completed
//! image, so the operator sees the download assembling live even while the
//! latest-image feed still points at the previous product.

use dash_proto::api::ReceiverConfig;

use crate::snapshot::ViewSnapshot;

/// Endpoint serving the current full-disk partial preview.
const PARTIAL_FD_URL: &str = "/api/latest/fd/partial";
/// Extension of text products that must never be shown as an image.
const TEXT_EXT: &str = "txt";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    /// An FD product still assembling.
    Partial,
    /// The most recent completed image.
    Completed,
    /// Nothing to show; `caption` explains why.
    Empty,
}

/// What the Latest Image block should display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageDecision {
    pub kind: ImageKind,
    /// Receiver-relative URL to load, empty for [`ImageKind::Empty`].
    pub url: String,
    pub caption: String,
    /// Highlight the caption (partial images render emphasised).
    pub emphasised: bool,
}

impl ImageDecision {
    fn empty(caption: &str) -> Self {
        Self {
            kind: ImageKind::Empty,
            url: String::new(),
            caption: caption.to_string(),
            emphasised: false,
        }
    }
}

/// Decide what to display, by strict priority:
/// partial FD > completed non-text image > disabled notice > waiting notice.
///
/// Pure function of its inputs: an unchanged snapshot yields an identical
/// decision, and the renderer must only touch the image element when the URL
/// actually changed (in-flight loads survive unchanged ticks).
pub fn select(snapshot: &ViewSnapshot, config: &ReceiverConfig) -> ImageDecision {
    if let Some(partial) = snapshot.partial_for("FD") {
        if partial.is_displayable() {
            return ImageDecision {
                kind: ImageKind::Partial,
                url: PARTIAL_FD_URL.to_string(),
                caption: format!(
                    "{}_partial ({}/{} segments)",
                    partial.product_name, partial.segments, partial.total_segments
                ),
                emphasised: true,
            };
        }
    }

    if let Some(path) = snapshot.latest_image_path() {
        let fname = path.rsplit('/').next().unwrap_or(path);
        let (stem, ext) = match fname.rsplit_once('.') {
            Some((stem, ext)) => (stem, ext),
            None => (fname, ""),
        };
        if ext != TEXT_EXT {
            return ImageDecision {
                kind: ImageKind::Completed,
                url: format!("/api/{path}"),
                caption: stem.to_string(),
                emphasised: false,
            };
        }
    }

    if !config.images {
        return ImageDecision::empty("Image output is disabled in xrit-rx");
    }
    ImageDecision::empty("Waiting for image...")
}
