//! Headless dashboard client for the xrit-rx satellite-downlink receiver.
//!
//! Polls the receiver's read-only HTTP API and the third-party DOP schedule
//! provider, reconciles the feeds into one [`snapshot::ViewSnapshot`], and
//! emits per-block [`blocks::RenderInstruction`]s for a presentation layer.

pub mod api;
pub mod blocks;
pub mod error;
pub mod image;
pub mod poller;
pub mod progress;
pub mod schedule;
pub mod snapshot;
