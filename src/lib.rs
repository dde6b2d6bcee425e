//! StreamView - a desktop player for RTSP streams and local media files
//!
//! All media handling (demuxing, decoding, rendering, network transport,
//! buffering) is delegated to GStreamer. This crate contributes the UI, the
//! engine seam, and the state reconciliation that keeps the widgets in sync
//! with what the engine reports.

pub mod engine;
pub mod player;
pub mod ui;
pub mod utils;
