//! UI module for StreamView
//!
//! The eframe/egui front-end: window layout, widget-to-controller wiring,
//! and the video texture surface. All engine interaction goes through
//! `PlayerController`; this module never talks to GStreamer directly.

mod app;
mod controls;
mod video_view;

pub use app::PlayerApp;
