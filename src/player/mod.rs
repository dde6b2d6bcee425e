//! Player glue for StreamView
//!
//! This module owns the state the UI renders from and the controller that
//! forwards widget actions to the media engine. The interesting part is the
//! reconciliation tick: once per UI frame the controller drains engine
//! events and mirrors engine-reported position/duration/state into
//! `PlayerState`, honoring the seek-drag guard.

mod controller;
mod state;

pub use controller::PlayerController;
pub use state::{PlayerState, RecentInputs};

/// Severity of the status line, mapped to a color by the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    /// Neutral progress messages (connecting, stopped)
    Info,

    /// Playback is running
    Success,

    /// Buffering and other transient conditions
    Warning,

    /// Connection or runtime failures
    Error,
}

/// The one-line status readout under the controls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub text: String,
    pub level: StatusLevel,
}

impl StatusLine {
    pub fn new(text: impl Into<String>, level: StatusLevel) -> Self {
        Self {
            text: text.into(),
            level,
        }
    }
}

impl Default for StatusLine {
    fn default() -> Self {
        Self::new("Ready", StatusLevel::Info)
    }
}
