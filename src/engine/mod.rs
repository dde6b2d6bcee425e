//! Media engine seam for StreamView
//!
//! All demuxing, decoding, network transport and buffering are delegated to
//! an external media engine (GStreamer). This module defines the trait the
//! rest of the application talks to, the event and frame types the engine
//! publishes, and the `playbin`-based implementation.

mod gst_engine;
pub mod source;

pub use gst_engine::GstEngine;
pub use source::{MediaSource, SourceOptions};

use crate::utils::error::Result;
use crossbeam_channel::Receiver;
use std::time::Duration;

/// Playback state as reported by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// No media loaded
    Idle,

    /// Media set, waiting for the engine to preroll
    Opening,

    /// Network buffering in progress
    Buffering,

    /// Currently playing
    Playing,

    /// Playback paused
    Paused,

    /// Media loaded but not playing
    Stopped,

    /// End of media reached
    Ended,

    /// Error occurred
    Error,
}

/// A decoded video frame, tightly packed RGBA
#[derive(Debug, Clone)]
pub struct VideoFrame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// Classification of engine-reported errors, for display purposes only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineErrorKind {
    /// Could not reach the source: bad address, refused connection, missing file
    Connection,

    /// The source was reached but the stream cannot be played
    Stream,

    /// Anything else the engine reports
    Internal,
}

/// Notifications published by the engine's internal threads
///
/// These are drained by the UI-thread reconciliation tick; engine threads
/// never touch widgets directly.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// The pipeline changed playback state
    StateChanged(PlaybackState),

    /// Network buffering progress
    Buffering { percent: i32 },

    /// Preroll finished; stream metadata is now known
    PrerollDone {
        duration: Option<Duration>,
        seekable: bool,
        live: bool,
    },

    /// End of the media was reached
    EndOfStream,

    /// Non-fatal engine warning
    Warning { message: String },

    /// Fatal engine error, classified for display
    Error {
        kind: EngineErrorKind,
        message: String,
    },
}

/// Interface to the external media engine
///
/// Every operation is a direct mapping onto the engine's client API; the
/// implementation holds no media logic of its own. `MockEngine` in the
/// integration tests implements this trait to exercise the controller
/// without a running pipeline.
pub trait MediaEngine: Send {
    /// Point the engine at a new source and preroll it
    ///
    /// # Arguments
    ///
    /// * `source` - Classified local path or network address
    /// * `options` - Per-source options (RTSP transport, buffering duration)
    fn open(&mut self, source: &MediaSource, options: &SourceOptions) -> Result<()>;

    /// Start or resume playback
    fn play(&mut self) -> Result<()>;

    /// Pause playback
    fn pause(&mut self) -> Result<()>;

    /// Stop playback and return to the start of the media
    fn stop(&mut self) -> Result<()>;

    /// Seek to an absolute position
    fn seek(&mut self, position: Duration) -> Result<()>;

    /// Current engine-reported playback state
    fn playback_state(&self) -> PlaybackState;

    /// Current playback position, if the engine knows it
    fn position(&self) -> Option<Duration>;

    /// Total duration; `None` until known, and always `None` for live streams
    fn duration(&self) -> Option<Duration>;

    /// Whether the source prerolled as a live stream
    fn is_live(&self) -> bool;

    /// Whether the source supports seeking
    fn is_seekable(&self) -> bool;

    /// Set volume (0.0 to 1.0)
    fn set_volume(&mut self, volume: f64) -> Result<()>;

    /// Mute or unmute audio
    fn set_muted(&mut self, muted: bool) -> Result<()>;

    /// Grab the current video frame as RGBA
    fn snapshot(&self) -> Result<VideoFrame>;

    /// Event feed from the engine's internal threads
    fn events(&self) -> &Receiver<EngineEvent>;
}
