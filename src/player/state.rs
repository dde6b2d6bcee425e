//! UI-facing player state for StreamView
//!
//! `PlayerState` is the single structure the widgets render from. It only
//! ever reflects what the engine last reported; the application never
//! extrapolates position. The seek-drag guard lives here: while the user
//! holds the seek slider, engine position updates must not move it.

use crate::engine::{EngineErrorKind, EngineEvent, MediaSource, PlaybackState};
use crate::player::{StatusLevel, StatusLine};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Mirrored engine state plus the UI-only bits (drag guard, status line)
#[derive(Debug, Clone)]
pub struct PlayerState {
    /// Engine-reported playback state
    pub playback: PlaybackState,

    /// Last engine-reported position
    pub position: Duration,

    /// Total duration; `None` for live or not-yet-known streams
    pub duration: Option<Duration>,

    /// Whether the current source supports seeking
    pub seekable: bool,

    /// Whether the current source prerolled live
    pub live: bool,

    /// Volume the user has set (0.0 to 1.0)
    pub volume: f64,

    /// Mute flag
    pub muted: bool,

    /// Last reported buffering percentage
    pub buffer_percent: i32,

    /// True while the user is holding the seek slider
    pub seek_dragging: bool,

    /// Slider position while dragging, as a fraction of the duration
    pub drag_fraction: f64,

    /// Status readout
    pub status: StatusLine,

    /// Currently opened source, if any
    pub source: Option<MediaSource>,
}

impl PlayerState {
    pub fn new(volume: f64) -> Self {
        Self {
            playback: PlaybackState::Idle,
            position: Duration::ZERO,
            duration: None,
            seekable: false,
            live: false,
            volume: volume.clamp(0.0, 1.0),
            muted: false,
            buffer_percent: 0,
            seek_dragging: false,
            drag_fraction: 0.0,
            status: StatusLine::default(),
            source: None,
        }
    }

    /// Reset for a freshly opened source
    pub fn reset_for_open(&mut self, source: MediaSource) {
        self.playback = PlaybackState::Opening;
        self.position = Duration::ZERO;
        self.duration = None;
        self.seekable = false;
        self.live = false;
        self.buffer_percent = 0;
        self.seek_dragging = false;
        self.drag_fraction = 0.0;
        self.status = StatusLine::new("Connecting...", StatusLevel::Info);
        self.source = Some(source);
    }

    pub fn set_status(&mut self, text: impl Into<String>, level: StatusLevel) {
        self.status = StatusLine::new(text, level);
    }

    /// Fold one engine event into the state
    pub fn apply_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::StateChanged(state) => {
                debug!("Engine state changed: {:?}", state);
                match state {
                    PlaybackState::Playing => self.set_status("Playing", StatusLevel::Success),
                    PlaybackState::Paused => self.set_status("Paused", StatusLevel::Info),
                    PlaybackState::Stopped => self.set_status("Stopped", StatusLevel::Info),
                    _ => {}
                }
            }
            EngineEvent::Buffering { percent } => {
                self.buffer_percent = percent;
                if percent < 100 {
                    self.set_status(format!("Buffering... {}%", percent), StatusLevel::Warning);
                }
            }
            EngineEvent::PrerollDone {
                duration,
                seekable,
                live,
            } => {
                info!(
                    "Stream ready: duration={:?}, seekable={}, live={}",
                    duration, seekable, live
                );
                self.duration = duration;
                self.seekable = seekable;
                self.live = live;
            }
            EngineEvent::EndOfStream => {
                self.set_status("End of stream", StatusLevel::Info);
            }
            EngineEvent::Warning { message } => {
                self.set_status(message, StatusLevel::Warning);
            }
            EngineEvent::Error { kind, message } => {
                let text = match kind {
                    EngineErrorKind::Connection => {
                        "Error: could not connect to the stream or the address is invalid"
                            .to_string()
                    }
                    EngineErrorKind::Stream => {
                        "Error: the stream cannot be played (unsupported or corrupted)".to_string()
                    }
                    EngineErrorKind::Internal => format!("System error: {}", message),
                };
                self.set_status(text, StatusLevel::Error);
            }
        }
    }

    /// Mirror polled engine readings, honoring the seek-drag guard
    pub fn sync_polled(
        &mut self,
        playback: PlaybackState,
        position: Option<Duration>,
        duration: Option<Duration>,
        seekable: bool,
        live: bool,
    ) {
        self.playback = playback;
        self.duration = duration;
        self.seekable = seekable;
        self.live = live;

        if !self.seek_dragging {
            if let Some(position) = position {
                self.position = position;
            }
        }
    }

    /// Whether any source is loaded
    pub fn has_media(&self) -> bool {
        self.source.is_some()
    }

    /// Whether the seek slider should be enabled
    pub fn can_seek(&self) -> bool {
        self.has_media()
            && self.seekable
            && !self.live
            && self.duration.map(|d| !d.is_zero()).unwrap_or(false)
    }

    /// Label for the play/pause toggle, synced with the reported state
    pub fn play_toggle_label(&self) -> &'static str {
        match self.playback {
            PlaybackState::Playing | PlaybackState::Buffering => "\u{23F8} Pause",
            _ => "\u{25B6} Play",
        }
    }

    /// Slider position to display: the drag position while dragging,
    /// otherwise the mirrored engine position
    pub fn display_fraction(&self) -> f64 {
        if self.seek_dragging {
            return self.drag_fraction;
        }
        match self.duration {
            Some(duration) if !duration.is_zero() => {
                (self.position.as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0)
            }
            _ => 0.0,
        }
    }

    /// Convert a slider fraction into an absolute seek target
    pub fn fraction_to_position(&self, fraction: f64) -> Option<Duration> {
        let duration = self.duration?;
        if duration.is_zero() {
            return None;
        }
        Some(duration.mul_f64(fraction.clamp(0.0, 1.0)))
    }
}

/// Recently played inputs, persisted as JSON in the user config directory
///
/// Most recent first, deduplicated, bounded by the configured limit. Used to
/// prefill the address field on startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentInputs {
    entries: Vec<String>,
    #[serde(skip, default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    10
}

impl RecentInputs {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Record an input, moving it to the front if already present
    pub fn add(&mut self, input: &str) {
        let input = input.trim();
        if input.is_empty() {
            return;
        }
        self.entries.retain(|e| e != input);
        self.entries.insert(0, input.to_string());
        self.entries.truncate(self.limit);
    }

    /// Most recently played input
    pub fn most_recent(&self) -> Option<&str> {
        self.entries.first().map(String::as_str)
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Load from a JSON file, falling back to an empty list
    pub fn load_from(path: &Path, limit: usize) -> Self {
        let mut recents = std::fs::read_to_string(path)
            .ok()
            .and_then(|data| serde_json::from_str::<RecentInputs>(&data).ok())
            .unwrap_or_else(|| Self::new(limit));
        recents.limit = limit.max(1);
        recents.entries.truncate(recents.limit);
        recents
    }

    /// Persist to a JSON file, creating parent directories as needed
    pub fn save_to(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        if let Ok(data) = serde_json::to_string_pretty(self) {
            let _ = std::fs::write(path, data);
        }
    }

    /// Default persistence path under the user config directory
    pub fn default_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("streamview");
        path.push("recent.json");
        path
    }
}
