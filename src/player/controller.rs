//! Player controller for StreamView
//!
//! Forwards widget actions to the media engine and runs the per-frame
//! reconciliation tick that mirrors engine state back into `PlayerState`.
//! Also owns snapshot encoding, since the engine only hands back raw RGBA.

use crate::engine::{MediaEngine, MediaSource, PlaybackState, SourceOptions, VideoFrame};
use crate::player::{PlayerState, StatusLevel};
use crate::utils::config::{Config, SnapshotFormat};
use crate::utils::error::{Result, StreamViewError};
use log::{error, info};
use std::path::PathBuf;
use std::time::Duration;

/// Seek step for keyboard/relative seeks, in seconds
const SEEK_STEP_SECS: u64 = 10;

/// Volume step for keyboard adjustment
const VOLUME_STEP: f64 = 0.05;

pub struct PlayerController {
    engine: Box<dyn MediaEngine>,
    state: PlayerState,
    config: Config,
}

impl PlayerController {
    pub fn new(engine: Box<dyn MediaEngine>, config: Config) -> Self {
        let state = PlayerState::new(config.general.volume);
        Self {
            engine,
            state,
            config,
        }
    }

    /// Read access for the widgets
    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    /// Classify the address field contents and open the source
    ///
    /// On a classification failure the status line shows the address error
    /// and the engine is never touched.
    pub fn open_input(&mut self, input: &str) -> Result<()> {
        let source = match MediaSource::classify(input) {
            Ok(source) => source,
            Err(e) => {
                error!("Rejected input '{}': {}", input, e);
                self.state.set_status(
                    "Error: could not connect to the stream or the address is invalid",
                    StatusLevel::Error,
                );
                return Err(e);
            }
        };

        info!("Opening source: {}", source.display_name());
        let options = SourceOptions::from_config(&self.config.network);
        self.state.reset_for_open(source.clone());

        self.engine.open(&source, &options).map_err(|e| {
            self.state
                .set_status(format!("System error: {}", e), StatusLevel::Error);
            e
        })?;
        self.engine.set_volume(self.state.volume)?;
        self.engine.set_muted(self.state.muted)?;

        if self.config.general.auto_play {
            self.play()?;
        }

        Ok(())
    }

    pub fn play(&mut self) -> Result<()> {
        if !self.state.has_media() {
            return Err(StreamViewError::InvalidInput("no media loaded".to_string()));
        }
        self.engine.play()
    }

    pub fn pause(&mut self) -> Result<()> {
        if !self.state.has_media() {
            return Ok(());
        }
        self.engine.pause()
    }

    /// Toggle between playing and paused/stopped
    pub fn toggle_play(&mut self) -> Result<()> {
        match self.state.playback {
            PlaybackState::Playing | PlaybackState::Buffering => self.pause(),
            PlaybackState::Paused
            | PlaybackState::Stopped
            | PlaybackState::Ended
            | PlaybackState::Opening => self.play(),
            _ => Ok(()),
        }
    }

    pub fn stop(&mut self) -> Result<()> {
        if !self.state.has_media() {
            return Ok(());
        }
        self.engine.stop()?;
        self.state.position = Duration::ZERO;
        self.state.set_status("Stopped", StatusLevel::Info);
        Ok(())
    }

    /// The user grabbed the seek slider; freeze position mirroring
    pub fn begin_seek_drag(&mut self, fraction: f64) {
        self.state.seek_dragging = true;
        self.state.drag_fraction = fraction.clamp(0.0, 1.0);
    }

    /// The user moved the slider while holding it
    pub fn update_seek_drag(&mut self, fraction: f64) {
        if self.state.seek_dragging {
            self.state.drag_fraction = fraction.clamp(0.0, 1.0);
        }
    }

    /// The user released the slider; perform the seek and resume mirroring
    pub fn end_seek_drag(&mut self, fraction: f64) -> Result<()> {
        self.state.seek_dragging = false;
        self.seek_to_fraction(fraction)
    }

    /// Seek to a fraction of the total duration
    pub fn seek_to_fraction(&mut self, fraction: f64) -> Result<()> {
        let Some(target) = self.state.fraction_to_position(fraction) else {
            return Ok(());
        };
        if !self.state.can_seek() {
            return Ok(());
        }
        self.engine.seek(target)?;
        self.state.position = target;
        Ok(())
    }

    /// Seek forward or backward by the keyboard step
    pub fn seek_by(&mut self, steps: i64) -> Result<()> {
        if !self.state.can_seek() {
            return Ok(());
        }
        let delta = Duration::from_secs(SEEK_STEP_SECS * steps.unsigned_abs());
        let target = if steps >= 0 {
            let end = self.state.duration.unwrap_or(Duration::MAX);
            (self.state.position + delta).min(end)
        } else {
            self.state.position.saturating_sub(delta)
        };
        self.engine.seek(target)?;
        self.state.position = target;
        Ok(())
    }

    pub fn set_volume(&mut self, volume: f64) -> Result<()> {
        self.state.volume = volume.clamp(0.0, 1.0);
        self.engine.set_volume(self.state.volume)
    }

    /// Adjust volume by the keyboard step
    pub fn nudge_volume(&mut self, steps: i64) -> Result<()> {
        self.set_volume(self.state.volume + VOLUME_STEP * steps as f64)
    }

    pub fn toggle_mute(&mut self) -> Result<()> {
        self.state.muted = !self.state.muted;
        self.engine.set_muted(self.state.muted)
    }

    /// Grab the current frame and write it to the snapshot directory
    ///
    /// Returns the path of the written file.
    pub fn take_snapshot(&mut self) -> Result<PathBuf> {
        let frame = self.engine.snapshot().map_err(|e| {
            self.state
                .set_status(format!("Snapshot failed: {}", e), StatusLevel::Error);
            e
        })?;

        let dir = self.config.snapshot_dir();
        std::fs::create_dir_all(&dir)?;

        let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
        let path = dir.join(format!(
            "snapshot-{}.{}",
            stamp,
            self.config.snapshot.format.extension()
        ));

        write_snapshot(
            &frame,
            &path,
            self.config.snapshot.format,
            self.config.snapshot.quality,
        )
        .map_err(|e| {
            self.state
                .set_status(format!("Snapshot failed: {}", e), StatusLevel::Error);
            e
        })?;

        info!("Snapshot saved to {}", path.display());
        self.state.set_status(
            format!("Snapshot saved to {}", path.display()),
            StatusLevel::Success,
        );
        Ok(path)
    }

    /// The reconciliation tick, run once per UI frame
    ///
    /// Drains engine events into the state, then mirrors the polled
    /// position/duration/seekability readings (subject to the drag guard).
    pub fn tick(&mut self) {
        while let Ok(event) = self.engine.events().try_recv() {
            self.state.apply_event(event);
        }

        if !self.state.has_media() {
            return;
        }

        self.state.sync_polled(
            self.engine.playback_state(),
            self.engine.position(),
            self.engine.duration(),
            self.engine.is_seekable(),
            self.engine.is_live(),
        );
    }
}

/// Encode a raw RGBA frame to disk in the configured format
fn write_snapshot(
    frame: &VideoFrame,
    path: &std::path::Path,
    format: SnapshotFormat,
    quality: u8,
) -> Result<()> {
    let image = image::RgbaImage::from_raw(frame.width, frame.height, frame.data.clone())
        .ok_or_else(|| {
            StreamViewError::Snapshot("frame dimensions do not match frame data".to_string())
        })?;

    match format {
        SnapshotFormat::Png => image
            .save(path)
            .map_err(|e| StreamViewError::Snapshot(format!("PNG encoding failed: {}", e)))?,
        SnapshotFormat::Jpeg => {
            // JPEG has no alpha channel
            let rgb = image::DynamicImage::ImageRgba8(image).to_rgb8();
            let file = std::fs::File::create(path)?;
            let mut writer = std::io::BufWriter::new(file);
            let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut writer, quality);
            rgb.write_with_encoder(encoder)
                .map_err(|e| StreamViewError::Snapshot(format!("JPEG encoding failed: {}", e)))?;
        }
    }

    Ok(())
}
