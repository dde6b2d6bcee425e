//! Integration test utilities for StreamView
//!
//! This module provides common utilities for integration testing including:
//! - A scriptable mock media engine
//! - Test fixtures for local media files
//! - Config builders pointing at temporary directories

use anyhow::Result;
use crossbeam_channel::{Receiver, Sender};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

use streamview::engine::{
    EngineEvent, MediaEngine, MediaSource, PlaybackState, SourceOptions, VideoFrame,
};
use streamview::utils::config::Config;
use streamview::utils::error::StreamViewError;

/// Test fixture holding temporary media files
pub struct TestFixture {
    pub temp_dir: TempDir,
    pub media_file: PathBuf,
}

impl TestFixture {
    /// Create a temp directory with a placeholder media file in it
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let media_file = temp_dir.path().join("clip.mp4");
        std::fs::write(&media_file, b"placeholder media payload")?;
        Ok(Self {
            temp_dir,
            media_file,
        })
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// A config whose snapshot directory points inside the fixture
    pub fn config(&self) -> Config {
        let mut config = Config::default();
        config.snapshot.directory = Some(self.path().join("snapshots"));
        config
    }
}

/// What the mock engine currently "reports", plus what it has recorded
#[derive(Default)]
pub struct MockState {
    pub state: Option<PlaybackState>,
    pub position: Option<Duration>,
    pub duration: Option<Duration>,
    pub live: bool,
    pub seekable: bool,
    pub volume: f64,
    pub muted: bool,
    pub opened: Vec<(MediaSource, SourceOptions)>,
    pub seeks: Vec<Duration>,
    pub snapshot_frame: Option<VideoFrame>,
}

/// Handle the test keeps after the engine is boxed into the controller
///
/// Mutating the shared state simulates what the engine would report on the
/// next poll; `send_event` simulates a bus notification.
#[derive(Clone)]
pub struct MockHandle {
    shared: Arc<Mutex<MockState>>,
    events_tx: Sender<EngineEvent>,
}

impl MockHandle {
    pub fn with_state<R>(&self, f: impl FnOnce(&mut MockState) -> R) -> R {
        f(&mut self.shared.lock().unwrap())
    }

    pub fn send_event(&self, event: EngineEvent) {
        self.events_tx.send(event).unwrap();
    }

    pub fn report_state(&self, state: PlaybackState) {
        self.with_state(|s| s.state = Some(state));
    }

    pub fn report_position(&self, position: Duration) {
        self.with_state(|s| s.position = Some(position));
    }

    pub fn opened(&self) -> Vec<(MediaSource, SourceOptions)> {
        self.with_state(|s| s.opened.clone())
    }

    pub fn seeks(&self) -> Vec<Duration> {
        self.with_state(|s| s.seeks.clone())
    }
}

/// Scriptable in-memory engine for exercising the controller
pub struct MockEngine {
    shared: Arc<Mutex<MockState>>,
    events_tx: Sender<EngineEvent>,
    events_rx: Receiver<EngineEvent>,
}

impl MockEngine {
    pub fn new() -> (Self, MockHandle) {
        let (events_tx, events_rx) = crossbeam_channel::unbounded();
        let shared = Arc::new(Mutex::new(MockState {
            volume: 0.7,
            ..MockState::default()
        }));
        let handle = MockHandle {
            shared: Arc::clone(&shared),
            events_tx: events_tx.clone(),
        };
        (
            Self {
                shared,
                events_tx,
                events_rx,
            },
            handle,
        )
    }

    /// A mock that reports a seekable 100-second file, as if prerolled
    pub fn seekable_file() -> (Self, MockHandle) {
        let (engine, handle) = Self::new();
        handle.with_state(|s| {
            s.state = Some(PlaybackState::Paused);
            s.position = Some(Duration::ZERO);
            s.duration = Some(Duration::from_secs(100));
            s.seekable = true;
        });
        (engine, handle)
    }

    /// A mock that reports a live RTSP stream: no duration, not seekable
    pub fn live_stream() -> (Self, MockHandle) {
        let (engine, handle) = Self::new();
        handle.with_state(|s| {
            s.state = Some(PlaybackState::Playing);
            s.position = Some(Duration::from_secs(5));
            s.live = true;
        });
        (engine, handle)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.shared.lock().unwrap()
    }
}

impl MediaEngine for MockEngine {
    fn open(
        &mut self,
        source: &MediaSource,
        options: &SourceOptions,
    ) -> streamview::utils::error::Result<()> {
        let mut state = self.lock();
        state.opened.push((source.clone(), options.clone()));
        if state.state.is_none() {
            state.state = Some(PlaybackState::Opening);
        }
        Ok(())
    }

    fn play(&mut self) -> streamview::utils::error::Result<()> {
        self.lock().state = Some(PlaybackState::Playing);
        let _ = self
            .events_tx
            .send(EngineEvent::StateChanged(PlaybackState::Playing));
        Ok(())
    }

    fn pause(&mut self) -> streamview::utils::error::Result<()> {
        self.lock().state = Some(PlaybackState::Paused);
        let _ = self
            .events_tx
            .send(EngineEvent::StateChanged(PlaybackState::Paused));
        Ok(())
    }

    fn stop(&mut self) -> streamview::utils::error::Result<()> {
        let mut state = self.lock();
        state.state = Some(PlaybackState::Stopped);
        state.position = Some(Duration::ZERO);
        Ok(())
    }

    fn seek(&mut self, position: Duration) -> streamview::utils::error::Result<()> {
        let mut state = self.lock();
        state.seeks.push(position);
        state.position = Some(position);
        Ok(())
    }

    fn playback_state(&self) -> PlaybackState {
        self.lock().state.unwrap_or(PlaybackState::Idle)
    }

    fn position(&self) -> Option<Duration> {
        self.lock().position
    }

    fn duration(&self) -> Option<Duration> {
        self.lock().duration
    }

    fn is_live(&self) -> bool {
        self.lock().live
    }

    fn is_seekable(&self) -> bool {
        let state = self.lock();
        state.seekable && !state.live
    }

    fn set_volume(&mut self, volume: f64) -> streamview::utils::error::Result<()> {
        self.lock().volume = volume;
        Ok(())
    }

    fn set_muted(&mut self, muted: bool) -> streamview::utils::error::Result<()> {
        self.lock().muted = muted;
        Ok(())
    }

    fn snapshot(&self) -> streamview::utils::error::Result<VideoFrame> {
        self.lock()
            .snapshot_frame
            .clone()
            .ok_or_else(|| StreamViewError::Snapshot("no frame available".to_string()))
    }

    fn events(&self) -> &Receiver<EngineEvent> {
        &self.events_rx
    }
}

/// A small solid-color RGBA frame for snapshot tests
pub fn test_frame(width: u32, height: u32) -> VideoFrame {
    let mut data = Vec::with_capacity((width * height * 4) as usize);
    for _ in 0..(width * height) {
        data.extend_from_slice(&[10, 200, 30, 255]);
    }
    VideoFrame {
        width,
        height,
        data,
    }
}
