//! GStreamer-backed media engine for StreamView
//!
//! One `playbin` pipeline does everything: demux, decode, audio output,
//! network transport, buffering. Video leaves the pipeline through an
//! RGBA-capped appsink and is published to the UI over a watch channel; bus
//! messages are translated into `EngineEvent`s on a crossbeam channel by a
//! dedicated bus thread. Nothing in here touches widgets.

use crate::engine::{
    EngineErrorKind, EngineEvent, MediaEngine, MediaSource, PlaybackState, SourceOptions,
    VideoFrame,
};
use crate::utils::error::{Result, StreamViewError};

use crossbeam_channel::{Receiver, Sender};
use gstreamer as gst;
use gstreamer::prelude::*;
use gstreamer_app as gst_app;
use gstreamer_video as gst_video;
use log::{debug, info, warn};
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tokio::sync::watch;

static GST_INIT: OnceCell<std::result::Result<(), String>> = OnceCell::new();

/// Initialize the GStreamer library exactly once per process
fn ensure_gst_init() -> Result<()> {
    GST_INIT
        .get_or_init(|| gst::init().map_err(|e| e.to_string()))
        .clone()
        .map_err(|e| StreamViewError::Engine(format!("GStreamer init failed: {}", e)))
}

/// Flags the bus thread and the engine both observe
#[derive(Default)]
struct EngineFlags {
    has_media: AtomicBool,
    prerolled: AtomicBool,
    ended: AtomicBool,
    errored: AtomicBool,
    buffering: AtomicBool,
    live: AtomicBool,
    seekable: AtomicBool,
}

impl EngineFlags {
    /// Reset everything except `has_media` for a fresh open
    fn reset_for_open(&self) {
        self.prerolled.store(false, Ordering::SeqCst);
        self.ended.store(false, Ordering::SeqCst);
        self.errored.store(false, Ordering::SeqCst);
        self.buffering.store(false, Ordering::SeqCst);
        self.live.store(false, Ordering::SeqCst);
        self.seekable.store(false, Ordering::SeqCst);
    }
}

/// `playbin`-based implementation of [`MediaEngine`]
pub struct GstEngine {
    playbin: gst::Element,
    flags: Arc<EngineFlags>,
    options: Arc<Mutex<SourceOptions>>,
    events_rx: Receiver<EngineEvent>,
    frame_tx: Arc<watch::Sender<Option<VideoFrame>>>,
    bus_thread: Option<thread::JoinHandle<()>>,
}

impl GstEngine {
    /// Build the pipeline and start the bus thread
    ///
    /// # Arguments
    ///
    /// * `frame_tx` - Watch channel the UI reads decoded frames from
    pub fn new(frame_tx: watch::Sender<Option<VideoFrame>>) -> Result<Self> {
        ensure_gst_init()?;

        let playbin = gst::ElementFactory::make("playbin")
            .name("streamview-playbin")
            .build()?;

        let frame_tx = Arc::new(frame_tx);

        // RGBA-capped appsink: the engine converts, we only copy out rows
        let appsink = gst_app::AppSink::builder()
            .name("streamview-videosink")
            .caps(
                &gst_video::VideoCapsBuilder::new()
                    .format(gst_video::VideoFormat::Rgba)
                    .build(),
            )
            .max_buffers(2)
            .drop(true)
            .build();

        let sample_tx = Arc::clone(&frame_tx);
        appsink.set_callbacks(
            gst_app::AppSinkCallbacks::builder()
                .new_sample(move |sink| {
                    let sample = sink.pull_sample().map_err(|_| gst::FlowError::Eos)?;
                    if let Some(frame) = frame_from_sample(&sample) {
                        let _ = sample_tx.send(Some(frame));
                    }
                    Ok(gst::FlowSuccess::Ok)
                })
                .build(),
        );

        playbin.set_property("video-sink", &appsink);

        // RTSP sources get their transport options through source-setup;
        // the handler runs on a streaming thread, hence the shared options.
        let options = Arc::new(Mutex::new(SourceOptions::default()));
        let setup_options = Arc::clone(&options);
        playbin.connect("source-setup", false, move |args| {
            let Ok(source) = args[1].get::<gst::Element>() else {
                return None;
            };
            let is_rtsp = source
                .factory()
                .is_some_and(|f| f.name() == "rtspsrc");
            if is_rtsp {
                let options = setup_options.lock();
                if options.force_tcp {
                    source.set_property_from_str("protocols", "tcp");
                }
                source.set_property("latency", options.network_caching.as_millis() as u32);
                debug!(
                    "Applied RTSP options: tcp={}, latency={}ms",
                    options.force_tcp,
                    options.network_caching.as_millis()
                );
            }
            None
        });

        let flags = Arc::new(EngineFlags::default());
        let (events_tx, events_rx) = crossbeam_channel::unbounded();

        let bus = playbin
            .bus()
            .ok_or_else(|| StreamViewError::Engine("pipeline has no bus".to_string()))?;
        let bus_thread = spawn_bus_thread(bus, playbin.clone(), Arc::clone(&flags), events_tx);

        Ok(Self {
            playbin,
            flags,
            options,
            events_rx,
            frame_tx,
            bus_thread: Some(bus_thread),
        })
    }
}

impl MediaEngine for GstEngine {
    fn open(&mut self, source: &MediaSource, options: &SourceOptions) -> Result<()> {
        let uri = source.uri()?;
        info!("Opening {}", uri);

        // Tear down whatever was playing before pointing at the new source
        self.playbin.set_state(gst::State::Null)?;
        self.flags.reset_for_open();
        self.flags.has_media.store(true, Ordering::SeqCst);
        let _ = self.frame_tx.send(None);

        *self.options.lock() = options.clone();
        self.playbin.set_property("uri", uri.as_str());

        if source.is_network() && !source.is_rtsp() {
            // Non-RTSP network sources buffer through playbin itself
            self.playbin.set_property(
                "buffer-duration",
                options.network_caching.as_nanos() as i64,
            );
        }

        // Preroll paused; a NoPreroll result marks the source live
        match self.playbin.set_state(gst::State::Paused)? {
            gst::StateChangeSuccess::NoPreroll => {
                self.flags.live.store(true, Ordering::SeqCst);
                info!("Source prerolled live, seeking disabled");
            }
            other => debug!("Preroll state change: {:?}", other),
        }

        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        if self.flags.ended.load(Ordering::SeqCst) && self.is_seekable() {
            // Replay from the start after end-of-stream
            self.seek(Duration::ZERO)?;
        }
        self.flags.ended.store(false, Ordering::SeqCst);

        if let gst::StateChangeSuccess::NoPreroll = self.playbin.set_state(gst::State::Playing)? {
            self.flags.live.store(true, Ordering::SeqCst);
        }
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        self.playbin.set_state(gst::State::Paused)?;
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        // Ready keeps the URI so a later play() re-prerolls the same source
        self.playbin.set_state(gst::State::Ready)?;
        self.flags.prerolled.store(false, Ordering::SeqCst);
        self.flags.ended.store(false, Ordering::SeqCst);
        self.flags.buffering.store(false, Ordering::SeqCst);
        let _ = self.frame_tx.send(None);
        Ok(())
    }

    fn seek(&mut self, position: Duration) -> Result<()> {
        debug!("Seeking to {:?}", position);
        self.playbin.seek_simple(
            gst::SeekFlags::FLUSH | gst::SeekFlags::KEY_UNIT,
            gst::ClockTime::from_nseconds(position.as_nanos() as u64),
        )?;
        self.flags.ended.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn playback_state(&self) -> PlaybackState {
        if !self.flags.has_media.load(Ordering::SeqCst) {
            return PlaybackState::Idle;
        }
        if self.flags.errored.load(Ordering::SeqCst) {
            return PlaybackState::Error;
        }
        if self.flags.ended.load(Ordering::SeqCst) {
            return PlaybackState::Ended;
        }
        if self.flags.buffering.load(Ordering::SeqCst) {
            return PlaybackState::Buffering;
        }

        let (_, current, _) = self.playbin.state(gst::ClockTime::ZERO);
        match current {
            gst::State::Playing => PlaybackState::Playing,
            gst::State::Paused => {
                if self.flags.prerolled.load(Ordering::SeqCst) {
                    PlaybackState::Paused
                } else {
                    PlaybackState::Opening
                }
            }
            _ => PlaybackState::Stopped,
        }
    }

    fn position(&self) -> Option<Duration> {
        self.playbin
            .query_position::<gst::ClockTime>()
            .map(|t| Duration::from_nanos(t.nseconds()))
    }

    fn duration(&self) -> Option<Duration> {
        if self.flags.live.load(Ordering::SeqCst) {
            return None;
        }
        self.playbin
            .query_duration::<gst::ClockTime>()
            .map(|t| Duration::from_nanos(t.nseconds()))
    }

    fn is_live(&self) -> bool {
        self.flags.live.load(Ordering::SeqCst)
    }

    fn is_seekable(&self) -> bool {
        self.flags.seekable.load(Ordering::SeqCst) && !self.is_live()
    }

    fn set_volume(&mut self, volume: f64) -> Result<()> {
        self.playbin.set_property("volume", volume.clamp(0.0, 1.0));
        Ok(())
    }

    fn set_muted(&mut self, muted: bool) -> Result<()> {
        self.playbin.set_property("mute", muted);
        Ok(())
    }

    fn snapshot(&self) -> Result<VideoFrame> {
        let caps = gst_video::VideoCapsBuilder::new()
            .format(gst_video::VideoFormat::Rgba)
            .build();
        let sample = self
            .playbin
            .emit_by_name::<Option<gst::Sample>>("convert-sample", &[&caps])
            .ok_or_else(|| {
                StreamViewError::Snapshot("engine returned no frame to capture".to_string())
            })?;
        frame_from_sample(&sample)
            .ok_or_else(|| StreamViewError::Snapshot("could not map captured frame".to_string()))
    }

    fn events(&self) -> &Receiver<EngineEvent> {
        &self.events_rx
    }
}

impl Drop for GstEngine {
    fn drop(&mut self) {
        let _ = self.playbin.set_state(gst::State::Null);
        if let Some(bus) = self.playbin.bus() {
            let _ = bus.post(gst::message::Application::new(gst::Structure::new_empty(
                "streamview-shutdown",
            )));
        }
        if let Some(handle) = self.bus_thread.take() {
            let _ = handle.join();
        }
    }
}

/// Translate bus messages into engine events until shutdown
fn spawn_bus_thread(
    bus: gst::Bus,
    playbin: gst::Element,
    flags: Arc<EngineFlags>,
    events: Sender<EngineEvent>,
) -> thread::JoinHandle<()> {
    thread::Builder::new()
        .name("streamview-bus".to_string())
        .spawn(move || {
            for msg in bus.iter_timed(gst::ClockTime::NONE) {
                match msg.view() {
                    gst::MessageView::Eos(..) => {
                        flags.ended.store(true, Ordering::SeqCst);
                        let _ = events.send(EngineEvent::EndOfStream);
                    }
                    gst::MessageView::Error(err) => {
                        let kind = classify_error(&err.error());
                        let message = err.error().to_string();
                        warn!("Engine error ({:?}): {} {:?}", kind, message, err.debug());
                        flags.errored.store(true, Ordering::SeqCst);
                        let _ = events.send(EngineEvent::Error { kind, message });
                    }
                    gst::MessageView::Warning(w) => {
                        let message = w.error().to_string();
                        warn!("Engine warning: {}", message);
                        let _ = events.send(EngineEvent::Warning { message });
                    }
                    gst::MessageView::Buffering(b) => {
                        let percent = b.percent();
                        flags.buffering.store(percent < 100, Ordering::SeqCst);
                        let _ = events.send(EngineEvent::Buffering { percent });
                    }
                    gst::MessageView::AsyncDone(..) => {
                        flags.prerolled.store(true, Ordering::SeqCst);

                        let mut seeking = gst::query::Seeking::new(gst::Format::Time);
                        if playbin.query(&mut seeking) {
                            let (seekable, _, _) = seeking.result();
                            flags.seekable.store(seekable, Ordering::SeqCst);
                        }

                        let live = flags.live.load(Ordering::SeqCst);
                        let duration = if live {
                            None
                        } else {
                            playbin
                                .query_duration::<gst::ClockTime>()
                                .map(|t| Duration::from_nanos(t.nseconds()))
                        };
                        let _ = events.send(EngineEvent::PrerollDone {
                            duration,
                            seekable: flags.seekable.load(Ordering::SeqCst),
                            live,
                        });
                    }
                    gst::MessageView::StateChanged(sc) => {
                        let from_pipeline =
                            sc.src().map(|s| s == &playbin).unwrap_or(false);
                        if from_pipeline && sc.old() != sc.current() {
                            let state = match sc.current() {
                                gst::State::Playing => Some(PlaybackState::Playing),
                                gst::State::Paused => Some(PlaybackState::Paused),
                                gst::State::Ready | gst::State::Null => {
                                    Some(PlaybackState::Stopped)
                                }
                                _ => None,
                            };
                            if let Some(state) = state {
                                let _ = events.send(EngineEvent::StateChanged(state));
                            }
                        }
                    }
                    gst::MessageView::Application(app) => {
                        if app
                            .structure()
                            .map(|s| s.name() == "streamview-shutdown")
                            .unwrap_or(false)
                        {
                            break;
                        }
                    }
                    _ => {}
                }
            }
            debug!("Bus thread exited");
        })
        .expect("failed to spawn bus thread")
}

/// Classify a bus error for display: address problems vs broken streams vs
/// everything else
fn classify_error(error: &gst::glib::Error) -> EngineErrorKind {
    if error.is::<gst::ResourceError>() {
        EngineErrorKind::Connection
    } else if error.is::<gst::StreamError>() {
        EngineErrorKind::Stream
    } else {
        EngineErrorKind::Internal
    }
}

/// Copy an RGBA sample into a tightly packed frame, honoring row stride
fn frame_from_sample(sample: &gst::Sample) -> Option<VideoFrame> {
    let caps = sample.caps()?;
    let info = gst_video::VideoInfo::from_caps(caps).ok()?;
    let buffer = sample.buffer()?;
    let frame = gst_video::VideoFrameRef::from_buffer_ref_readable(buffer, &info).ok()?;

    let width = info.width() as usize;
    let height = info.height() as usize;
    let stride = frame.plane_stride()[0] as usize;
    let data = frame.plane_data(0).ok()?;

    let row_bytes = width * 4;
    let mut rgba = Vec::with_capacity(row_bytes * height);
    for row in data.chunks(stride).take(height) {
        rgba.extend_from_slice(row.get(..row_bytes)?);
    }

    Some(VideoFrame {
        width: width as u32,
        height: height as u32,
        data: rgba,
    })
}
