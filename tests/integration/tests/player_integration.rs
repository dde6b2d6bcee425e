//! Controller-level integration tests
//!
//! These run the real `PlayerController` against the scriptable mock
//! engine, covering the UI-sync behaviors: seek-slider drag guard,
//! play/pause label sync, live-stream seek disabling, status
//! classification, and snapshot output.

use std::time::Duration;

use streamview::engine::{EngineErrorKind, EngineEvent, MediaSource, PlaybackState};
use streamview::player::{PlayerController, StatusLevel};
use streamview_integration_tests::{test_frame, MockEngine, TestFixture};

fn controller_with(
    engine: MockEngine,
    fixture: &TestFixture,
) -> PlayerController {
    PlayerController::new(Box::new(engine), fixture.config())
}

#[test]
fn open_local_file_passes_canonical_source_to_engine() {
    let fixture = TestFixture::new().unwrap();
    let (engine, handle) = MockEngine::new();
    let mut controller = controller_with(engine, &fixture);

    controller
        .open_input(fixture.media_file.to_str().unwrap())
        .unwrap();

    let opened = handle.opened();
    assert_eq!(opened.len(), 1);
    match &opened[0].0 {
        MediaSource::Local(path) => assert!(path.is_absolute()),
        other => panic!("expected local source, got {:?}", other),
    }
    // auto_play is on by default, so the engine is already playing; the
    // mirrored state catches up on the next tick
    assert_eq!(controller.state().playback, PlaybackState::Opening);
    controller.tick();
    assert_eq!(controller.state().playback, PlaybackState::Playing);
}

#[test]
fn open_rtsp_source_carries_network_options() {
    let fixture = TestFixture::new().unwrap();
    let (engine, handle) = MockEngine::new();
    let mut controller = controller_with(engine, &fixture);

    controller.open_input("rtsp://127.0.0.1:554/stream").unwrap();

    let opened = handle.opened();
    assert_eq!(opened.len(), 1);
    assert!(opened[0].0.is_rtsp());
    assert!(opened[0].1.force_tcp);
    assert_eq!(opened[0].1.network_caching, Duration::from_millis(1500));
}

#[test]
fn junk_input_shows_address_error_without_touching_engine() {
    let fixture = TestFixture::new().unwrap();
    let (engine, handle) = MockEngine::new();
    let mut controller = controller_with(engine, &fixture);

    assert!(controller.open_input("definitely not a source").is_err());

    assert!(handle.opened().is_empty());
    let state = controller.state();
    assert_eq!(state.status.level, StatusLevel::Error);
    assert!(state.status.text.contains("address is invalid"));
}

#[test]
fn drag_guard_keeps_slider_position_stable() {
    let fixture = TestFixture::new().unwrap();
    let (engine, handle) = MockEngine::seekable_file();
    let mut controller = controller_with(engine, &fixture);

    controller.open_input("rtsp://host/recorded").unwrap();
    handle.send_event(EngineEvent::PrerollDone {
        duration: Some(Duration::from_secs(100)),
        seekable: true,
        live: false,
    });
    handle.report_position(Duration::from_secs(10));
    controller.tick();
    assert_eq!(controller.state().position, Duration::from_secs(10));

    // User grabs the slider at 50%
    controller.begin_seek_drag(0.5);

    // Engine keeps advancing while the user holds the slider
    handle.report_position(Duration::from_secs(20));
    controller.tick();
    handle.report_position(Duration::from_secs(30));
    controller.tick();

    // Periodic updates must not overwrite the dragged position
    let state = controller.state();
    assert_eq!(state.position, Duration::from_secs(10));
    assert_eq!(state.display_fraction(), 0.5);

    // Release performs the seek and resumes mirroring
    controller.end_seek_drag(0.5).unwrap();
    assert_eq!(handle.seeks(), vec![Duration::from_secs(50)]);

    handle.report_position(Duration::from_secs(51));
    controller.tick();
    assert_eq!(controller.state().position, Duration::from_secs(51));
}

#[test]
fn toggle_label_tracks_reported_engine_state() {
    let fixture = TestFixture::new().unwrap();
    let (engine, handle) = MockEngine::seekable_file();
    let mut controller = controller_with(engine, &fixture);

    controller.open_input("rtsp://host/recorded").unwrap();
    controller.tick();
    assert_eq!(controller.state().play_toggle_label(), "\u{23F8} Pause");

    controller.toggle_play().unwrap();
    controller.tick();
    assert_eq!(controller.state().playback, PlaybackState::Paused);
    assert_eq!(controller.state().play_toggle_label(), "\u{25B6} Play");

    controller.toggle_play().unwrap();
    controller.tick();
    assert_eq!(controller.state().play_toggle_label(), "\u{23F8} Pause");

    // The label follows what the engine reports, not what was requested
    handle.report_state(PlaybackState::Paused);
    controller.tick();
    assert_eq!(controller.state().play_toggle_label(), "\u{25B6} Play");
}

#[test]
fn live_stream_disables_seeking() {
    let fixture = TestFixture::new().unwrap();
    let (engine, handle) = MockEngine::live_stream();
    let mut controller = controller_with(engine, &fixture);

    controller.open_input("rtsp://camera/live").unwrap();
    handle.send_event(EngineEvent::PrerollDone {
        duration: None,
        seekable: false,
        live: true,
    });
    controller.tick();

    let state = controller.state();
    assert!(state.live);
    assert!(!state.can_seek());

    // Seek requests on a live stream are ignored, not errors
    controller.seek_to_fraction(0.5).unwrap();
    controller.seek_by(1).unwrap();
    assert!(handle.seeks().is_empty());
}

#[test]
fn engine_errors_surface_as_classified_status() {
    let fixture = TestFixture::new().unwrap();
    let (engine, handle) = MockEngine::new();
    let mut controller = controller_with(engine, &fixture);

    controller.open_input("rtsp://bad-host/stream").unwrap();
    handle.send_event(EngineEvent::Error {
        kind: EngineErrorKind::Connection,
        message: "could not resolve host".to_string(),
    });
    controller.tick();

    let state = controller.state();
    assert_eq!(state.status.level, StatusLevel::Error);
    assert!(state.status.text.contains("could not connect"));

    handle.send_event(EngineEvent::Error {
        kind: EngineErrorKind::Internal,
        message: "allocation failed".to_string(),
    });
    controller.tick();
    assert!(controller.state().status.text.contains("System error"));
}

#[test]
fn buffering_reports_percent_in_status() {
    let fixture = TestFixture::new().unwrap();
    let (engine, handle) = MockEngine::new();
    let mut controller = controller_with(engine, &fixture);

    controller.open_input("rtsp://host/stream").unwrap();
    handle.send_event(EngineEvent::Buffering { percent: 37 });
    controller.tick();

    let state = controller.state();
    assert_eq!(state.status.text, "Buffering... 37%");
    assert_eq!(state.status.level, StatusLevel::Warning);
}

#[test]
fn snapshot_writes_decodable_image() {
    let fixture = TestFixture::new().unwrap();
    let (engine, handle) = MockEngine::seekable_file();
    handle.with_state(|s| s.snapshot_frame = Some(test_frame(16, 9)));
    let mut controller = controller_with(engine, &fixture);

    controller.open_input("rtsp://host/recorded").unwrap();
    let path = controller.take_snapshot().unwrap();

    assert!(path.starts_with(fixture.path()));
    assert_eq!(path.extension().and_then(|e| e.to_str()), Some("png"));

    let decoded = image::open(&path).unwrap();
    assert_eq!(decoded.width(), 16);
    assert_eq!(decoded.height(), 9);

    let state = controller.state();
    assert_eq!(state.status.level, StatusLevel::Success);
    assert!(state.status.text.contains("Snapshot saved"));
}

#[test]
fn snapshot_without_frame_reports_error() {
    let fixture = TestFixture::new().unwrap();
    let (engine, _handle) = MockEngine::seekable_file();
    let mut controller = controller_with(engine, &fixture);

    controller.open_input("rtsp://host/recorded").unwrap();
    assert!(controller.take_snapshot().is_err());
    assert_eq!(controller.state().status.level, StatusLevel::Error);
}

#[test]
fn stop_resets_position_and_status() {
    let fixture = TestFixture::new().unwrap();
    let (engine, handle) = MockEngine::seekable_file();
    let mut controller = controller_with(engine, &fixture);

    controller.open_input("rtsp://host/recorded").unwrap();
    handle.report_position(Duration::from_secs(42));
    controller.tick();
    assert_eq!(controller.state().position, Duration::from_secs(42));

    controller.stop().unwrap();
    controller.tick();

    let state = controller.state();
    assert_eq!(state.playback, PlaybackState::Stopped);
    assert_eq!(state.position, Duration::ZERO);
}

#[test]
fn volume_changes_reach_engine_clamped() {
    let fixture = TestFixture::new().unwrap();
    let (engine, handle) = MockEngine::seekable_file();
    let mut controller = controller_with(engine, &fixture);

    controller.set_volume(0.4).unwrap();
    assert_eq!(handle.with_state(|s| s.volume), 0.4);

    controller.set_volume(1.7).unwrap();
    assert_eq!(handle.with_state(|s| s.volume), 1.0);

    controller.toggle_mute().unwrap();
    assert!(handle.with_state(|s| s.muted));
    controller.toggle_mute().unwrap();
    assert!(!handle.with_state(|s| s.muted));
}

#[test]
fn end_of_stream_resets_toggle_to_play() {
    let fixture = TestFixture::new().unwrap();
    let (engine, handle) = MockEngine::seekable_file();
    let mut controller = controller_with(engine, &fixture);

    controller.open_input("rtsp://host/recorded").unwrap();
    controller.tick();
    assert_eq!(controller.state().play_toggle_label(), "\u{23F8} Pause");

    handle.report_state(PlaybackState::Ended);
    handle.send_event(EngineEvent::EndOfStream);
    controller.tick();

    let state = controller.state();
    assert_eq!(state.playback, PlaybackState::Ended);
    assert_eq!(state.play_toggle_label(), "\u{25B6} Play");
    assert_eq!(state.status.text, "End of stream");
}
