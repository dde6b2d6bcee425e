//! Source classification and configuration integration tests

use std::time::Duration;

use proptest::prelude::*;
use streamview::engine::{MediaSource, SourceOptions};
use streamview::player::RecentInputs;
use streamview::utils::config::{Config, NetworkConfig, SnapshotFormat};
use streamview_integration_tests::TestFixture;

#[test]
fn local_file_classification_uses_real_paths() {
    let fixture = TestFixture::new().unwrap();
    let raw = fixture.media_file.to_str().unwrap();

    let source = MediaSource::classify(raw).unwrap();
    match &source {
        MediaSource::Local(path) => {
            assert!(path.is_absolute());
            assert!(path.ends_with("clip.mp4"));
        }
        other => panic!("expected local source, got {:?}", other),
    }

    let uri = source.uri().unwrap();
    assert!(uri.starts_with("file://"), "got {}", uri);
}

#[test]
fn quoted_and_padded_paths_classify_the_same() {
    let fixture = TestFixture::new().unwrap();
    let raw = fixture.media_file.display().to_string();

    let plain = MediaSource::classify(&raw).unwrap();
    let quoted = MediaSource::classify(&format!("\"{}\"", raw)).unwrap();
    let padded = MediaSource::classify(&format!("  {}  ", raw)).unwrap();

    assert_eq!(plain, quoted);
    assert_eq!(plain, padded);
}

#[test]
fn missing_file_with_scheme_goes_to_network() {
    // A non-existent path is not a local source, but a scheme-carrying
    // string still reaches the engine as a network address
    assert!(MediaSource::classify("/no/such/file.mp4").is_err());

    let source = MediaSource::classify("rtsp://host:554/no/such/stream").unwrap();
    assert!(source.is_network());
    assert!(source.is_rtsp());
}

#[test]
fn source_options_follow_network_config() {
    let network = NetworkConfig {
        force_tcp: false,
        caching_ms: 3000,
    };
    let options = SourceOptions::from_config(&network);
    assert!(!options.force_tcp);
    assert_eq!(options.network_caching, Duration::from_millis(3000));
}

#[test]
fn config_roundtrips_through_toml_file() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture.path().join("config.toml");

    let mut config = Config::default();
    config.network.caching_ms = 2500;
    config.snapshot.format = SnapshotFormat::Jpeg;
    config.general.volume = 0.25;

    let serialized = toml::to_string_pretty(&config).unwrap();
    std::fs::write(&path, serialized).unwrap();

    let mut loaded = Config::default();
    loaded.merge_from_file(&path).unwrap();
    loaded.validate().unwrap();

    assert_eq!(loaded.network.caching_ms, 2500);
    assert_eq!(loaded.snapshot.format, SnapshotFormat::Jpeg);
    assert_eq!(loaded.general.volume, 0.25);
}

#[test]
fn recent_inputs_persist_across_loads() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture.path().join("recent.json");

    let mut recents = RecentInputs::new(3);
    recents.add("rtsp://cam/1");
    recents.add("rtsp://cam/2");
    recents.save_to(&path);

    let loaded = RecentInputs::load_from(&path, 3);
    assert_eq!(loaded.most_recent(), Some("rtsp://cam/2"));
    assert_eq!(loaded.entries().len(), 2);

    // A tighter limit on load truncates the stored list
    let truncated = RecentInputs::load_from(&path, 1);
    assert_eq!(truncated.entries().len(), 1);
}

proptest! {
    /// Classification must never panic, whatever the address field holds
    #[test]
    fn classify_never_panics(input in ".{0,120}") {
        let _ = MediaSource::classify(&input);
    }

    /// Anything that classifies as a network source carries a URI scheme
    #[test]
    fn network_sources_keep_their_scheme(rest in "[a-z0-9./:-]{1,40}") {
        let input = format!("rtsp://{}", rest);
        if let Ok(source) = MediaSource::classify(&input) {
            prop_assert!(source.is_network());
            prop_assert_eq!(source.uri().unwrap(), input.trim().to_string());
        }
    }
}
