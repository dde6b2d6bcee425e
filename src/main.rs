use anyhow::{anyhow, Result};
use clap::Parser;
use eframe::egui;
use env_logger::Env;
use log::info;

use streamview::engine::GstEngine;
use streamview::player::PlayerController;
use streamview::ui::PlayerApp;
use streamview::utils::config::Config;

/// StreamView - a desktop player for RTSP streams and local media files
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Stream address or media file to open on startup
    #[arg(value_name = "SOURCE")]
    source: Option<String>,

    /// Set initial volume (0-100)
    #[arg(short, long, value_name = "VOLUME")]
    volume: Option<u8>,

    /// Window width
    #[arg(long)]
    width: Option<u32>,

    /// Window height
    #[arg(long)]
    height: Option<u32>,

    /// Do not force TCP transport for RTSP streams
    #[arg(long = "no-tcp")]
    no_tcp: bool,

    /// Network buffering duration in milliseconds
    #[arg(long, value_name = "MS")]
    network_caching: Option<u64>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level))
        .format_timestamp_millis()
        .init();

    info!("Starting StreamView v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load()?;
    if let Some(volume) = args.volume {
        config.general.volume = f64::from(volume.min(100)) / 100.0;
    }
    if let Some(width) = args.width {
        config.window.width = width;
    }
    if let Some(height) = args.height {
        config.window.height = height;
    }
    if args.no_tcp {
        config.network.force_tcp = false;
    }
    if let Some(caching) = args.network_caching {
        config.network.caching_ms = caching;
    }
    config.validate()?;

    // Frames flow engine -> UI through this channel; the UI thread is the
    // only place textures are touched
    let (frame_tx, frame_rx) = tokio::sync::watch::channel(None);

    let engine = GstEngine::new(frame_tx)?;
    let controller = PlayerController::new(Box::new(engine), config.clone());

    let viewport = egui::ViewportBuilder::default()
        .with_inner_size([config.window.width as f32, config.window.height as f32])
        .with_title(config.window.title.clone())
        .with_fullscreen(config.window.fullscreen);
    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    let title = config.window.title.clone();
    eframe::run_native(
        &title,
        options,
        Box::new(move |cc| {
            Ok(Box::new(PlayerApp::new(
                cc,
                controller,
                frame_rx,
                &config,
                args.source,
            )))
        }),
    )
    .map_err(|e| anyhow!("UI error: {}", e))
}
