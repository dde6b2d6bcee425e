//! The StreamView application window
//!
//! Layout: address bar on top, video surface in the middle, transport
//! controls and the status line at the bottom. The per-frame `update` pass
//! ingests decoded frames from the engine's watch channel, runs the
//! controller's reconciliation tick, then draws.

use crate::engine::{PlaybackState, VideoFrame};
use crate::player::{PlayerController, PlayerState, RecentInputs, StatusLevel};
use crate::ui::{controls, video_view};
use crate::utils::config::Config;
use eframe::egui;
use log::error;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::watch;

/// Repaint interval while frames are flowing
const ACTIVE_REPAINT: Duration = Duration::from_millis(16);

/// Repaint interval while idle; also the floor for the reconciliation tick
const IDLE_REPAINT: Duration = Duration::from_millis(100);

pub struct PlayerApp {
    controller: PlayerController,
    input: String,
    recents: RecentInputs,
    recents_path: PathBuf,
    frame_rx: watch::Receiver<Option<VideoFrame>>,
    texture: Option<egui::TextureHandle>,
    fullscreen: bool,
}

impl PlayerApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        controller: PlayerController,
        frame_rx: watch::Receiver<Option<VideoFrame>>,
        config: &Config,
        initial_input: Option<String>,
    ) -> Self {
        let recents_path = RecentInputs::default_path();
        let recents = RecentInputs::load_from(&recents_path, config.general.recent_inputs_limit);

        // Prefill the address field: CLI argument first, then the last
        // played input
        let input = initial_input
            .clone()
            .or_else(|| recents.most_recent().map(str::to_string))
            .unwrap_or_default();

        let mut app = Self {
            controller,
            input,
            recents,
            recents_path,
            frame_rx,
            texture: None,
            fullscreen: config.window.fullscreen,
        };

        if initial_input.is_some() {
            app.open_current_input();
        }

        app
    }

    /// Open whatever is in the address field
    fn open_current_input(&mut self) {
        let input = self.input.clone();
        if self.controller.open_input(&input).is_ok() {
            self.recents.add(&input);
            self.recents.save_to(&self.recents_path);
        }
    }

    /// Upload the most recent engine frame into the texture, if one arrived
    fn ingest_frame(&mut self, ctx: &egui::Context) {
        if !self.frame_rx.has_changed().unwrap_or(false) {
            return;
        }
        let frame = self.frame_rx.borrow_and_update().clone();
        match frame {
            Some(frame) => {
                let size = [frame.width as usize, frame.height as usize];
                let image = egui::ColorImage::from_rgba_unmultiplied(size, &frame.data);
                match &mut self.texture {
                    Some(texture) => texture.set(image, egui::TextureOptions::LINEAR),
                    None => {
                        self.texture =
                            Some(ctx.load_texture("video-frame", image, egui::TextureOptions::LINEAR))
                    }
                }
            }
            None => self.texture = None,
        }
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        // Leave the keyboard alone while the address field has focus
        if ctx.wants_keyboard_input() {
            return;
        }

        let pressed = |key| ctx.input(|i| i.key_pressed(key));

        if pressed(egui::Key::Space) {
            report(self.controller.toggle_play());
        }
        if pressed(egui::Key::ArrowLeft) {
            report(self.controller.seek_by(-1));
        }
        if pressed(egui::Key::ArrowRight) {
            report(self.controller.seek_by(1));
        }
        if pressed(egui::Key::ArrowUp) {
            report(self.controller.nudge_volume(1));
        }
        if pressed(egui::Key::ArrowDown) {
            report(self.controller.nudge_volume(-1));
        }
        if pressed(egui::Key::M) {
            report(self.controller.toggle_mute());
        }
        if pressed(egui::Key::S) {
            report(self.controller.take_snapshot().map(|_| ()));
        }
        if pressed(egui::Key::F) {
            self.toggle_fullscreen(ctx);
        }
        if pressed(egui::Key::Escape) && self.fullscreen {
            self.toggle_fullscreen(ctx);
        }
    }

    fn toggle_fullscreen(&mut self, ctx: &egui::Context) {
        self.fullscreen = !self.fullscreen;
        ctx.send_viewport_cmd(egui::ViewportCommand::Fullscreen(self.fullscreen));
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let files = ctx.input(|i| i.raw.dropped_files.clone());
        if let Some(path) = files.into_iter().filter_map(|f| f.path).next() {
            self.input = path.display().to_string();
            self.open_current_input();
        }
    }
}

impl eframe::App for PlayerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_dropped_files(ctx);
        self.handle_shortcuts(ctx);
        self.ingest_frame(ctx);
        self.controller.tick();

        egui::TopBottomPanel::top("address_bar").show(ctx, |ui| {
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                let edit = ui.add_sized(
                    [(ui.available_width() - 90.0).max(120.0), 28.0],
                    egui::TextEdit::singleline(&mut self.input)
                        .hint_text("rtsp://127.0.0.1:554/stream or /path/to/file"),
                );
                let submitted =
                    edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                let open_clicked = ui
                    .add_sized([80.0, 28.0], egui::Button::new("Open"))
                    .clicked();
                if submitted || open_clicked {
                    self.open_current_input();
                }
            });
            ui.add_space(6.0);
        });

        egui::TopBottomPanel::bottom("controls").show(ctx, |ui| {
            ui.add_space(6.0);
            controls::transport_row(ui, &mut self.controller);
            ui.add_space(2.0);
            controls::seek_row(ui, &mut self.controller);
            ui.add_space(4.0);
            status_row(ui, self.controller.state());
            ui.add_space(4.0);
        });

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(egui::Color32::BLACK))
            .show(ctx, |ui| {
                let response = video_view::video_surface(ui, self.texture.as_ref());
                if response.double_clicked() {
                    self.toggle_fullscreen(ctx);
                }
            });

        // Poll fast while media is active, slow otherwise; this interval is
        // what drives the reconciliation tick when nothing else repaints
        let interval = match self.controller.state().playback {
            PlaybackState::Playing | PlaybackState::Opening | PlaybackState::Buffering => {
                ACTIVE_REPAINT
            }
            _ => IDLE_REPAINT,
        };
        ctx.request_repaint_after(interval);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.recents.save_to(&self.recents_path);
        report(self.controller.stop());
    }
}

/// Status readout tinted by severity
fn status_row(ui: &mut egui::Ui, state: &PlayerState) {
    ui.horizontal(|ui| {
        ui.label(
            egui::RichText::new(&state.status.text)
                .color(status_color(state.status.level))
                .strong(),
        );
    });
}

fn status_color(level: StatusLevel) -> egui::Color32 {
    match level {
        StatusLevel::Info => egui::Color32::from_rgb(100, 149, 237),
        StatusLevel::Success => egui::Color32::from_rgb(76, 175, 80),
        StatusLevel::Warning => egui::Color32::from_rgb(255, 152, 0),
        StatusLevel::Error => egui::Color32::from_rgb(244, 67, 54),
    }
}

fn report(result: crate::utils::error::Result<()>) {
    if let Err(e) = result {
        error!("{}", e);
    }
}
