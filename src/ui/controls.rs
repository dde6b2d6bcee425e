//! Transport controls and seek/volume sliders
//!
//! Widget handlers forward straight to the controller. The seek slider owns
//! the drag protocol: grabbing it raises the drag guard so the tick stops
//! overwriting the displayed position, releasing it performs the seek.

use crate::player::PlayerController;
use crate::utils::format_duration;
use eframe::egui;
use log::error;

/// Play/pause toggle, stop, snapshot, and the volume cluster
pub fn transport_row(ui: &mut egui::Ui, controller: &mut PlayerController) {
    ui.horizontal(|ui| {
        let state = controller.state();
        let has_media = state.has_media();
        let toggle_label = state.play_toggle_label();
        let muted = state.muted;
        let mut volume = state.volume;

        if ui
            .add_enabled(has_media, egui::Button::new(toggle_label))
            .clicked()
        {
            report(controller.toggle_play());
        }

        if ui
            .add_enabled(has_media, egui::Button::new("\u{23F9} Stop"))
            .clicked()
        {
            report(controller.stop());
        }

        if ui
            .add_enabled(has_media, egui::Button::new("Snapshot"))
            .clicked()
        {
            report(controller.take_snapshot().map(|_| ()));
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.spacing_mut().slider_width = 120.0;
            if ui
                .add(egui::Slider::new(&mut volume, 0.0..=1.0).show_value(false))
                .changed()
            {
                report(controller.set_volume(volume));
            }
            let mute_label = if muted { "\u{1F507}" } else { "\u{1F50A}" };
            if ui.button(mute_label).clicked() {
                report(controller.toggle_mute());
            }
        });
    });
}

/// Elapsed time, seek slider, total time
pub fn seek_row(ui: &mut egui::Ui, controller: &mut PlayerController) {
    ui.horizontal(|ui| {
        let state = controller.state();
        let can_seek = state.can_seek();
        let mut fraction = state.display_fraction();

        ui.monospace(format_duration(state.position));

        let total_label = match state.duration {
            Some(duration) => format_duration(duration),
            None if state.live => "LIVE".to_string(),
            None => "--:--".to_string(),
        };

        // Slider stretches between the two time labels
        ui.spacing_mut().slider_width =
            (ui.available_width() - 70.0).max(50.0);

        let response = ui.add_enabled(
            can_seek,
            egui::Slider::new(&mut fraction, 0.0..=1.0)
                .show_value(false)
                .trailing_fill(true),
        );

        if response.drag_started() {
            controller.begin_seek_drag(fraction);
        }
        if response.dragged() {
            controller.update_seek_drag(fraction);
        }
        if response.drag_stopped() {
            report(controller.end_seek_drag(fraction));
        } else if response.changed() && !controller.state().seek_dragging {
            // Click-to-jump without a drag
            report(controller.seek_to_fraction(fraction));
        }

        ui.monospace(total_label);
    });
}

/// Log controller failures; the status line already carries the user-facing text
fn report(result: crate::utils::error::Result<()>) {
    if let Err(e) = result {
        error!("{}", e);
    }
}
