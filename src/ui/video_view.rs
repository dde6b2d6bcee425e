//! Video surface widget
//!
//! Paints the most recent engine frame letterboxed on a black background.
//! The texture itself is owned by `PlayerApp`; this widget only lays it out.

use eframe::egui;

/// Fill the available space with the video frame, preserving aspect ratio
pub fn video_surface(ui: &mut egui::Ui, texture: Option<&egui::TextureHandle>) -> egui::Response {
    let (rect, response) = ui.allocate_exact_size(ui.available_size(), egui::Sense::click());
    ui.painter().rect_filled(rect, 0.0, egui::Color32::BLACK);

    match texture {
        Some(texture) => {
            let tex_size = texture.size_vec2();
            if tex_size.x > 0.0 && tex_size.y > 0.0 && rect.width() > 0.0 && rect.height() > 0.0 {
                let scale = (rect.width() / tex_size.x).min(rect.height() / tex_size.y);
                let image_rect = egui::Rect::from_center_size(rect.center(), tex_size * scale);
                let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
                ui.painter()
                    .image(texture.id(), image_rect, uv, egui::Color32::WHITE);
            }
        }
        None => {
            ui.painter().text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                "Open a stream address or drop a media file",
                egui::FontId::proportional(16.0),
                egui::Color32::GRAY,
            );
        }
    }

    response
}
