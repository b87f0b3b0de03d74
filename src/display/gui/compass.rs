// src/display/gui/compass.rs
//! Compass arrow rotated to the current heading

use crate::heading::heading_text;
use eframe::egui;

pub fn render_compass(ui: &mut egui::Ui, heading: Option<f32>) {
    let size = 110.0;
    let (rect, _response) = ui.allocate_exact_size(egui::vec2(size, size), egui::Sense::hover());
    let painter = ui.painter_at(rect);
    let center = rect.center();
    let radius = size / 2.0 - 8.0;

    painter.circle_stroke(center, radius, egui::Stroke::new(2.0, egui::Color32::GRAY));
    painter.text(
        center - egui::vec2(0.0, radius + 1.0),
        egui::Align2::CENTER_BOTTOM,
        "N",
        egui::FontId::monospace(9.0),
        egui::Color32::WHITE,
    );

    match heading {
        Some(degrees) => {
            let angle = degrees.to_radians();
            let forward = egui::vec2(angle.sin(), -angle.cos());
            let side = egui::vec2(-forward.y, forward.x);

            let tip = center + forward * (radius - 4.0);
            let tail = center - forward * (radius * 0.5);
            let arrow = vec![tip, tail + side * 9.0, tail - side * 9.0];
            painter.add(egui::Shape::convex_polygon(
                arrow,
                egui::Color32::from_rgb(255, 80, 80),
                egui::Stroke::NONE,
            ));

            ui.monospace(heading_text(degrees));
        }
        None => {
            ui.weak("Heading: unknown");
        }
    }
}
