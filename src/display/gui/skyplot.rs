// src/display/gui/skyplot.rs
//! Sky plot panel - paints the renderer's draw commands with egui

use crate::{
    filter::VisibilityFilter,
    gnss::GnssState,
    skyplot::{DrawCommand, Point, SkyColor, SkyPlotRenderer, ViewportGeometry},
};
use eframe::egui;
use log::warn;

pub fn sky_color(color: SkyColor) -> egui::Color32 {
    let (r, g, b) = color.rgb();
    egui::Color32::from_rgb(r, g, b)
}

/// Draws the plot and returns true when it was clicked
pub fn render_sky_plot(
    ui: &mut egui::Ui,
    renderer: &SkyPlotRenderer,
    state: &GnssState,
    filter: &VisibilityFilter,
) -> bool {
    ui.strong("🌌 Sky Plot");
    ui.separator();

    let available = ui.available_size();
    let plot_size = available.x.min(available.y - 40.0).clamp(150.0, 500.0);
    let (rect, response) =
        ui.allocate_exact_size(egui::vec2(plot_size, plot_size), egui::Sense::click());

    if ui.is_rect_visible(rect) {
        match ViewportGeometry::new(rect.width(), rect.height()) {
            Ok(viewport) => {
                let commands = renderer.render(state.observations(), filter, &viewport);
                paint_commands(&ui.painter_at(rect), rect.min, &commands);
            }
            Err(e) => warn!("Skipping sky plot: {}", e),
        }
    }

    ui.horizontal(|ui| {
        ui.small("Legend:");
        ui.colored_label(sky_color(SkyColor::Red), "● GPS");
        ui.colored_label(sky_color(SkyColor::Yellow), "● GLO");
        ui.colored_label(sky_color(SkyColor::Green), "● GAL");
        ui.colored_label(sky_color(SkyColor::Gray), "● Other");
    });
    ui.small("Click the plot to choose which satellites are shown");

    response.clicked()
}

fn paint_commands(painter: &egui::Painter, origin: egui::Pos2, commands: &[DrawCommand]) {
    let at = |point: &Point| origin + egui::vec2(point.x, point.y);

    for command in commands {
        match command {
            DrawCommand::Circle {
                center,
                radius,
                color,
                stroke_width: Some(width),
            } => {
                let stroke = egui::Stroke::new(*width, sky_color(*color));
                painter.circle_stroke(at(center), *radius, stroke)
            }
            DrawCommand::Circle { center, radius, color, stroke_width: None } => {
                painter.circle_filled(at(center), *radius, sky_color(*color))
            }
            DrawCommand::Line { from, to, color, width } => {
                let stroke = egui::Stroke::new(*width, sky_color(*color));
                painter.line_segment([at(from), at(to)], stroke)
            }
            DrawCommand::Text { position, text, color, size } => {
                // labels are anchored on their baseline like a canvas drawText
                let font_size = size.min(painter.clip_rect().height() / 15.0).max(8.0);
                painter.text(
                    at(position),
                    egui::Align2::LEFT_BOTTOM,
                    text,
                    egui::FontId::proportional(font_size),
                    sky_color(*color),
                );
            }
        }
    }
}
