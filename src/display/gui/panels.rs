// src/display/gui/panels.rs
//! Location, heading and fix panel

use crate::gnss::GnssState;
use eframe::egui;

use super::compass;

fn format_coordinate(coord: Option<f64>) -> String {
    match coord {
        Some(val) => format!("{:.6}°", val),
        None => "No fix".to_string(),
    }
}

pub fn render_location_panel(ui: &mut egui::Ui, state: &GnssState) {
    ui.strong("📍 Location");
    ui.separator();

    if !state.has_fix() {
        ui.weak("Location not available");
    }

    egui::Grid::new("location_grid")
        .num_columns(2)
        .spacing([10.0, 8.0])
        .show(ui, |ui| {
            ui.label("Latitude:");
            ui.monospace(format_coordinate(state.latitude));
            ui.end_row();

            ui.label("Longitude:");
            ui.monospace(format_coordinate(state.longitude));
            ui.end_row();

            ui.label("Altitude:");
            ui.monospace(GnssState::format_value(state.altitude, "m"));
            ui.end_row();

            ui.label("Fix Type:");
            ui.monospace(state.fix_description());
            ui.end_row();

            if let Some(hdop) = state.hdop {
                ui.label("HDOP:");
                ui.monospace(format!("{:.1}", hdop));
                ui.end_row();
            }
        });

    ui.add_space(10.0);
    ui.strong("🧭 Heading");
    ui.separator();
    compass::render_compass(ui, state.heading);
}
