// src/display/gui/satellites.rs
//! Satellite table rendering and sorting

use crate::gnss::{GnssState, SatelliteObservation};
use eframe::egui;
use std::cmp::Ordering;

use super::skyplot::sky_color;
use crate::skyplot::SkyColor;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SatelliteSortColumn {
    Constellation,
    Id,
    Used,
    Snr,
    Elevation,
    Azimuth,
}

pub struct SatellitePanel {
    pub sort_column: SatelliteSortColumn,
    pub sort_ascending: bool,
}

impl Default for SatellitePanel {
    fn default() -> Self {
        Self {
            sort_column: SatelliteSortColumn::Constellation,
            sort_ascending: true,
        }
    }
}

impl SatellitePanel {
    pub fn render(&mut self, ui: &mut egui::Ui, state: &GnssState) {
        ui.strong("🛰 Satellites");
        ui.separator();

        let Some(status) = &state.status else {
            ui.weak("No satellite data available");
            return;
        };

        ui.label(format!("📊 {} used / {} in view", status.used_count(), status.len()));
        ui.add_space(5.0);

        let mut satellites: Vec<_> = status.observations().iter().collect();
        self.sort_satellites(&mut satellites);

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                egui::Grid::new("satellite_table")
                    .num_columns(6)
                    .spacing([8.0, 4.0])
                    .striped(true)
                    .show(ui, |ui| {
                        self.render_headers(ui);
                        render_rows(ui, &satellites);
                    });
            });
    }

    fn sort_satellites(&self, satellites: &mut [&SatelliteObservation]) {
        let by_f32 = |a: f32, b: f32| a.partial_cmp(&b).unwrap_or(Ordering::Equal);
        satellites.sort_by(|a, b| {
            let cmp = match self.sort_column {
                SatelliteSortColumn::Constellation => {
                    a.constellation.cmp(&b.constellation).then(a.id.cmp(&b.id))
                }
                SatelliteSortColumn::Id => a.id.cmp(&b.id),
                SatelliteSortColumn::Used => b.used_in_fix.cmp(&a.used_in_fix),
                SatelliteSortColumn::Snr => {
                    by_f32(b.signal_strength_db_hz, a.signal_strength_db_hz)
                }
                SatelliteSortColumn::Elevation => by_f32(b.elevation_degrees, a.elevation_degrees),
                SatelliteSortColumn::Azimuth => by_f32(a.azimuth_degrees, b.azimuth_degrees),
            };
            if self.sort_ascending {
                cmp
            } else {
                cmp.reverse()
            }
        });
    }

    fn render_headers(&mut self, ui: &mut egui::Ui) {
        let headers = [
            ("Constellation", SatelliteSortColumn::Constellation, true),
            ("SVID", SatelliteSortColumn::Id, true),
            ("Used", SatelliteSortColumn::Used, false),
            ("C/N0 (dB-Hz)", SatelliteSortColumn::Snr, false),
            ("Elevation", SatelliteSortColumn::Elevation, false),
            ("Azimuth", SatelliteSortColumn::Azimuth, true),
        ];

        for (text, column, default_ascending) in headers {
            let arrow = match (column == self.sort_column, self.sort_ascending) {
                (true, true) => " ▲",
                (true, false) => " ▼",
                _ => "",
            };
            let title = egui::RichText::new(format!("{}{}", text, arrow)).strong();
            let header = ui.add(egui::Label::new(title).sense(egui::Sense::click()));
            if header.clicked() {
                self.toggle_sort(column, default_ascending);
            }
        }
        ui.end_row();
    }

    fn toggle_sort(&mut self, column: SatelliteSortColumn, default_ascending: bool) {
        if self.sort_column == column {
            self.sort_ascending = !self.sort_ascending;
        } else {
            self.sort_column = column;
            self.sort_ascending = default_ascending;
        }
    }
}

fn render_rows(ui: &mut egui::Ui, satellites: &[&SatelliteObservation]) {
    for sat in satellites {
        ui.colored_label(
            sky_color(SkyColor::for_constellation(sat.constellation)),
            sat.constellation.name(),
        );
        ui.monospace(sat.id.to_string());

        if sat.used_in_fix {
            ui.colored_label(egui::Color32::GREEN, "✓ Yes");
        } else {
            ui.colored_label(egui::Color32::GRAY, "○ No");
        }

        if sat.signal_strength_db_hz > 0.0 {
            ui.monospace(format!(
                "{:.1} {}",
                sat.signal_strength_db_hz,
                sat.signal_strength_description()
            ));
        } else {
            ui.colored_label(egui::Color32::GRAY, "--");
        }

        ui.monospace(format!("{:>3.0}°", sat.elevation_degrees));
        ui.monospace(format!("{:>3.0}°", sat.azimuth_degrees));
        ui.end_row();
    }
}
