// src/display/gui/signal.rs
//! Signal strength bar chart

use crate::{
    chart::{SignalChart, CHART_LABEL},
    gnss::GnssState,
    skyplot::SkyColor,
};
use eframe::egui;

use super::skyplot::sky_color;

pub fn render_signal_chart(ui: &mut egui::Ui, state: &GnssState) {
    ui.strong(format!("📶 {}", CHART_LABEL));
    ui.separator();

    let Some(observations) = state.observations() else {
        ui.weak("No signal data");
        return;
    };
    let chart = SignalChart::from_observations(observations);
    if chart.is_empty() {
        ui.weak("No satellites in view");
        return;
    }

    let width = ui.available_width().max(100.0);
    let height = 120.0;
    let (rect, _response) = ui.allocate_exact_size(egui::vec2(width, height), egui::Sense::hover());
    if !ui.is_rect_visible(rect) {
        return;
    }

    let painter = ui.painter_at(rect);
    let label_band = 14.0;
    let plot_height = height - label_band;
    let slot = width / chart.bars().len() as f32;
    let bar_width = (slot * 0.7).max(2.0);

    let heights = chart.scaled_heights(plot_height);
    for ((bar, bar_height), sat) in chart.bars().iter().zip(heights).zip(observations) {
        let left = rect.left() + bar.index as f32 * slot + (slot - bar_width) / 2.0;
        let bottom = rect.top() + plot_height;
        let bar_rect = egui::Rect::from_min_max(
            egui::pos2(left, bottom - bar_height),
            egui::pos2(left + bar_width, bottom),
        );
        let fill = sky_color(SkyColor::for_constellation(sat.constellation));
        painter.rect_filled(bar_rect, 1.0, fill);

        if slot >= 16.0 {
            painter.text(
                egui::pos2(left + bar_width / 2.0, bottom + 1.0),
                egui::Align2::CENTER_TOP,
                bar.satellite_id.to_string(),
                egui::FontId::monospace(9.0),
                egui::Color32::LIGHT_GRAY,
            );
        }
    }

    ui.small(format!("Max {:.0} dB-Hz", chart.max_value()));
}
