// src/display/gui/app.rs
//! Main GUI application structure and eframe::App implementation

use crate::{
    filter::VisibilityFilter,
    gnss::GnssState,
    monitor::read_state,
    prefs::PreferenceStore,
    skyplot::SkyPlotRenderer,
};
use eframe::egui;
use log::{error, info};
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, RwLock,
    },
    time::Duration,
};

use super::{filter_dialog::FilterDialog, panels, satellites::SatellitePanel, signal, skyplot};

pub struct SkyviewApp {
    state: Arc<RwLock<GnssState>>,
    running: Arc<AtomicBool>,
    prefs: Box<dyn PreferenceStore>,
    renderer: SkyPlotRenderer,
    filter_dialog: FilterDialog,
    sat_panel: SatellitePanel,
}

impl SkyviewApp {
    pub fn new(
        state: Arc<RwLock<GnssState>>,
        running: Arc<AtomicBool>,
        prefs: Box<dyn PreferenceStore>,
    ) -> Self {
        Self {
            state,
            running,
            prefs,
            renderer: SkyPlotRenderer::new(),
            filter_dialog: FilterDialog::default(),
            sat_panel: SatellitePanel::default(),
        }
    }

    fn save_filter(&mut self, filter: VisibilityFilter) {
        match filter.save(self.prefs.as_mut()) {
            Ok(()) => {
                info!("Saved satellite filter {:?}", filter);
                self.filter_dialog.open = false;
            }
            Err(e) => {
                error!("Failed to save satellite filter: {}", e);
                self.filter_dialog.status_message = Some(format!("Error saving: {}", e));
            }
        }
    }
}

impl eframe::App for SkyviewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.request_repaint_after(Duration::from_secs(1));

        let state = read_state(&self.state);
        // toggles are re-read once per frame and handed to the renderer as a value
        let filter = VisibilityFilter::load(self.prefs.as_ref());

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.heading("🛰 GNSS Sky View");
                ui.separator();

                let status_color = if state.is_recent() {
                    egui::Color32::GREEN
                } else {
                    egui::Color32::RED
                };
                ui.colored_label(status_color, "●");

                let timestamp_str = match state.timestamp {
                    Some(ts) => ts.format("%H:%M:%S UTC").to_string(),
                    None => "No data".to_string(),
                };
                ui.label(format!("Last Update: {}", timestamp_str));

                if let Some(ref source) = state.source {
                    ui.separator();
                    ui.label(format!("Source: {}", source));
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("❌ Exit").clicked() {
                        self.running.store(false, Ordering::Relaxed);
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                    if ui.button("🛰 Filter").clicked() {
                        self.filter_dialog.open_with(filter);
                    }
                });
            });
        });

        egui::TopBottomPanel::bottom("bottom_panel")
            .resizable(true)
            .default_height(150.0)
            .show(ctx, |ui| {
                signal::render_signal_chart(ui, &state);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            let available_size = ui.available_size();

            ui.horizontal(|ui| {
                let left_width = available_size.x * 0.3;
                ui.allocate_ui_with_layout(
                    [left_width, available_size.y].into(),
                    egui::Layout::top_down(egui::Align::Min),
                    |ui| {
                        ui.group(|ui| {
                            ui.set_width(left_width - 10.0);
                            ui.set_height(available_size.y - 10.0);
                            panels::render_location_panel(ui, &state);
                        });
                    },
                );

                ui.separator();

                let middle_width = available_size.x * 0.4;
                ui.allocate_ui_with_layout(
                    [middle_width, available_size.y].into(),
                    egui::Layout::top_down(egui::Align::Center),
                    |ui| {
                        if skyplot::render_sky_plot(ui, &self.renderer, &state, &filter) {
                            self.filter_dialog.open_with(filter);
                        }
                    },
                );

                ui.separator();

                let right_width = available_size.x * 0.3 - 30.0;
                ui.allocate_ui_with_layout(
                    [right_width, available_size.y].into(),
                    egui::Layout::top_down(egui::Align::Min),
                    |ui| {
                        self.sat_panel.render(ui, &state);
                    },
                );
            });
        });

        if let Some(new_filter) = self.filter_dialog.show(ctx) {
            self.save_filter(new_filter);
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.running.store(false, Ordering::Relaxed);
    }
}
