// src/display/gui/filter_dialog.rs
//! Checkbox dialog choosing which satellites the sky plot shows

use crate::filter::{FilterKey, VisibilityFilter};
use eframe::egui;

const CONSTELLATION_KEYS: [FilterKey; 4] = [
    FilterKey::Gps,
    FilterKey::Galileo,
    FilterKey::Glonass,
    FilterKey::Unknown,
];
const FIX_KEYS: [FilterKey; 2] = [FilterKey::UsedInFix, FilterKey::NotUsedInFix];

#[derive(Default)]
pub struct FilterDialog {
    pub open: bool,
    draft: VisibilityFilter,
    pub status_message: Option<String>,
}

impl FilterDialog {
    /// Open with the checkboxes set from the current filter
    pub fn open_with(&mut self, current: VisibilityFilter) {
        self.draft = current;
        self.status_message = None;
        self.open = true;
    }

    /// Returns the new filter when the user saved
    pub fn show(&mut self, ctx: &egui::Context) -> Option<VisibilityFilter> {
        if !self.open {
            return None;
        }

        let mut saved = None;

        egui::Window::new("🛰 Satellite Filter")
            .collapsible(false)
            .resizable(false)
            .default_width(260.0)
            .show(ctx, |ui| {
                ui.label("Constellations:");
                for key in CONSTELLATION_KEYS {
                    self.checkbox(ui, key);
                }

                ui.add_space(8.0);
                ui.label("Fix usage:");
                for key in FIX_KEYS {
                    self.checkbox(ui, key);
                }

                ui.add_space(8.0);
                ui.separator();

                if let Some(ref msg) = self.status_message {
                    ui.colored_label(egui::Color32::RED, msg);
                    ui.add_space(5.0);
                }

                ui.horizontal(|ui| {
                    if ui.button("💾 Save").clicked() {
                        saved = Some(self.draft);
                    }
                    if ui.button("❌ Cancel").clicked() {
                        self.open = false;
                        self.status_message = None;
                    }
                });
            });

        saved
    }

    fn checkbox(&mut self, ui: &mut egui::Ui, key: FilterKey) {
        let mut checked = self.draft.get(key);
        if ui.checkbox(&mut checked, key.label()).changed() {
            self.draft.set(key, checked);
        }
    }
}
