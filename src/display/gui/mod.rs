// src/display/gui/mod.rs
//! GUI display module

mod app;
mod compass;
mod filter_dialog;
mod panels;
mod satellites;
mod signal;
mod skyplot;

pub use app::SkyviewApp;

use crate::{error::Result, gnss::GnssState, prefs::PreferenceStore};
use std::sync::{atomic::AtomicBool, Arc, RwLock};

/// Run the GUI on the calling thread until the window closes
pub fn run(
    state: Arc<RwLock<GnssState>>,
    running: Arc<AtomicBool>,
    prefs: Box<dyn PreferenceStore>,
) -> Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 760.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("GNSS Sky View"),
        ..Default::default()
    };

    let app = SkyviewApp::new(state, running, prefs);
    eframe::run_native(
        "GNSS Sky View",
        options,
        Box::new(|cc| {
            cc.egui_ctx.set_visuals(egui::Visuals::dark());
            Ok(Box::new(app))
        }),
    )?;

    Ok(())
}
