// src/lib.rs
//! GNSS Sky View Library
//!
//! Reads satellite status from gpsd or a serial NMEA receiver and renders a
//! celestial sphere plot, a signal strength chart and a compass heading.

pub mod chart;
pub mod config;
pub mod display;
pub mod error;
pub mod filter;
pub mod gnss;
pub mod heading;
pub mod monitor;
pub mod prefs;
pub mod skyplot;

#[cfg(test)]
mod tests;

// Re-export main types for convenience
pub use error::{Result, SkyviewError};
pub use filter::{FilterKey, VisibilityFilter};
pub use gnss::{Constellation, GnssState, SatelliteObservation, SatelliteStatus};
pub use monitor::{GnssMonitor, GnssSource};
pub use skyplot::{DrawCommand, SkyPlotRenderer, ViewportGeometry};

#[cfg(feature = "gui")]
pub use display::gui::SkyviewApp;
