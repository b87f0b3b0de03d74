// src/gnss/mod.rs
//! GNSS data handling and parsing

pub mod data;
pub mod gpsd;
pub mod nmea;

pub use data::{Constellation, GnssState, SatelliteObservation, SatelliteStatus};
