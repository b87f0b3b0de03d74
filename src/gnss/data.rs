// src/gnss/data.rs
//! GNSS data structures and utilities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Satellite constellation as far as the sky plot cares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Constellation {
    Gps,
    Glonass,
    Galileo,
    Other,
}

impl Constellation {
    /// Constellation from an NMEA talker id (`GP`, `GL`, `GA`, ...)
    pub fn from_talker(talker: &str) -> Self {
        match talker {
            "GP" => Constellation::Gps,
            "GL" => Constellation::Glonass,
            "GA" => Constellation::Galileo,
            _ => Constellation::Other,
        }
    }

    /// Constellation from a gpsd `gnssid` field
    pub fn from_gnssid(gnssid: u64) -> Self {
        match gnssid {
            0 => Constellation::Gps,
            2 => Constellation::Galileo,
            6 => Constellation::Glonass,
            _ => Constellation::Other,
        }
    }

    /// Best guess from an NMEA-style PRN when nothing else is known
    pub fn from_prn(prn: u32) -> Self {
        match prn {
            1..=32 => Constellation::Gps,
            65..=96 => Constellation::Glonass,
            211..=246 | 301..=336 => Constellation::Galileo,
            _ => Constellation::Other,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Constellation::Gps => "GPS",
            Constellation::Glonass => "GLONASS",
            Constellation::Galileo => "GALILEO",
            Constellation::Other => "OTHER",
        }
    }
}

impl fmt::Display for Constellation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One satellite as reported by a single status update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SatelliteObservation {
    pub id: u32,
    pub constellation: Constellation,
    pub azimuth_degrees: f32,
    pub elevation_degrees: f32,
    pub used_in_fix: bool,
    pub signal_strength_db_hz: f32,
}

impl SatelliteObservation {
    pub fn new(
        id: u32,
        constellation: Constellation,
        azimuth_degrees: f32,
        elevation_degrees: f32,
    ) -> Self {
        Self {
            id,
            constellation,
            azimuth_degrees,
            elevation_degrees,
            used_in_fix: false,
            signal_strength_db_hz: 0.0,
        }
    }

    pub fn used(mut self, used_in_fix: bool) -> Self {
        self.used_in_fix = used_in_fix;
        self
    }

    pub fn signal(mut self, signal_strength_db_hz: f32) -> Self {
        self.signal_strength_db_hz = signal_strength_db_hz;
        self
    }

    pub fn signal_strength_description(&self) -> &'static str {
        match self.signal_strength_db_hz {
            snr if snr >= 40.0 => "Excellent",
            snr if snr >= 35.0 => "Good",
            snr if snr >= 25.0 => "Fair",
            snr if snr >= 15.0 => "Poor",
            snr if snr > 0.0 => "Very Poor",
            _ => "Unknown",
        }
    }
}

/// Immutable snapshot of every satellite in view, replaced on each update
#[derive(Debug, Clone, PartialEq)]
pub struct SatelliteStatus {
    observations: Vec<SatelliteObservation>,
}

impl SatelliteStatus {
    pub fn new(observations: Vec<SatelliteObservation>) -> Self {
        Self { observations }
    }

    pub fn observations(&self) -> &[SatelliteObservation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Get count of satellites being used in the fix
    pub fn used_count(&self) -> usize {
        self.observations.iter().filter(|sat| sat.used_in_fix).count()
    }

    /// Satellite count followed by one line per satellite
    pub fn summary(&self) -> String {
        let mut text = format!("Satellites: {}\n", self.observations.len());
        for sat in &self.observations {
            text.push_str(&format!(
                "SVID: {} Constellation: {} Used in fix: {}\n",
                sat.id,
                sat.constellation,
                if sat.used_in_fix { "yes" } else { "no" }
            ));
        }
        text
    }
}

#[derive(Debug, Clone, Default)]
pub struct GnssState {
    pub timestamp: Option<DateTime<Utc>>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub altitude: Option<f64>,
    pub speed: Option<f64>,      // km/h
    pub course: Option<f64>,     // degrees
    pub fix_quality: Option<u8>,
    pub hdop: Option<f64>,
    pub mode: Option<u8>,
    pub heading: Option<f32>,    // degrees, [0, 360)
    pub source: Option<String>,
    pub raw_history: Vec<String>, // Recent raw lines
    pub status: Option<SatelliteStatus>,
}

impl GnssState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the state holds a position fix
    pub fn has_fix(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }

    /// Get the age of the data in seconds
    pub fn age_seconds(&self) -> Option<i64> {
        self.timestamp.map(|ts| Utc::now().signed_duration_since(ts).num_seconds())
    }

    /// Check if the data is recent (within 10 seconds)
    pub fn is_recent(&self) -> bool {
        self.age_seconds().is_some_and(|age| age < 10)
    }

    pub fn update_timestamp(&mut self) {
        self.timestamp = Some(Utc::now());
    }

    pub fn set_source(&mut self, source: &str) {
        if self.source.as_deref() != Some(source) {
            self.source = Some(source.to_string());
        }
    }

    /// Add a raw line to history (keep last 5)
    pub fn add_raw_line(&mut self, line: &str) {
        self.raw_history.push(line.to_string());
        if self.raw_history.len() > 5 {
            self.raw_history.remove(0);
        }
    }

    /// Replace the satellite snapshot
    pub fn publish_status(&mut self, status: SatelliteStatus) {
        self.status = Some(status);
    }

    /// Observations of the latest snapshot, `None` until the first one arrives
    pub fn observations(&self) -> Option<&[SatelliteObservation]> {
        self.status.as_ref().map(|status| status.observations())
    }

    pub fn fix_description(&self) -> String {
        if let Some(quality) = self.fix_quality {
            match quality {
                0 => "No fix".to_string(),
                1 => "GPS".to_string(),
                2 => "DGPS".to_string(),
                3 => "PPS".to_string(),
                4 => "RTK".to_string(),
                5 => "Float RTK".to_string(),
                6 => "Estimated".to_string(),
                7 => "Manual".to_string(),
                8 => "Simulation".to_string(),
                _ => format!("Unknown ({})", quality),
            }
        } else if let Some(m) = self.mode {
            match m {
                1 => "No fix".to_string(),
                2 => "2D fix".to_string(),
                3 => "3D fix".to_string(),
                _ => format!("Mode {}", m),
            }
        } else {
            "Unknown".to_string()
        }
    }

    /// Location as shown in the position panel
    pub fn location_text(&self) -> String {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => format!("Latitude: {:.6}\nLongitude: {:.6}", lat, lon),
            _ => "Location not available".to_string(),
        }
    }

    pub fn format_value<T: fmt::Display>(value: Option<T>, unit: &str) -> String {
        match value {
            Some(val) => format!("{} {}", val, unit),
            None => "Unknown".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_status() -> SatelliteStatus {
        SatelliteStatus::new(vec![
            SatelliteObservation::new(5, Constellation::Gps, 10.0, 45.0).used(true).signal(41.0),
            SatelliteObservation::new(70, Constellation::Glonass, 200.0, 12.0).signal(22.0),
            SatelliteObservation::new(12, Constellation::Gps, 300.0, 60.0).used(true),
        ])
    }

    #[test]
    fn test_constellation_lookup() {
        assert_eq!(Constellation::from_talker("GP"), Constellation::Gps);
        assert_eq!(Constellation::from_talker("GB"), Constellation::Other);
        assert_eq!(Constellation::from_gnssid(6), Constellation::Glonass);
        assert_eq!(Constellation::from_prn(70), Constellation::Glonass);
        assert_eq!(Constellation::from_prn(140), Constellation::Other);
    }

    #[test]
    fn test_status_counts() {
        let status = sample_status();
        assert_eq!(status.len(), 3);
        assert_eq!(status.used_count(), 2);
    }

    #[test]
    fn test_summary_lines() {
        let summary = sample_status().summary();
        let lines: Vec<_> = summary.lines().collect();
        assert_eq!(lines[0], "Satellites: 3");
        assert_eq!(lines[1], "SVID: 5 Constellation: GPS Used in fix: yes");
        assert_eq!(lines[2], "SVID: 70 Constellation: GLONASS Used in fix: no");
    }

    #[test]
    fn test_raw_history_keeps_last_five() {
        let mut state = GnssState::new();
        for i in 0..8 {
            state.add_raw_line(&format!("line {}", i));
        }
        assert_eq!(state.raw_history.len(), 5);
        assert_eq!(state.raw_history[0], "line 3");
    }

    #[test]
    fn test_observations_absent_until_published() {
        let mut state = GnssState::new();
        assert!(state.observations().is_none());
        state.publish_status(SatelliteStatus::new(Vec::new()));
        assert_eq!(state.observations().map(|obs| obs.len()), Some(0));
    }

    #[test]
    fn test_location_text() {
        let mut state = GnssState::new();
        assert_eq!(state.location_text(), "Location not available");
        state.latitude = Some(-23.5);
        state.longitude = Some(-46.625);
        assert_eq!(state.location_text(), "Latitude: -23.500000\nLongitude: -46.625000");
    }

    #[test]
    fn test_signal_description() {
        let sat = SatelliteObservation::new(1, Constellation::Gps, 0.0, 0.0);
        assert_eq!(sat.signal_strength_description(), "Unknown");
        assert_eq!(sat.signal(36.0).signal_strength_description(), "Good");
    }
}
