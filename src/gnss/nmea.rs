// src/gnss/nmea.rs
//! NMEA-0183 sentence parsing

use super::data::{Constellation, GnssState, SatelliteObservation, SatelliteStatus};
use crate::heading::normalize_heading;
use log::{debug, trace};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Stateful NMEA parser.
///
/// GSV cycles span several sentences; a snapshot is only published once the
/// last sentence of a cycle arrives, so readers never see a partial list.
#[derive(Debug, Default)]
pub struct NmeaParser {
    pending: HashMap<String, Vec<SatelliteObservation>>,
    in_view: BTreeMap<String, TalkerCycle>,
    used: HashMap<String, HashSet<u32>>,
    // consecutive GSA sentences describe one fix
    in_gsa_run: bool,
    epoch: u64,
    reported: HashSet<String>,
}

/// Latest complete GSV cycle of one talker and the epoch it arrived in
#[derive(Debug)]
struct TalkerCycle {
    epoch: u64,
    satellites: Vec<SatelliteObservation>,
}

impl NmeaParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a single NMEA sentence and update the state
    pub fn parse_sentence(&mut self, state: &mut GnssState, line: &str) {
        let Some(body) = checked_body(line) else {
            debug!("Dropping malformed NMEA sentence: {}", line);
            return;
        };
        let (Some(talker), Some(kind)) = (body.get(..2), body.get(2..5)) else {
            return;
        };

        if kind != "GSA" {
            self.in_gsa_run = false;
        }

        let parts: Vec<&str> = body.split(',').collect();
        match kind {
            "GGA" => parse_gga(state, &parts),
            "RMC" => parse_rmc(state, &parts),
            "GSA" => self.parse_gsa(talker, &parts),
            "GSV" => self.parse_gsv(state, talker, &parts),
            "HDT" => parse_hdt(state, &parts),
            other => trace!("Ignoring NMEA sentence type {}", other),
        }
    }

    /// GSA lists the PRNs used in the current fix.
    ///
    /// Receivers send one GSA per constellation each epoch, so a run of
    /// consecutive GSA sentences replaces the used sets as a whole.
    fn parse_gsa(&mut self, talker: &str, parts: &[&str]) {
        if parts.len() < 15 {
            return;
        }

        if !self.in_gsa_run {
            self.used.clear();
            self.in_gsa_run = true;
        }

        // NMEA 4.10 appends a system id so mixed `GN` talkers can be split
        let system = match parts.get(18).and_then(|id| id.parse::<u8>().ok()) {
            Some(1) => Some("GP"),
            Some(2) => Some("GL"),
            Some(3) => Some("GA"),
            Some(4) => Some("GB"),
            Some(5) => Some("GQ"),
            _ => None,
        };

        for prn in parts[3..15].iter().filter_map(|prn| prn.parse::<u32>().ok()) {
            let (key, id) = match system {
                Some(key) => (key, prn),
                None if talker == "GN" => gn_bucket(prn),
                None => (talker, prn),
            };
            self.used.entry(key.to_string()).or_default().insert(id);
        }
    }

    /// GSV (satellites in view), up to four satellites per sentence
    fn parse_gsv(&mut self, state: &mut GnssState, talker: &str, parts: &[&str]) {
        if parts.len() < 4 {
            return;
        }

        let total_messages = parts[1].parse::<u8>().unwrap_or(0);
        let message_num = parts[2].parse::<u8>().unwrap_or(0);
        let constellation = Constellation::from_talker(talker);

        let pending = self.pending.entry(talker.to_string()).or_default();
        if message_num == 1 {
            pending.clear();
        }

        let mut sat_index = 4;
        while sat_index + 3 < parts.len() {
            let prn = parts[sat_index].parse::<u32>();
            let elevation = parts[sat_index + 1].parse::<f32>();
            let azimuth = parts[sat_index + 2].parse::<f32>();

            match (prn, elevation, azimuth) {
                (Ok(prn), Ok(elevation), Ok(azimuth)) => {
                    // SNR is empty when the satellite is not tracked
                    let snr = parts[sat_index + 3].parse::<f32>().unwrap_or(0.0);
                    let sat = SatelliteObservation::new(prn, constellation, azimuth, elevation);
                    pending.push(sat.signal(snr));
                }
                (Ok(prn), _, _) => debug!("Satellite {} {} has no position yet", talker, prn),
                _ => {}
            }

            sat_index += 4;
        }

        if message_num != 0 && message_num == total_messages {
            let satellites = self.pending.remove(talker).unwrap_or_default();
            self.complete_cycle(talker, satellites);
            state.publish_status(self.snapshot());
        }
    }

    /// Store a finished cycle and forget talkers that missed an epoch.
    ///
    /// A talker completing its cycle a second time marks the start of a new
    /// epoch.
    fn complete_cycle(&mut self, talker: &str, satellites: Vec<SatelliteObservation>) {
        if !self.reported.insert(talker.to_string()) {
            self.epoch += 1;
            self.reported.clear();
            self.reported.insert(talker.to_string());
        }

        self.in_view.insert(
            talker.to_string(),
            TalkerCycle {
                epoch: self.epoch,
                satellites,
            },
        );

        let current = self.epoch;
        self.in_view.retain(|talker, cycle| {
            let fresh = cycle.epoch + 1 >= current;
            if !fresh {
                debug!("{} stopped reporting satellites", talker);
            }
            fresh
        });
    }

    /// Merge the latest complete cycle of every talker into one snapshot
    fn snapshot(&self) -> SatelliteStatus {
        let observations = self
            .in_view
            .iter()
            .flat_map(|(talker, cycle)| {
                let used = self.used.get(talker);
                cycle.satellites.iter().map(move |sat| {
                    let in_fix = used.is_some_and(|set| set.contains(&sat.id));
                    sat.clone().used(in_fix)
                })
            })
            .collect();
        SatelliteStatus::new(observations)
    }
}

/// Talker bucket and satellite id for a PRN from a `GN` GSA without system id
fn gn_bucket(prn: u32) -> (&'static str, u32) {
    match Constellation::from_prn(prn) {
        Constellation::Gps => ("GP", prn),
        Constellation::Glonass => ("GL", prn),
        Constellation::Galileo if prn > 300 => ("GA", prn - 300),
        Constellation::Galileo => ("GA", prn - 210),
        Constellation::Other => ("GN", prn),
    }
}

/// Strip the leading `$` and trailing checksum, verifying it when present
fn checked_body(line: &str) -> Option<&str> {
    let line = line.trim().strip_prefix('$')?;
    match line.split_once('*') {
        Some((body, checksum)) => {
            let expected = u8::from_str_radix(checksum.get(..2)?, 16).ok()?;
            let actual = body.bytes().fold(0u8, |acc, b| acc ^ b);
            (actual == expected).then_some(body)
        }
        None => Some(line),
    }
}

fn parse_coordinate(value: &str, hemisphere: &str, negative: &str) -> Option<f64> {
    let raw = value.parse::<f64>().ok()?;
    let degrees = (raw / 100.0).trunc();
    let minutes = raw - degrees * 100.0;
    let coordinate = degrees + minutes / 60.0;
    Some(if hemisphere == negative { -coordinate } else { coordinate })
}

/// GGA (Global Positioning System Fix Data)
fn parse_gga(state: &mut GnssState, parts: &[&str]) {
    if parts.len() < 10 {
        return;
    }

    if let Some(lat) = parse_coordinate(parts[2], parts[3], "S") {
        state.latitude = Some(lat);
    }
    if let Some(lon) = parse_coordinate(parts[4], parts[5], "W") {
        state.longitude = Some(lon);
    }
    if let Ok(quality) = parts[6].parse::<u8>() {
        state.fix_quality = Some(quality);
    }
    if let Ok(hdop) = parts[8].parse::<f64>() {
        state.hdop = Some(hdop);
    }
    if let Ok(alt) = parts[9].parse::<f64>() {
        state.altitude = Some(alt);
    }
}

/// RMC (Recommended Minimum Course)
fn parse_rmc(state: &mut GnssState, parts: &[&str]) {
    if parts.len() < 10 {
        return;
    }

    if let Ok(speed_knots) = parts[7].parse::<f64>() {
        state.speed = Some(speed_knots * 1.852);
    }
    if let Ok(course) = parts[8].parse::<f64>() {
        state.course = Some(course);
    }
}

/// HDT (heading, true)
fn parse_hdt(state: &mut GnssState, parts: &[&str]) {
    if let Some(Ok(heading)) = parts.get(1).map(|h| h.parse::<f32>()) {
        state.heading = Some(normalize_heading(heading));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::init_logger;

    #[test]
    fn test_gga_parsing() {
        init_logger();
        let mut parser = NmeaParser::new();
        let mut state = GnssState::new();
        let gga = "$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47";

        parser.parse_sentence(&mut state, gga);

        assert!((state.latitude.unwrap() - 48.1173).abs() < 1e-4);
        assert!((state.longitude.unwrap() - 11.5167).abs() < 1e-4);
        assert_eq!(state.hdop, Some(0.9));
        assert_eq!(state.altitude, Some(545.4));
        assert_eq!(state.fix_quality, Some(1));
    }

    #[test]
    fn test_rmc_parsing() {
        let mut parser = NmeaParser::new();
        let mut state = GnssState::new();
        let rmc = "$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A";

        parser.parse_sentence(&mut state, rmc);

        // knots to km/h
        assert!((state.speed.unwrap() - 41.5).abs() < 0.1);
        assert_eq!(state.course, Some(84.4));
    }

    #[test]
    fn test_gsv_cycle_published_on_last_message() {
        let mut parser = NmeaParser::new();
        let mut state = GnssState::new();

        parser.parse_sentence(
            &mut state,
            "$GPGSV,2,1,08,01,40,083,46,02,17,308,41,12,07,344,39,14,22,228,45*75",
        );
        assert!(state.status.is_none());

        parser.parse_sentence(
            &mut state,
            "$GPGSV,2,2,08,15,55,120,30,18,05,010,,21,33,270,28,24,61,045,44*74",
        );
        let observations = state.observations().unwrap();
        assert_eq!(observations.len(), 8);
        assert_eq!(observations[0].id, 1);
        assert_eq!(observations[0].constellation, Constellation::Gps);
        assert_eq!(observations[0].elevation_degrees, 40.0);
        assert_eq!(observations[0].azimuth_degrees, 83.0);
        assert_eq!(observations[0].signal_strength_db_hz, 46.0);
        // untracked satellite reports an empty SNR
        assert_eq!(observations[5].id, 18);
        assert_eq!(observations[5].signal_strength_db_hz, 0.0);
    }

    #[test]
    fn test_gsa_marks_used_satellites() {
        let mut parser = NmeaParser::new();
        let mut state = GnssState::new();

        parser.parse_sentence(&mut state, "$GPGSA,A,3,01,12,,,,,,,,,,,1.8,0.9,1.5*34");
        parser.parse_sentence(&mut state, "$GLGSV,1,1,02,70,30,100,35,71,10,200,20*63");
        parser.parse_sentence(&mut state, "$GPGSV,1,1,02,01,40,083,46,02,17,308,41*7D");

        let observations = state.observations().unwrap();
        let used: Vec<_> = observations.iter().filter(|s| s.used_in_fix).map(|s| s.id).collect();
        assert_eq!(used, vec![1]);
        assert_eq!(observations.len(), 4);
        assert!(observations.iter().any(|s| s.constellation == Constellation::Glonass));
    }

    fn used_ids(state: &GnssState) -> Vec<(Constellation, u32)> {
        let mut used: Vec<_> = state
            .observations()
            .unwrap()
            .iter()
            .filter(|s| s.used_in_fix)
            .map(|s| (s.constellation, s.id))
            .collect();
        used.sort();
        used
    }

    #[test]
    fn test_consecutive_gngsa_sentences_accumulate() {
        init_logger();
        let mut parser = NmeaParser::new();
        let mut state = GnssState::new();

        parser.parse_sentence(&mut state, "$GNGSA,A,3,01,12,,,,,,,,,,,1.8,0.9,1.5*2A");
        parser.parse_sentence(&mut state, "$GNGSA,A,3,70,,,,,,,,,,,,1.8,0.9,1.5*2F");
        parser.parse_sentence(&mut state, "$GPGSV,1,1,02,01,40,083,46,12,07,344,39*7A");
        parser.parse_sentence(&mut state, "$GLGSV,1,1,01,70,30,100,35*57");
        parser.parse_sentence(&mut state, "$GAGSV,1,1,01,12,55,120,30*5A");

        assert_eq!(state.observations().unwrap().len(), 4);
        // Galileo 12 shares its number with GPS 12 but is not in the fix
        assert_eq!(
            used_ids(&state),
            vec![
                (Constellation::Gps, 1),
                (Constellation::Gps, 12),
                (Constellation::Glonass, 70),
            ]
        );
    }

    #[test]
    fn test_gngsa_system_id_selects_constellation() {
        let mut parser = NmeaParser::new();
        let mut state = GnssState::new();

        parser.parse_sentence(&mut state, "$GNGSA,A,3,01,,,,,,,,,,,,1.8,0.9,1.5,1*34");
        parser.parse_sentence(&mut state, "$GNGSA,A,3,12,,,,,,,,,,,,1.8,0.9,1.5,3*34");
        parser.parse_sentence(&mut state, "$GPGSV,1,1,02,01,40,083,46,12,07,344,39*7A");
        parser.parse_sentence(&mut state, "$GAGSV,1,1,01,12,55,120,30*5A");

        assert_eq!(
            used_ids(&state),
            vec![(Constellation::Gps, 1), (Constellation::Galileo, 12)]
        );
    }

    #[test]
    fn test_extended_galileo_prn_matches_gagsv_id() {
        let mut parser = NmeaParser::new();
        let mut state = GnssState::new();

        parser.parse_sentence(&mut state, "$GNGSA,A,3,212,,,,,,,,,,,,1.8,0.9,1.5*19");
        parser.parse_sentence(&mut state, "$GAGSV,1,1,02,02,55,120,30,12,20,200,25*6C");

        assert_eq!(used_ids(&state), vec![(Constellation::Galileo, 2)]);
    }

    #[test]
    fn test_next_gsa_run_replaces_used_sets() {
        let mut parser = NmeaParser::new();
        let mut state = GnssState::new();

        parser.parse_sentence(&mut state, "$GNGSA,A,3,01,12,,,,,,,,,,,1.8,0.9,1.5*2A");
        parser.parse_sentence(
            &mut state,
            "$GNGGA,123520,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*53",
        );
        parser.parse_sentence(&mut state, "$GNGSA,A,3,12,,,,,,,,,,,,1.8,0.9,1.5*2B");
        parser.parse_sentence(&mut state, "$GPGSV,1,1,02,01,40,083,46,12,07,344,39*7A");

        assert_eq!(used_ids(&state), vec![(Constellation::Gps, 12)]);
    }

    #[test]
    fn test_silent_talker_drops_out_of_snapshot() {
        let mut parser = NmeaParser::new();
        let mut state = GnssState::new();

        parser.parse_sentence(&mut state, "$GLGSV,1,1,02,70,30,100,35,71,10,200,20*63");
        parser.parse_sentence(&mut state, "$GPGSV,1,1,02,01,40,083,46,02,17,308,41*7D");
        assert_eq!(state.observations().unwrap().len(), 4);

        // one missed epoch is tolerated
        parser.parse_sentence(&mut state, "$GPGSV,1,1,02,01,40,083,46,02,17,308,41*7D");
        assert_eq!(state.observations().unwrap().len(), 4);

        for _ in 0..100 {
            parser.parse_sentence(&mut state, "$GPGSV,1,1,02,01,40,083,46,02,17,308,41*7D");
        }
        let ids: Vec<_> = state.observations().unwrap().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_hdt_sets_heading() {
        let mut parser = NmeaParser::new();
        let mut state = GnssState::new();
        parser.parse_sentence(&mut state, "$HEHDT,274.07,T*19");
        assert_eq!(state.heading, Some(274.07));
    }

    #[test]
    fn test_bad_checksum_dropped() {
        let mut parser = NmeaParser::new();
        let mut state = GnssState::new();
        parser.parse_sentence(
            &mut state,
            "$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*48",
        );
        assert!(state.latitude.is_none());
    }

    #[test]
    fn test_invalid_sentence() {
        let mut parser = NmeaParser::new();
        let mut state = GnssState::new();

        parser.parse_sentence(&mut state, "$INVALID,123,456");
        parser.parse_sentence(&mut state, "garbage");

        assert!(state.latitude.is_none());
        assert!(state.status.is_none());
    }
}
