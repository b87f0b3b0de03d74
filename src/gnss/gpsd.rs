// src/gnss/gpsd.rs
//! GPSD client implementation

use super::data::{Constellation, GnssState, SatelliteObservation, SatelliteStatus};
use crate::{
    error::{Result, SkyviewError},
    heading::normalize_heading,
};
use log::{debug, info};
use serde::Deserialize;
use serde_json::{Map, Value};
use tokio::{
    io::{AsyncWriteExt, BufReader},
    net::TcpStream,
};

#[derive(Debug, Deserialize)]
struct GpsdMessage {
    class: String,
    #[serde(flatten)]
    data: Map<String, Value>,
}

/// Connect to a gpsd daemon and return a stream reader
pub async fn connect_gpsd(host: &str, port: u16) -> Result<BufReader<TcpStream>> {
    let mut stream = TcpStream::connect((host, port))
        .await
        .map_err(|e| {
            SkyviewError::Connection(format!(
                "Failed to connect to gpsd at {}:{}: {}",
                host, port, e
            ))
        })?;

    // WATCH starts the JSON report stream
    stream
        .write_all(b"?WATCH={\"enable\":true,\"json\":true}\n")
        .await
        .map_err(|e| SkyviewError::Connection(format!("Failed to send WATCH command: {}", e)))?;

    Ok(BufReader::new(stream))
}

/// Parse a single line of gpsd JSON data
pub fn parse_gpsd_json(state: &mut GnssState, line: &str) -> Result<()> {
    let msg: GpsdMessage = serde_json::from_str(line)
        .map_err(|e| SkyviewError::Parse(format!("Failed to parse gpsd JSON: {}", e)))?;

    match msg.class.as_str() {
        "TPV" => parse_tpv_message(state, &msg.data),
        "SKY" => parse_sky_message(state, &msg.data),
        "ATT" => parse_att_message(state, &msg.data),
        "VERSION" => parse_version_message(&msg.data),
        "DEVICES" => parse_devices_message(&msg.data),
        other => debug!("Ignoring gpsd report class {}", other),
    }

    Ok(())
}

fn get_f64(obj: &Map<String, Value>, key: &str) -> Option<f64> {
    obj.get(key).and_then(Value::as_f64)
}

/// TPV (Time Position Velocity)
fn parse_tpv_message(state: &mut GnssState, msg_data: &Map<String, Value>) {
    if let Some(lat) = get_f64(msg_data, "lat") {
        state.latitude = Some(lat);
    }
    if let Some(lon) = get_f64(msg_data, "lon") {
        state.longitude = Some(lon);
    }
    if let Some(alt) = get_f64(msg_data, "altMSL").or_else(|| get_f64(msg_data, "alt")) {
        state.altitude = Some(alt);
    }
    if let Some(speed) = get_f64(msg_data, "speed") {
        state.speed = Some(speed * 3.6); // m/s to km/h
    }
    if let Some(track) = get_f64(msg_data, "track") {
        state.course = Some(track);
    }
    if let Some(mode) = msg_data.get("mode").and_then(Value::as_u64) {
        state.mode = Some(mode as u8);
    }
}

/// SKY (satellites in view)
fn parse_sky_message(state: &mut GnssState, msg_data: &Map<String, Value>) {
    if let Some(hdop) = get_f64(msg_data, "hdop") {
        state.hdop = Some(hdop);
    }

    // Some gpsd versions send SKY without a satellite list; keep the last snapshot then
    let Some(satellites) = msg_data.get("satellites").and_then(Value::as_array) else {
        return;
    };

    let observations = satellites
        .iter()
        .filter_map(Value::as_object)
        .filter_map(parse_satellite)
        .collect();
    state.publish_status(SatelliteStatus::new(observations));
}

fn parse_satellite(sat_obj: &Map<String, Value>) -> Option<SatelliteObservation> {
    let prn = sat_obj.get("PRN").and_then(Value::as_u64)? as u32;
    let id = sat_obj.get("svid").and_then(Value::as_u64).map_or(prn, |svid| svid as u32);
    let constellation = sat_obj
        .get("gnssid")
        .and_then(Value::as_u64)
        .map_or_else(|| Constellation::from_prn(prn), Constellation::from_gnssid);

    let (Some(az), Some(el)) = (get_f64(sat_obj, "az"), get_f64(sat_obj, "el")) else {
        debug!("Satellite {} has no position yet", prn);
        return None;
    };

    Some(
        SatelliteObservation::new(id, constellation, az as f32, el as f32)
            .used(sat_obj.get("used").and_then(Value::as_bool).unwrap_or(false))
            .signal(get_f64(sat_obj, "ss").unwrap_or(0.0) as f32),
    )
}

/// ATT (attitude), carries the compass heading
fn parse_att_message(state: &mut GnssState, msg_data: &Map<String, Value>) {
    if let Some(heading) = get_f64(msg_data, "heading") {
        state.heading = Some(normalize_heading(heading as f32));
    }
}

fn parse_version_message(msg_data: &Map<String, Value>) {
    if let Some(version) = msg_data.get("release").and_then(Value::as_str) {
        info!("Connected to gpsd version {}", version);
    }
}

fn parse_devices_message(msg_data: &Map<String, Value>) {
    if let Some(devices) = msg_data.get("devices").and_then(Value::as_array) {
        info!("gpsd managing {} device(s)", devices.len());
        for device in devices {
            if let Some(path) = device.get("path").and_then(Value::as_str) {
                debug!("gpsd device: {}", path);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::init_logger;

    #[test]
    fn test_tpv_parsing() {
        init_logger();
        let mut state = GnssState::new();
        let json = r#"{"class":"TPV","device":"/dev/ttyUSB0","mode":3,"time":"2023-01-01T12:00:00.000Z","ept":0.005,"lat":48.117,"lon":11.517,"alt":545.4,"epx":15.319,"epy":17.054,"epv":124.484,"track":10.3797,"speed":0.091,"climb":10.7,"eps":34.11,"epc":248.97}"#;

        parse_gpsd_json(&mut state, json).unwrap();

        assert_eq!(state.latitude, Some(48.117));
        assert_eq!(state.longitude, Some(11.517));
        assert_eq!(state.altitude, Some(545.4));
        assert_eq!(state.mode, Some(3));
        assert!((state.speed.unwrap() - 0.3276).abs() < 0.001);
        assert_eq!(state.course, Some(10.3797));
    }

    #[test]
    fn test_sky_parsing() {
        let mut state = GnssState::new();
        let json = r#"{"class":"SKY","device":"/dev/ttyUSB0","hdop":1.2,"satellites":[{"PRN":1,"gnssid":0,"svid":1,"az":83.0,"el":40.0,"ss":42,"used":true},{"PRN":70,"gnssid":6,"svid":6,"az":200.0,"el":12.0,"ss":28,"used":false},{"PRN":301,"az":10.0,"el":5.0,"ss":31},{"PRN":9,"ss":20,"used":false}]}"#;

        parse_gpsd_json(&mut state, json).unwrap();

        assert_eq!(state.hdop, Some(1.2));
        let observations = state.observations().unwrap();
        // the satellite without az/el is left out
        assert_eq!(observations.len(), 3);
        assert_eq!(observations[0].constellation, Constellation::Gps);
        assert!(observations[0].used_in_fix);
        assert_eq!(observations[0].signal_strength_db_hz, 42.0);
        assert_eq!(observations[1].id, 6);
        assert_eq!(observations[1].constellation, Constellation::Glonass);
        assert_eq!(observations[2].constellation, Constellation::Galileo);
        assert!(!observations[2].used_in_fix);
    }

    #[test]
    fn test_sky_without_satellites_keeps_snapshot() {
        let mut state = GnssState::new();
        let sky = r#"{"class":"SKY","satellites":[{"PRN":3,"az":1.0,"el":2.0}]}"#;
        parse_gpsd_json(&mut state, sky).unwrap();
        parse_gpsd_json(&mut state, r#"{"class":"SKY","hdop":0.8}"#).unwrap();
        assert_eq!(state.observations().map(|obs| obs.len()), Some(1));
        assert_eq!(state.hdop, Some(0.8));
    }

    #[test]
    fn test_att_heading() {
        let mut state = GnssState::new();
        parse_gpsd_json(&mut state, r#"{"class":"ATT","heading":-10.0}"#).unwrap();
        assert_eq!(state.heading, Some(350.0));
    }

    #[test]
    fn test_invalid_json() {
        let mut state = GnssState::new();
        let result = parse_gpsd_json(&mut state, r#"{"invalid": json"#);
        assert!(matches!(result, Err(SkyviewError::Parse(_))));
    }
}
