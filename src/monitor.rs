// src/monitor.rs
//! Positioning source coordination

use crate::{
    error::{Result, SkyviewError},
    gnss::{data::GnssState, gpsd, nmea::NmeaParser},
};
use log::{debug, error, info, warn};
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, PoisonError, RwLock,
    },
    time::Duration,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_serial::SerialPortBuilderExt;

/// Positioning source configuration
#[derive(Debug, Clone, PartialEq)]
pub enum GnssSource {
    Serial { port: String, baudrate: u32 },
    Gpsd { host: String, port: u16 },
}

impl GnssSource {
    pub fn name(&self) -> &'static str {
        match self {
            GnssSource::Serial { .. } => "Serial NMEA",
            GnssSource::Gpsd { .. } => "gpsd",
        }
    }
}

/// Owns the shared state the positioning task writes and displays read
#[derive(Clone)]
pub struct GnssMonitor {
    state: Arc<RwLock<GnssState>>,
    running: Arc<AtomicBool>,
}

impl GnssMonitor {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(GnssState::new())),
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn shared_state(&self) -> Arc<RwLock<GnssState>> {
        Arc::clone(&self.state)
    }

    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// Start reading from the given source in a background task
    pub async fn start(&self, source: GnssSource) -> Result<()> {
        match source {
            GnssSource::Serial { port, baudrate } => self.connect_serial(&port, baudrate).await,
            GnssSource::Gpsd { host, port } => self.connect_gpsd(&host, port).await,
        }
    }

    async fn connect_serial(&self, port: &str, baudrate: u32) -> Result<()> {
        info!("Connecting to GNSS receiver on {} at {} baud", port, baudrate);

        let serial = tokio_serial::new(port, baudrate)
            .timeout(Duration::from_millis(1000))
            .open_native_async()
            .map_err(|e| match e.kind {
                tokio_serial::ErrorKind::Io(std::io::ErrorKind::PermissionDenied) => {
                    SkyviewError::PermissionDenied(port.to_string())
                }
                _ => {
                    SkyviewError::Connection(format!("Failed to open serial port {}: {}", port, e))
                }
            })?;

        info!("Connected to {}", port);

        let state = Arc::clone(&self.state);
        let running = Arc::clone(&self.running);

        tokio::spawn(async move {
            let mut reader = BufReader::new(serial);
            let mut parser = NmeaParser::new();
            let mut line = String::new();

            while running.load(Ordering::Relaxed) {
                line.clear();
                match reader.read_line(&mut line).await {
                    Ok(0) => {
                        warn!("Serial port closed");
                        break;
                    }
                    Ok(_) => ingest_nmea_line(&state, &mut parser, line.trim()),
                    Err(e) if e.kind() == std::io::ErrorKind::TimedOut => continue,
                    Err(e) => {
                        error!("Error reading from serial port: {}", e);
                        break;
                    }
                }
            }
        });

        Ok(())
    }

    async fn connect_gpsd(&self, host: &str, port: u16) -> Result<()> {
        info!("Connecting to gpsd at {}:{}", host, port);

        let mut reader = gpsd::connect_gpsd(host, port).await?;
        info!("Connected to gpsd");

        let state = Arc::clone(&self.state);
        let running = Arc::clone(&self.running);

        tokio::spawn(async move {
            let mut line = String::new();

            while running.load(Ordering::Relaxed) {
                line.clear();
                match reader.read_line(&mut line).await {
                    Ok(0) => {
                        warn!("gpsd closed the connection");
                        break;
                    }
                    Ok(_) => ingest_gpsd_line(&state, line.trim()),
                    Err(e) => {
                        error!("Error reading from gpsd: {}", e);
                        break;
                    }
                }
            }
        });

        Ok(())
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Clone of the current state
    pub fn snapshot(&self) -> GnssState {
        read_state(&self.state)
    }
}

impl Default for GnssMonitor {
    fn default() -> Self {
        Self::new()
    }
}

/// Clone the shared state, tolerating a writer that panicked mid-update
pub fn read_state(state: &RwLock<GnssState>) -> GnssState {
    state.read().unwrap_or_else(PoisonError::into_inner).clone()
}

pub fn ingest_nmea_line(state: &RwLock<GnssState>, parser: &mut NmeaParser, line: &str) {
    if line.is_empty() {
        return;
    }
    let mut guard = state.write().unwrap_or_else(PoisonError::into_inner);
    guard.update_timestamp();
    guard.add_raw_line(line);
    guard.set_source("Serial NMEA");
    parser.parse_sentence(&mut guard, line);
}

pub fn ingest_gpsd_line(state: &RwLock<GnssState>, line: &str) {
    if line.is_empty() {
        return;
    }
    let mut guard = state.write().unwrap_or_else(PoisonError::into_inner);
    guard.update_timestamp();
    guard.add_raw_line(line);
    guard.set_source("gpsd");
    if let Err(e) = gpsd::parse_gpsd_json(&mut guard, line) {
        debug!("{}", e);
    }
}

/// List available serial ports
pub fn list_serial_ports() -> Result<Vec<String>> {
    let ports = tokio_serial::available_ports()?;
    Ok(ports
        .into_iter()
        .map(|port| format!("{} - {:?}", port.port_name, port.port_type))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingest_nmea_updates_shared_state() {
        let monitor = GnssMonitor::new();
        let state = monitor.shared_state();
        let mut parser = NmeaParser::new();

        ingest_nmea_line(&state, &mut parser, "$GPGSV,1,1,02,01,40,083,46,02,17,308,41*7D");
        ingest_nmea_line(&state, &mut parser, "");

        let snapshot = monitor.snapshot();
        assert_eq!(snapshot.source.as_deref(), Some("Serial NMEA"));
        assert_eq!(snapshot.raw_history.len(), 1);
        assert_eq!(snapshot.observations().map(|obs| obs.len()), Some(2));
        assert!(snapshot.timestamp.is_some());
    }

    #[test]
    fn test_ingest_gpsd_ignores_bad_lines() {
        let monitor = GnssMonitor::new();
        let state = monitor.shared_state();

        ingest_gpsd_line(&state, "not json");
        ingest_gpsd_line(&state, r#"{"class":"TPV","lat":1.5,"lon":2.5}"#);

        let snapshot = monitor.snapshot();
        assert_eq!(snapshot.raw_history.len(), 2);
        assert!(snapshot.has_fix());
    }

    #[test]
    fn test_stop_clears_running() {
        let monitor = GnssMonitor::new();
        assert!(monitor.is_running());
        monitor.clone().stop();
        assert!(!monitor.is_running());
    }

    #[tokio::test]
    async fn test_gpsd_refused_is_connection_error() {
        let monitor = GnssMonitor::new();
        // port 1 on loopback is not expected to accept connections
        let result = monitor
            .start(GnssSource::Gpsd { host: "127.0.0.1".to_string(), port: 1 })
            .await;
        assert!(matches!(result, Err(SkyviewError::Connection(_))));
    }
}
