// src/config.rs
//! Configuration management

use crate::{
    error::{Result, SkyviewError},
    monitor::GnssSource,
};
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkyviewConfig {
    pub source_type: String,  // "serial", "gpsd"
    pub serial_port: Option<String>,
    pub serial_baudrate: Option<u32>,
    pub gpsd_host: Option<String>,
    pub gpsd_port: Option<u16>,
    pub terminal: bool,
}

impl Default for SkyviewConfig {
    fn default() -> Self {
        Self {
            source_type: "gpsd".to_string(),
            serial_port: None,
            serial_baudrate: Some(9600),
            gpsd_host: Some("localhost".to_string()),
            gpsd_port: Some(2947),
            terminal: !cfg!(feature = "gui"),
        }
    }
}

/// Per-user directory holding the config and preference files
pub fn config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| SkyviewError::Config("HOME environment variable not set".to_string()))?;

    Ok(PathBuf::from(home).join(".config").join("gnss-skyview"))
}

impl SkyviewConfig {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load from `path`; a missing file gives the defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        serde_json::from_str(&contents)
            .map_err(|e| SkyviewError::Config(format!("Failed to parse config file: {}", e)))
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(config_dir()?.join("config.json"))
    }

    /// Select the serial source, replacing only the settings given
    pub fn update_serial(&mut self, port: Option<String>, baudrate: Option<u32>) {
        self.source_type = "serial".to_string();
        if port.is_some() {
            self.serial_port = port;
        }
        if baudrate.is_some() {
            self.serial_baudrate = baudrate;
        }
    }

    /// Select gpsd, replacing only the settings given
    pub fn update_gpsd(&mut self, host: Option<String>, port: Option<u16>) {
        self.source_type = "gpsd".to_string();
        if host.is_some() {
            self.gpsd_host = host;
        }
        if port.is_some() {
            self.gpsd_port = port;
        }
    }

    /// Resolve the configured positioning source
    pub fn source(&self) -> Result<GnssSource> {
        match self.source_type.as_str() {
            "serial" => {
                let port = self
                    .serial_port
                    .clone()
                    .ok_or_else(|| SkyviewError::Config("serial source needs a port".to_string()))?;
                Ok(GnssSource::Serial {
                    port,
                    baudrate: self.serial_baudrate.unwrap_or(9600),
                })
            }
            "gpsd" => Ok(GnssSource::Gpsd {
                host: self.gpsd_host.clone().unwrap_or_else(|| "localhost".to_string()),
                port: self.gpsd_port.unwrap_or(2947),
            }),
            other => Err(SkyviewError::Config(format!("unknown source type '{}'", other))),
        }
    }
}
