//! Exporter configuration loaded from a YAML file.
//!
//! The file path comes from `CONFIG_FILE_PATH` (default `config.yaml`).
//! Any failure to locate, read or parse it is fatal at startup.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use serde::Deserialize;

use envgauge_core::sensor::SensorSpec;
use envgauge_core::types::SensorId;

/// Config file used when `CONFIG_FILE_PATH` is not set.
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

const DEFAULT_SERVER_ADDR: &str = ":8080";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid server address '{addr}': {reason}")]
    InvalidAddr { addr: String, reason: String },
}

/// Top-level shape of the config file.
#[derive(Debug, Clone, Deserialize)]
pub struct ExporterConfig {
    #[serde(default)]
    pub sensors: Vec<SensorConfig>,
    #[serde(default)]
    pub server: ServerConfig,
}

/// One `sensors:` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct SensorConfig {
    pub id: SensorId,
    pub file_path: PathBuf,
    pub temperature_gauge_name: String,
    pub humidity_gauge_name: String,
    /// Seconds between polls after a successful read (default: `30`).
    #[serde(default)]
    pub query_interval: Option<u64>,
    /// Seconds between polls after a failed read (default: `10`).
    #[serde(default)]
    pub error_interval: Option<u64>,
}

/// HTTP server settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address, either `host:port` or `:port` (default: `:8080`).
    #[serde(default = "default_addr")]
    pub addr: String,
    /// HTTP request timeout in seconds (default: `30`).
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_addr() -> String {
    DEFAULT_SERVER_ADDR.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl ExporterConfig {
    /// Load configuration using environment variables.
    ///
    /// | Env Var            | Default       |
    /// |--------------------|---------------|
    /// | `CONFIG_FILE_PATH` | `config.yaml` |
    /// | `SERVER_ADDR`      | `server.addr` from the file |
    pub fn from_env() -> Result<Self, ConfigError> {
        let path = std::env::var("CONFIG_FILE_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
        let mut config = Self::load(Path::new(&path))?;

        if let Ok(addr) = std::env::var("SERVER_ADDR") {
            config.server.addr = addr;
        }

        Ok(config)
    }

    /// Read and parse a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Sensor specs in config file order, with interval defaults applied.
    pub fn sensor_specs(&self) -> Vec<SensorSpec> {
        self.sensors.iter().map(SensorConfig::to_spec).collect()
    }
}

impl SensorConfig {
    pub fn to_spec(&self) -> SensorSpec {
        SensorSpec::new(
            self.id,
            self.file_path.clone(),
            self.temperature_gauge_name.clone(),
            self.humidity_gauge_name.clone(),
            self.query_interval,
            self.error_interval,
        )
    }
}

impl ServerConfig {
    /// Resolve the bind address. A bare `:port` binds every IPv4 interface.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidAddr {
            addr: self.addr.clone(),
            reason,
        };

        match self.addr.strip_prefix(':') {
            Some(port) => {
                let port: u16 = port.parse().map_err(|e| invalid(format!("bad port: {e}")))?;
                Ok(SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port))
            }
            None => self.addr.parse().map_err(|e| invalid(format!("{e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use assert_matches::assert_matches;

    use super::*;

    const FULL: &str = r#"
sensors:
  - id: 1
    file_path: /var/lib/sensors/box.json
    temperature_gauge_name: box_temperature_celsius
    humidity_gauge_name: box_humidity_percentage
    query_interval: 15
    error_interval: 5
  - id: 2
    file_path: /var/lib/sensors/room.json
    temperature_gauge_name: room_temperature_celsius
    humidity_gauge_name: room_humidity_percentage
server:
  addr: "127.0.0.1:9100"
"#;

    fn parse(raw: &str) -> ExporterConfig {
        serde_yaml::from_str(raw).unwrap()
    }

    #[test]
    fn parses_sensors_in_order() {
        let config = parse(FULL);
        let specs = config.sensor_specs();

        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].id, 1);
        assert_eq!(specs[0].temperature_gauge_name, "box_temperature_celsius");
        assert_eq!(specs[0].success_interval, Duration::from_secs(15));
        assert_eq!(specs[0].error_interval, Duration::from_secs(5));
        assert_eq!(specs[1].id, 2);
        assert_eq!(specs[1].file_path, PathBuf::from("/var/lib/sensors/room.json"));
    }

    #[test]
    fn omitted_intervals_use_defaults() {
        let specs = parse(FULL).sensor_specs();
        assert_eq!(specs[1].success_interval, Duration::from_secs(30));
        assert_eq!(specs[1].error_interval, Duration::from_secs(10));
    }

    #[test]
    fn server_section_is_optional() {
        let config = parse("sensors: []\n");
        assert_eq!(config.server.addr, ":8080");
        assert_eq!(config.server.request_timeout_secs, 30);
        assert!(config.sensors.is_empty());
    }

    #[test]
    fn sensor_missing_gauge_name_fails_to_parse() {
        let raw = "sensors:\n  - id: 1\n    file_path: /tmp/a.json\n    temperature_gauge_name: t\n";
        assert!(serde_yaml::from_str::<ExporterConfig>(raw).is_err());
    }

    #[test]
    fn bare_port_binds_all_interfaces() {
        let server = ServerConfig {
            addr: ":8080".into(),
            ..Default::default()
        };
        assert_eq!(server.socket_addr().unwrap(), "0.0.0.0:8080".parse().unwrap());
    }

    #[test]
    fn explicit_host_is_kept() {
        let server = parse(FULL).server;
        assert_eq!(server.socket_addr().unwrap(), "127.0.0.1:9100".parse().unwrap());
    }

    #[test]
    fn invalid_addr_is_rejected() {
        for addr in [":http", "localhost", "", ":70000"] {
            let server = ServerConfig {
                addr: addr.into(),
                ..Default::default()
            };
            assert_matches!(server.socket_addr(), Err(ConfigError::InvalidAddr { .. }), "addr: {addr}");
        }
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ExporterConfig::load(&dir.path().join("nope.yaml")).unwrap_err();
        assert_matches!(err, ConfigError::Read { .. });
    }

    #[test]
    fn load_reports_parse_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "sensors: {not: [a list").unwrap();

        assert_matches!(ExporterConfig::load(&path), Err(ConfigError::Parse { .. }));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, FULL).unwrap();

        let config = ExporterConfig::load(&path).unwrap();
        assert_eq!(config.sensors.len(), 2);
    }
}
