//! Sensor data file reader.
//!
//! A sensor driver periodically rewrites a small JSON file such as
//! `{"TempC": 21.5, "Humidity": 44.0}`. The file's modification time is
//! part of its meaning: content older than [`STALENESS_THRESHOLD`] is
//! rejected even when it parses.
//!
//! No locking is attempted. If the driver rewrites the file between the
//! metadata check and the read, whatever is read wins; a truncated read
//! surfaces as [`SensorError::Malformed`] and is retried on the next poll.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use serde::Deserialize;

use crate::error::SensorError;
use crate::types::Timestamp;

/// Maximum age of a data file's modification time before its content is unusable.
pub const STALENESS_THRESHOLD: Duration = Duration::from_secs(5 * 60);

/// One temperature/humidity pair read from a single file at a single instant.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Reading {
    #[serde(rename = "TempC")]
    pub temperature_celsius: f64,
    #[serde(rename = "Humidity")]
    pub humidity_percent: f64,
}

/// Something a poller can pull readings from.
///
/// `read` may block; pollers call it on the blocking thread pool.
pub trait ReadingSource: Send + Sync + 'static {
    fn read(&self) -> Result<Reading, SensorError>;
}

/// A [`ReadingSource`] backed by a sensor data file on disk.
#[derive(Debug, Clone)]
pub struct SensorFile {
    path: PathBuf,
}

impl SensorFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ReadingSource for SensorFile {
    fn read(&self) -> Result<Reading, SensorError> {
        read_reading(&self.path)
    }
}

/// Read and validate a sensor data file against the current wall clock.
pub fn read_reading(path: &Path) -> Result<Reading, SensorError> {
    read_reading_at(path, SystemTime::now())
}

/// Read and validate a sensor data file as of `now`.
///
/// A modification time in the future is treated as fresh. A file exactly
/// [`STALENESS_THRESHOLD`] old is still accepted.
pub fn read_reading_at(path: &Path, now: SystemTime) -> Result<Reading, SensorError> {
    let unavailable = |source| SensorError::Unavailable {
        path: path.to_path_buf(),
        source,
    };

    let modified = fs::metadata(path)
        .and_then(|meta| meta.modified())
        .map_err(unavailable)?;

    if let Ok(age) = now.duration_since(modified) {
        if age > STALENESS_THRESHOLD {
            return Err(SensorError::Stale {
                path: path.to_path_buf(),
                modified: Timestamp::from(modified),
                age,
            });
        }
    }

    let bytes = fs::read(path).map_err(unavailable)?;

    parse_reading(&bytes).map_err(|source| SensorError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse file content into a [`Reading`].
///
/// Both fields are required and must be JSON numbers; unknown fields are ignored.
pub fn parse_reading(bytes: &[u8]) -> Result<Reading, serde_json::Error> {
    serde_json::from_slice(bytes)
}
