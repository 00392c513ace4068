//! Per-sensor polling specification.

use std::path::PathBuf;
use std::time::Duration;

use crate::types::SensorId;

/// Poll interval after a successful read when none is configured.
pub const DEFAULT_SUCCESS_INTERVAL: Duration = Duration::from_secs(30);

/// Poll interval after a failed read when none is configured.
pub const DEFAULT_ERROR_INTERVAL: Duration = Duration::from_secs(10);

/// Everything a poller needs to know about one sensor.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorSpec {
    pub id: SensorId,
    /// JSON data file written by the sensor driver.
    pub file_path: PathBuf,
    pub temperature_gauge_name: String,
    pub humidity_gauge_name: String,
    pub success_interval: Duration,
    pub error_interval: Duration,
}

impl SensorSpec {
    /// Build a spec from raw configuration values.
    ///
    /// Intervals are whole seconds; `None` or `0` selects the default.
    pub fn new(
        id: SensorId,
        file_path: impl Into<PathBuf>,
        temperature_gauge_name: impl Into<String>,
        humidity_gauge_name: impl Into<String>,
        success_interval_secs: Option<u64>,
        error_interval_secs: Option<u64>,
    ) -> Self {
        Self {
            id,
            file_path: file_path.into(),
            temperature_gauge_name: temperature_gauge_name.into(),
            humidity_gauge_name: humidity_gauge_name.into(),
            success_interval: interval_or_default(success_interval_secs, DEFAULT_SUCCESS_INTERVAL),
            error_interval: interval_or_default(error_interval_secs, DEFAULT_ERROR_INTERVAL),
        }
    }
}

/// Convert an optional seconds value into a [`Duration`], treating `0` as unset.
pub fn interval_or_default(secs: Option<u64>, default: Duration) -> Duration {
    match secs {
        Some(secs) if secs > 0 => Duration::from_secs(secs),
        _ => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_intervals_fall_back_to_defaults() {
        let spec = SensorSpec::new(1, "/tmp/s1.json", "t1", "h1", None, None);
        assert_eq!(spec.success_interval, Duration::from_secs(30));
        assert_eq!(spec.error_interval, Duration::from_secs(10));
    }

    #[test]
    fn zero_intervals_fall_back_to_defaults() {
        let spec = SensorSpec::new(1, "/tmp/s1.json", "t1", "h1", Some(0), Some(0));
        assert_eq!(spec.success_interval, DEFAULT_SUCCESS_INTERVAL);
        assert_eq!(spec.error_interval, DEFAULT_ERROR_INTERVAL);
    }

    #[test]
    fn configured_intervals_are_kept() {
        let spec = SensorSpec::new(7, "/tmp/s7.json", "t7", "h7", Some(5), Some(2));
        assert_eq!(spec.success_interval, Duration::from_secs(5));
        assert_eq!(spec.error_interval, Duration::from_secs(2));
        assert_eq!(spec.file_path, PathBuf::from("/tmp/s7.json"));
    }
}
