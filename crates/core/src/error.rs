use std::path::PathBuf;
use std::time::Duration;

use crate::types::Timestamp;

/// Why a sensor data file could not produce a reading.
///
/// Every variant is recoverable: the poller logs it, publishes NaN and
/// tries again on its error interval.
#[derive(Debug, thiserror::Error)]
pub enum SensorError {
    #[error("Sensor file {} is unavailable: {source}", .path.display())]
    Unavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "Sensor file {} is stale: last modified {modified} ({}s ago)",
        .path.display(),
        .age.as_secs()
    )]
    Stale {
        path: PathBuf,
        modified: Timestamp,
        age: Duration,
    },

    #[error("Sensor file {} is malformed: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl SensorError {
    /// Short label for structured log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            SensorError::Unavailable { .. } => "unavailable",
            SensorError::Stale { .. } => "stale",
            SensorError::Malformed { .. } => "malformed",
        }
    }

    /// Path of the file the failed read was attempted on.
    pub fn path(&self) -> &std::path::Path {
        match self {
            SensorError::Unavailable { path, .. }
            | SensorError::Stale { path, .. }
            | SensorError::Malformed { path, .. } => path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_labels_are_distinct() {
        let unavailable = SensorError::Unavailable {
            path: PathBuf::from("/tmp/missing.json"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        let stale = SensorError::Stale {
            path: PathBuf::from("/tmp/old.json"),
            modified: chrono::Utc::now(),
            age: Duration::from_secs(600),
        };
        let malformed = SensorError::Malformed {
            path: PathBuf::from("/tmp/bad.json"),
            source: serde_json::from_str::<serde_json::Value>("{").unwrap_err(),
        };

        assert_eq!(unavailable.kind(), "unavailable");
        assert_eq!(stale.kind(), "stale");
        assert_eq!(malformed.kind(), "malformed");
    }

    #[test]
    fn stale_message_reports_age_in_seconds() {
        let err = SensorError::Stale {
            path: PathBuf::from("/tmp/old.json"),
            modified: chrono::Utc::now(),
            age: Duration::from_secs(361),
        };
        let message = err.to_string();
        assert!(message.contains("/tmp/old.json"), "got: {message}");
        assert!(message.contains("361s ago"), "got: {message}");
        assert_eq!(err.path(), std::path::Path::new("/tmp/old.json"));
    }
}
