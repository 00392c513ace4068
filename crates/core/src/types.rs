/// Sensor identifiers are the integer IDs from the configuration file.
pub type SensorId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
