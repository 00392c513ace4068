//! Per-sensor gauge registry.
//!
//! [`GaugeRegistry`] is built once at startup from the sensor specs. Each
//! sensor gets a temperature and a humidity gauge registered with the
//! registry's own Prometheus [`Registry`]; the sensor-to-gauges map is
//! never modified afterwards, only the gauge values change.
//!
//! A gauge value of NaN means "no valid current reading". Scrape consumers
//! must treat it as missing data rather than as a measurement.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, PoisonError, RwLock};

use prometheus::{Encoder, Gauge, Opts, Registry, TextEncoder};

use envgauge_core::reader::Reading;
use envgauge_core::sensor::SensorSpec;
use envgauge_core::types::SensorId;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Duplicate sensor id {0} in configuration")]
    DuplicateSensorId(SensorId),

    #[error("Metric name '{name}' of sensor {sensor_id} is already in use")]
    DuplicateMetricName { sensor_id: SensorId, name: String },

    #[error("Cannot register metric '{name}' for sensor {sensor_id}: {source}")]
    InvalidMetric {
        sensor_id: SensorId,
        name: String,
        #[source]
        source: prometheus::Error,
    },

    #[error("No gauges registered for sensor {0}")]
    UnknownSensor(SensorId),
}

/// Handle to one sensor's temperature and humidity gauges.
///
/// Cheap to clone. Only the sensor's own poller should write through it.
#[derive(Clone)]
pub struct SensorGauges {
    temperature: Gauge,
    humidity: Gauge,
    pair_lock: Arc<RwLock<()>>,
}

impl SensorGauges {
    /// Publish a reading. Both gauges change together.
    pub fn set(&self, reading: &Reading) {
        self.set_pair(reading.temperature_celsius, reading.humidity_percent);
    }

    /// Publish "no valid reading" by setting both gauges to NaN.
    pub fn set_unknown(&self) {
        self.set_pair(f64::NAN, f64::NAN);
    }

    pub fn temperature(&self) -> f64 {
        self.temperature.get()
    }

    pub fn humidity(&self) -> f64 {
        self.humidity.get()
    }

    /// Whether the sensor currently has no valid reading.
    pub fn is_unknown(&self) -> bool {
        self.temperature().is_nan() && self.humidity().is_nan()
    }

    fn set_pair(&self, temperature: f64, humidity: f64) {
        // Writers share the lock; only a scrape takes it exclusively.
        let _guard = self.pair_lock.read().unwrap_or_else(PoisonError::into_inner);
        self.temperature.set(temperature);
        self.humidity.set(humidity);
    }
}

/// Mapping from sensor ID to its gauges, plus the collector they live in.
pub struct GaugeRegistry {
    registry: Registry,
    sensors: HashMap<SensorId, SensorGauges>,
    metric_names: BTreeSet<String>,
    pair_lock: Arc<RwLock<()>>,
}

impl GaugeRegistry {
    /// Create and register two gauges per sensor.
    ///
    /// Fails on duplicate sensor IDs, on a metric name used twice (across
    /// sensors or within one), and on names Prometheus rejects. Nothing is
    /// registered globally, so building twice from the same specs is fine.
    pub fn build(specs: &[SensorSpec]) -> Result<Self, RegistryError> {
        let registry = Registry::new();
        let pair_lock = Arc::new(RwLock::new(()));
        let mut sensors = HashMap::with_capacity(specs.len());
        let mut metric_names = BTreeSet::new();

        for spec in specs {
            if sensors.contains_key(&spec.id) {
                return Err(RegistryError::DuplicateSensorId(spec.id));
            }

            let temperature = register_gauge(
                &registry,
                &mut metric_names,
                spec.id,
                &spec.temperature_gauge_name,
                format!("Current temperature in celsius for sensor {}", spec.id),
            )?;
            let humidity = register_gauge(
                &registry,
                &mut metric_names,
                spec.id,
                &spec.humidity_gauge_name,
                format!("Current humidity in percentage for sensor {}", spec.id),
            )?;

            let gauges = SensorGauges {
                temperature,
                humidity,
                pair_lock: Arc::clone(&pair_lock),
            };
            gauges.set_unknown();
            sensors.insert(spec.id, gauges);

            tracing::debug!(
                sensor_id = spec.id,
                temperature_gauge = %spec.temperature_gauge_name,
                humidity_gauge = %spec.humidity_gauge_name,
                "Registered sensor gauges",
            );
        }

        Ok(Self {
            registry,
            sensors,
            metric_names,
            pair_lock,
        })
    }

    /// Gauges for one sensor, or `None` if the ID was not configured.
    pub fn get(&self, id: SensorId) -> Option<SensorGauges> {
        self.sensors.get(&id).cloned()
    }

    pub fn sensor_count(&self) -> usize {
        self.sensors.len()
    }

    /// Every registered metric name, sorted.
    pub fn metric_names(&self) -> &BTreeSet<String> {
        &self.metric_names
    }

    /// Encode the current value of every gauge in the Prometheus text format.
    pub fn gather_text(&self) -> Result<String, prometheus::Error> {
        let families = {
            let _guard = self.pair_lock.write().unwrap_or_else(PoisonError::into_inner);
            self.registry.gather()
        };

        let mut buf = Vec::new();
        TextEncoder::new().encode(&families, &mut buf)?;
        String::from_utf8(buf).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

fn register_gauge(
    registry: &Registry,
    metric_names: &mut BTreeSet<String>,
    sensor_id: SensorId,
    name: &str,
    help: String,
) -> Result<Gauge, RegistryError> {
    if !metric_names.insert(name.to_string()) {
        return Err(RegistryError::DuplicateMetricName {
            sensor_id,
            name: name.to_string(),
        });
    }

    let invalid = |source| RegistryError::InvalidMetric {
        sensor_id,
        name: name.to_string(),
        source,
    };

    let gauge = Gauge::with_opts(Opts::new(name, help)).map_err(invalid)?;
    registry.register(Box::new(gauge.clone())).map_err(invalid)?;
    Ok(gauge)
}
