//! Per-sensor polling loop.
//!
//! Each configured sensor gets its own [`Poller`] running in its own task.
//! A cycle reads the sensor file, publishes the result to the sensor's
//! gauges and sleeps: the success interval after a reading, the error
//! interval after any failure. Failures never stop the loop and there is
//! no backoff growth; a sensor that keeps failing simply keeps publishing
//! NaN, and alerting on that is left to whoever scrapes the endpoint.
//!
//! Reads run on tokio's blocking pool, so a hung filesystem stalls only
//! the poller waiting on it.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use envgauge_core::reader::{ReadingSource, SensorFile};
use envgauge_core::sensor::SensorSpec;
use envgauge_core::types::SensorId;

use crate::registry::{GaugeRegistry, RegistryError, SensorGauges};

/// A spawned poller task tagged with the sensor it serves.
pub type PollerHandle = (SensorId, JoinHandle<()>);

/// Drives one sensor's read → publish → sleep cycle.
pub struct Poller<S = SensorFile> {
    sensor_id: SensorId,
    source: Arc<S>,
    gauges: SensorGauges,
    success_interval: Duration,
    error_interval: Duration,
    failing: bool,
}

impl Poller<SensorFile> {
    /// Poller reading the data file named in `spec`.
    pub fn new(spec: &SensorSpec, gauges: SensorGauges) -> Self {
        Self::with_source(spec, SensorFile::new(spec.file_path.clone()), gauges)
    }
}

impl<S: ReadingSource> Poller<S> {
    /// Poller pulling readings from an arbitrary source, on `spec`'s intervals.
    pub fn with_source(spec: &SensorSpec, source: S, gauges: SensorGauges) -> Self {
        Self {
            sensor_id: spec.id,
            source: Arc::new(source),
            gauges,
            success_interval: spec.success_interval,
            error_interval: spec.error_interval,
            failing: false,
        }
    }

    /// Run a single cycle and return how long to sleep before the next one.
    pub async fn poll_once(&mut self) -> Duration {
        let source = Arc::clone(&self.source);

        match tokio::task::spawn_blocking(move || source.read()).await {
            Ok(Ok(reading)) => {
                self.gauges.set(&reading);

                if self.failing {
                    tracing::info!(sensor_id = self.sensor_id, "Sensor recovered");
                    self.failing = false;
                }
                tracing::info!(
                    sensor_id = self.sensor_id,
                    temperature_celsius = reading.temperature_celsius,
                    humidity_percent = reading.humidity_percent,
                    "Read environment data",
                );

                self.success_interval
            }
            Ok(Err(e)) => {
                tracing::warn!(
                    sensor_id = self.sensor_id,
                    kind = e.kind(),
                    path = %e.path().display(),
                    error = %e,
                    "Error reading environment data",
                );
                self.publish_unknown()
            }
            Err(e) => {
                tracing::error!(
                    sensor_id = self.sensor_id,
                    error = %e,
                    "Sensor read task failed",
                );
                self.publish_unknown()
            }
        }
    }

    fn publish_unknown(&mut self) -> Duration {
        self.gauges.set_unknown();
        self.failing = true;
        self.error_interval
    }

    /// Poll until `cancel` is triggered.
    ///
    /// The first read happens immediately. Cancellation is observed both
    /// while a read is in flight and while sleeping. Without cancellation
    /// this never returns.
    pub async fn run(mut self, cancel: CancellationToken) {
        let sensor_id = self.sensor_id;
        tracing::info!(
            sensor_id,
            success_interval_secs = self.success_interval.as_secs(),
            error_interval_secs = self.error_interval.as_secs(),
            "Sensor poller started",
        );

        loop {
            let delay = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                delay = self.poll_once() => delay,
            };

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        tracing::info!(sensor_id, "Sensor poller stopping");
    }
}

/// Spawn one poller task per sensor.
///
/// Each task receives its own gauge handle up front, so the loop never
/// touches the registry map.
pub fn spawn_pollers(
    registry: &GaugeRegistry,
    specs: &[SensorSpec],
    cancel: &CancellationToken,
) -> Result<Vec<PollerHandle>, RegistryError> {
    let pollers = specs
        .iter()
        .map(|spec| {
            registry
                .get(spec.id)
                .map(|gauges| Poller::new(spec, gauges))
                .ok_or(RegistryError::UnknownSensor(spec.id))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(pollers
        .into_iter()
        .map(|poller| {
            let sensor_id = poller.sensor_id;
            (sensor_id, tokio::spawn(poller.run(cancel.child_token())))
        })
        .collect())
}

/// Wait for cancelled pollers, giving each at most `timeout`.
///
/// Pollers that panicked or did not stop in time are logged with their
/// sensor ID. Returns how many of them there were.
pub async fn join_pollers(pollers: Vec<PollerHandle>, timeout: Duration) -> usize {
    let mut unclean = 0;

    for (sensor_id, handle) in pollers {
        match tokio::time::timeout(timeout, handle).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::warn!(sensor_id, error = %e, "Sensor poller task failed");
                unclean += 1;
            }
            Err(_) => {
                tracing::warn!(
                    sensor_id,
                    timeout_secs = timeout.as_secs(),
                    "Sensor poller did not stop in time",
                );
                unclean += 1;
            }
        }
    }

    unclean
}
