use std::sync::Arc;

use crate::registry::GaugeRegistry;

/// Shared application state available to all Axum handlers via `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    /// Sensor gauges read on every scrape. Pollers hold their own handles.
    pub registry: Arc<GaugeRegistry>,
}
