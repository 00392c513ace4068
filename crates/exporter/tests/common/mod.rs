#![allow(dead_code)]

use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use envgauge_exporter::config::ServerConfig;
use envgauge_exporter::registry::GaugeRegistry;
use envgauge_exporter::router::build_app_router;
use envgauge_exporter::state::AppState;

/// Build the full application router over `registry`, with the same
/// middleware stack production uses.
pub fn build_test_app(registry: Arc<GaugeRegistry>) -> Router {
    let config = ServerConfig {
        addr: "127.0.0.1:0".to_string(),
        request_timeout_secs: 30,
    };
    build_app_router(AppState { registry }, &config)
}

/// Send a GET request to `uri`.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect a response body into a string.
pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Value of an unlabelled sample named `metric` in Prometheus text output.
pub fn sample_value(exposition: &str, metric: &str) -> Option<f64> {
    exposition
        .lines()
        .filter(|line| !line.starts_with('#'))
        .find_map(|line| {
            let (name, value) = line.split_once(' ')?;
            (name == metric).then(|| value.trim().parse().ok())?
        })
}

/// Write a sensor data file and pin its modification time to `age` ago.
pub fn write_sensor_file(path: &Path, content: &str, age: Duration) {
    let mut file = std::fs::File::create(path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file.set_modified(SystemTime::now() - age).unwrap();
}
