//! Prometheus scrape endpoint.

use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::{routing::get, Router};

use crate::error::AppResult;
use crate::state::AppState;

/// GET /metrics -- current value of every sensor gauge.
///
/// Sensors without a valid reading report `NaN`.
async fn scrape(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let body = state.registry.gather_text()?;
    Ok(([(CONTENT_TYPE, prometheus::TEXT_FORMAT)], body))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/metrics", get(scrape))
}
