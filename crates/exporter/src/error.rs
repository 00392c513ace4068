use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Encoding the current metric values failed.
    #[error("Metrics encoding error: {0}")]
    Metrics(#[from] prometheus::Error),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::Metrics(err) => {
                tracing::error!(error = %err, "Failed to encode metrics");
                (StatusCode::INTERNAL_SERVER_ERROR, "METRICS_ENCODING_ERROR")
            }
        };

        let body = json!({
            "error": self.to_string(),
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;

    use super::*;

    #[tokio::test]
    async fn metrics_error_is_internal_server_error_json() {
        let response = AppError::Metrics(prometheus::Error::Msg("boom".into())).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["code"], "METRICS_ENCODING_ERROR");
        assert!(json["error"].as_str().unwrap().contains("boom"));
    }
}
