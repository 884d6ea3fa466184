use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    /// A request parameter failed allow-list or shape validation.
    /// Raised before the first store round-trip.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// The upstream store failed. `context` names the failing query so the
    /// log line alone is enough to reproduce it; clients only ever see a
    /// generic message.
    #[error("store error during {context}: {source}")]
    Store {
        context: &'static str,
        #[source]
        source: sqlx::Error,
    },
}

impl AppError {
    /// Wraps an `sqlx::Error` with the name of the failing query.
    /// Intended for `.map_err(AppError::store("..."))` at query call sites.
    pub fn store(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
        move |source| AppError::Store { context, source }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::InvalidParameter(msg) => {
                (StatusCode::BAD_REQUEST, "INVALID_PARAMETER", msg.clone())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Store { context, source } => {
                tracing::error!("store error during {context}: {source}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORE_ERROR",
                    "An upstream store error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    async fn response_parts(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn invalid_parameter_maps_to_400() {
        let (status, body) =
            response_parts(AppError::InvalidParameter("bad sortBy".to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_PARAMETER");
        assert_eq!(body["error"]["message"], "bad sortBy");
    }

    #[tokio::test]
    async fn not_found_maps_to_404() {
        let (status, body) = response_parts(AppError::NotFound("User u1 not found".to_string())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn store_error_maps_to_500_without_driver_details() {
        let (status, body) = response_parts(AppError::Store {
            context: "user page query",
            source: sqlx::Error::PoolClosed,
        })
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "STORE_ERROR");
        // The context and driver error go to the log, never to the client.
        let message = body["error"]["message"].as_str().unwrap();
        assert!(!message.contains("pool"));
        assert!(!message.contains("user page query"));
    }
}
