use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Failure taxonomy shared by every handler and extractor. Each variant maps
/// to exactly one response class, so a handler only decides which failure
/// domain it is in, never the status code.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad or missing input, duplicate email.
    #[error("{0}")]
    Validation(String),
    /// Missing, garbled, invalid or expired access token; bad credentials.
    #[error("{0}")]
    Authentication(String),
    /// Valid identity, wrong role.
    #[error("{0}")]
    Authorization(String),
    /// Plan, subscription or route absent.
    #[error("{0}")]
    NotFound(String),
    /// Unexpected storage or signing failure. Detail is logged server-side;
    /// the caller sees a sanitized message.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Authentication(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Authorization(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Internal(e) => {
                error!(error = %e, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Server error".to_string())
            }
        };
        (status, Json(ErrorBody { message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_message(resp: Response) -> String {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("read body");
        let v: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
        v["message"].as_str().expect("message field").to_string()
    }

    #[test]
    fn variants_map_to_distinct_status_codes() {
        let cases = [
            (
                ApiError::Validation("bad".into()).into_response().status(),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::Authentication("no".into())
                    .into_response()
                    .status(),
                StatusCode::UNAUTHORIZED,
            ),
            (
                ApiError::Authorization("role".into())
                    .into_response()
                    .status(),
                StatusCode::FORBIDDEN,
            ),
            (
                ApiError::NotFound("gone".into()).into_response().status(),
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError::Internal(anyhow::anyhow!("boom"))
                    .into_response()
                    .status(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (got, want) in cases {
            assert_eq!(got, want);
        }
    }

    #[tokio::test]
    async fn error_body_carries_message() {
        let resp = ApiError::NotFound("Plan not found".into()).into_response();
        assert_eq!(body_message(resp).await, "Plan not found");
    }

    #[tokio::test]
    async fn internal_detail_is_sanitized() {
        let resp = ApiError::Internal(anyhow::anyhow!("connection refused at 10.0.0.3"))
            .into_response();
        let msg = body_message(resp).await;
        assert_eq!(msg, "Server error");
        assert!(!msg.contains("10.0.0.3"));
    }
}
