use crate::services::relay::RelayError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

pub const UPLOAD_FAILED_MESSAGE: &str = "Failed to upload file";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        fields: Vec<String>,
    },

    #[error("Not Found: {0}")]
    NotFound(String),

    /// Fetch or forward failure; always reported as 500
    #[error("Relay failed: {0}")]
    Relay(RelayError),
}

impl From<RelayError> for AppError {
    fn from(err: RelayError) -> Self {
        match err {
            RelayError::Validation { message, fields } => AppError::Validation {
                message: message.to_string(),
                fields,
            },
            other => AppError::Relay(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::Validation { message, fields } => {
                let body = if fields.is_empty() {
                    json!({ "error": message })
                } else {
                    json!({ "error": message, "fields": fields })
                };
                (StatusCode::BAD_REQUEST, body)
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "message": msg })),
            AppError::Relay(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "error": UPLOAD_FAILED_MESSAGE,
                    "details": err.details(),
                }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_upstream_failure_keeps_outer_500() {
        let err: AppError = RelayError::Upstream {
            status: 422,
            body: json!({"err": "bad doc"}),
        }
        .into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_validation_maps_to_400() {
        let err: AppError = RelayError::Validation {
            message: "All fields are required",
            fields: vec!["refId".to_string()],
        }
        .into();
        assert!(matches!(err, AppError::Validation { .. }));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_details_shapes() {
        let upstream = RelayError::Upstream {
            status: 422,
            body: json!({"err": "bad doc"}),
        };
        assert_eq!(
            upstream.details(),
            json!({"status": 422, "data": {"err": "bad doc"}})
        );

        let transport = RelayError::Transport("connection refused".to_string());
        let details: Value = transport.details();
        assert_eq!(details, json!({"message": "connection refused"}));
    }
}
