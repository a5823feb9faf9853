use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::db::DbError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("user '{id}' not found")]
    NotFound { id: String },

    #[error(transparent)]
    Database(DbError),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Database(DbError::Constraint(_)) => StatusCode::CONFLICT,
            Self::Database(DbError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound { id } => Self::NotFound { id },
            other => Self::Database(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (kind, message) = match &self {
            Self::Validation(msg) => ("validation_error", msg.clone()),
            Self::NotFound { .. } => ("not_found", self.to_string()),
            Self::Database(DbError::Constraint(e)) => {
                tracing::warn!(error = %e, "constraint violation");
                ("conflict", "the request conflicts with stored data".to_string())
            }
            Self::Database(DbError::Unavailable(e)) => {
                tracing::error!(error = %e, "database unavailable");
                ("unavailable", "the database is currently unavailable".to_string())
            }
            Self::Database(e) => {
                tracing::error!(error = %e, "database error");
                ("internal_error", "an internal error occurred".to_string())
            }
        };

        (status, Json(json!({ "error": kind, "message": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn validation_is_400_with_message() {
        let response = ApiError::validation("limit is required").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "validation_error");
        assert_eq!(json["message"], "limit is required");
    }

    #[test]
    fn not_found_maps_to_404() {
        let err = ApiError::from(DbError::NotFound { id: "abc".into() });
        assert!(matches!(err, ApiError::NotFound { .. }));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn unavailable_maps_to_503() {
        let err = ApiError::from(DbError::Unavailable(sqlx::Error::PoolTimedOut));
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn decode_failures_hide_details() {
        let err = ApiError::from(DbError::Decode {
            column: "date_of_birth",
            value: "15-01-1990".into(),
        });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "internal_error");
        assert!(!json["message"].as_str().unwrap().contains("1990"));
    }
}
