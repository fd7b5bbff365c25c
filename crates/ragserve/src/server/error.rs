//! HTTP error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use ragserve_core::Error;
use serde_json::json;
use tracing::error;

/// An error ready to be returned from a handler.
///
/// Validation problems keep their message; upstream and internal failures are
/// logged in full and surfaced with a generic message only.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    /// A 400 with the given user-facing detail.
    #[must_use]
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            detail: detail.into(),
        }
    }

    /// A 500 with the given user-facing detail.
    #[must_use]
    pub fn internal(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: detail.into(),
        }
    }

    /// The HTTP status.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The user-facing detail message.
    #[must_use]
    pub fn detail(&self) -> &str {
        &self.detail
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        if err.is_user_error() {
            Self::bad_request(err.to_string())
        } else {
            error!("request failed: {err}");
            Self::internal("internal error while processing the request")
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragserve_core::{ExtractError, LlmError, StoreError};

    #[test]
    fn test_validation_maps_to_400_with_message() {
        let api: ApiError = Error::Validation("question must not be empty".to_string()).into();
        assert_eq!(api.status(), StatusCode::BAD_REQUEST);
        assert_eq!(api.detail(), "question must not be empty");
    }

    #[test]
    fn test_unsupported_type_maps_to_400() {
        let api: ApiError = Error::from(ExtractError::UnsupportedType(".docx".to_string())).into();
        assert_eq!(api.status(), StatusCode::BAD_REQUEST);
        assert!(api.detail().contains(".docx"));
    }

    #[test]
    fn test_llm_failure_maps_to_500_with_generic_detail() {
        let api: ApiError = Error::from(LlmError::Connection("refused".to_string())).into();
        assert_eq!(api.status(), StatusCode::INTERNAL_SERVER_ERROR);
        // Upstream details must not leak to the client.
        assert!(!api.detail().contains("refused"));
    }

    #[test]
    fn test_store_failure_maps_to_500() {
        let api: ApiError = Error::from(StoreError::Query("corrupt index".to_string())).into();
        assert_eq!(api.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!api.detail().contains("corrupt"));
    }
}
