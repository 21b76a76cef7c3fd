//! REST error mapping.

use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use efficy_sdk::models::DEFAULT_CONTENT_TYPE;
use efficy_sdk::{EfficyError, ErrorKind};

use super::dto::ErrorBody;
use crate::domain::DomainError;

pub type ApiResult<T> = Result<T, ApiError>;

/// Error rendered as `{"error": "..."}` with the status of its kind.
#[derive(Debug)]
pub struct ApiError(EfficyError);

impl ApiError {
    #[must_use]
    pub fn error(&self) -> &EfficyError {
        &self.0
    }
}

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        Self(e.into())
    }
}

impl From<EfficyError> for ApiError {
    fn from(e: EfficyError) -> Self {
        Self(e)
    }
}

/// `{"error": message}` with `status`.
#[must_use]
pub fn json_error(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
        .into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;

        // Upstream rejections keep the CRM's own status and body.
        if let EfficyError::Upstream { status, body } = err {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            return (
                status,
                [(header::CONTENT_TYPE, HeaderValue::from_static(DEFAULT_CONTENT_TYPE))],
                body,
            )
                .into_response();
        }

        match err.kind() {
            ErrorKind::Internal => tracing::error!(error = %err, "request failed"),
            ErrorKind::Transport => tracing::warn!(error = %err, "Efficy unreachable"),
            _ => tracing::debug!(error = %err, "request rejected"),
        }

        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        json_error(status, err.public_message())
    }
}
