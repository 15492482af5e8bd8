use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use leaderhook_core::AppError;
use serde::Serialize;

/// Status API error payload.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    message: String,
}

/// HTTP error wrapper around core application errors.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(value: AppError) -> Self {
        Self(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Configuration(_)
            | AppError::Coordination(_)
            | AppError::Transport(_)
            | AppError::MissingHolderIdentity(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let payload = Json(ErrorResponse {
            message: self.0.to_string(),
        });

        (status, payload).into_response()
    }
}

/// Standard status API result type.
pub type ApiResult<T> = Result<T, ApiError>;
