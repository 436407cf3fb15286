use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use shortwave_core::StoreError;
use tracing::error;

use crate::model::ErrorResponse;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Store(StoreError),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            AppError::Store(err) => {
                let status = match &err {
                    StoreError::DuplicateUrl(_) => StatusCode::CONFLICT,
                    StoreError::NotFound(_) => StatusCode::NOT_FOUND,
                    StoreError::EmptyBatch | StoreError::InvalidId(_) => StatusCode::BAD_REQUEST,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                if status == StatusCode::INTERNAL_SERVER_ERROR {
                    error!(error = %err, "storage failure");
                    (status, "internal error".to_owned())
                } else {
                    (status, err.to_string())
                }
            }
        };

        (status, Json(ErrorResponse { message })).into_response()
    }
}
