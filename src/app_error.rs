use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::{
    cart::CartError,
    checkout::CheckoutError,
    store::StoreError,
};

/// Envelope every JSON endpoint answers with.
#[derive(Debug, Serialize, ToSchema)]
pub struct StdResponse<T> {
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> StdResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            data: Some(data),
            message: Some(message.into()),
        }
    }
}

impl<T: Serialize> IntoResponse for StdResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found")]
    NotFound,
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    ForbiddenResource(String),
    #[error("{0}")]
    Conflict(String),
    /// A checkout the shopper can fix or retry; the text is shown to them as-is.
    #[error("{0}")]
    Checkout(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => AppError::NotFound,
            StoreError::Other(err) => AppError::Other(err),
        }
    }
}

impl From<CartError> for AppError {
    fn from(err: CartError) -> Self {
        match err {
            CartError::InvalidQuantity | CartError::NegativePrice | CartError::TotalOverflow => {
                AppError::BadRequest(err.to_string())
            }
            CartError::Storage(err) => AppError::Other(err.into()),
        }
    }
}

impl From<CheckoutError> for AppError {
    fn from(err: CheckoutError) -> Self {
        AppError::Checkout(err.user_message())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::ForbiddenResource(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Checkout(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Internal details stay in the logs.
        let message = match &self {
            AppError::Other(err) => {
                tracing::error!(error = ?err, "Request failed");
                "Internal server error".to_owned()
            }
            other => other.to_string(),
        };

        (
            status,
            Json(StdResponse::<()> {
                data: None,
                message: Some(message),
            }),
        )
            .into_response()
    }
}
