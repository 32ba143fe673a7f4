use axum::extract::multipart::MultipartError;
use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use image_store::ImageStoreError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ProductError {
    #[error("Product not found: {0}")]
    NotFound(Uuid),

    /// Caller does not own the product
    #[error("{0}")]
    Forbidden(&'static str),

    #[error("{0}")]
    TooManyImages(String),

    #[error("{0}")]
    InvalidQuery(String),

    #[error("{0}")]
    InvalidForm(String),

    #[error("Invalid input: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error(transparent)]
    Image(#[from] ImageStoreError),

    #[error("Multipart error: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

pub type ProductResult<T> = Result<T, ProductError>;

/// Convert ProductError to AppError for standardized error responses
impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::NotFound(_) => AppError::NotFound("Product not found".to_string()),
            ProductError::Forbidden(msg) => AppError::Forbidden(msg.to_string()),
            ProductError::TooManyImages(msg)
            | ProductError::InvalidQuery(msg)
            | ProductError::InvalidForm(msg) => AppError::BadRequest(msg),
            ProductError::Validation(errors) => AppError::ValidationError(errors),
            ProductError::Image(e) => e.into(),
            ProductError::Multipart(e) => AppError::Multipart(e),
            ProductError::Database(e) => AppError::Database(e),
        }
    }
}

impl IntoResponse for ProductError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
