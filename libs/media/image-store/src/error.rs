use axum_helpers::AppError;
use thiserror::Error;

pub type ImageStoreResult<T> = Result<T, ImageStoreError>;

#[derive(Debug, Error)]
pub enum ImageStoreError {
    #[error("Only JPEG, PNG, WebP, and GIF images are allowed")]
    UnsupportedType(String),

    #[error("File size must be less than 10MB")]
    TooLarge(usize),

    #[error("No files provided")]
    NoFiles,

    #[error("Maximum {0} images allowed")]
    TooManyFiles(usize),

    /// Provider rejected or failed the upload. The detail is logged where it
    /// happens and never shown to clients.
    #[error("Failed to upload image")]
    Upload(String),

    #[error("Failed to delete image: {0}")]
    Delete(String),
}

impl From<ImageStoreError> for AppError {
    fn from(err: ImageStoreError) -> Self {
        AppError::InvalidUpload(err.to_string())
    }
}
