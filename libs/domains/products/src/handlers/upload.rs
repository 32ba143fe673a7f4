use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartRejection},
    http::StatusCode,
    response::IntoResponse,
};
use axum_helpers::{AppError, CurrentUser};
use image_store::ImageStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use super::UPLOAD_TAG;
use super::multipart;

type SharedStore = State<Arc<dyn ImageStore>>;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadedImage {
    pub message: String,
    pub image_url: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadedImages {
    pub message: String,
    pub image_urls: Vec<String>,
}

/// Upload one image (field `image`)
#[utoipa::path(
    post,
    path = "/single",
    tag = UPLOAD_TAG,
    request_body(content_type = "multipart/form-data", description = "image"),
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Image uploaded", body = UploadedImage),
        (status = 400, description = "Missing file, bad type/size or provider failure"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn upload_single(
    State(store): SharedStore,
    user: CurrentUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, AppError> {
    let files = multipart::collect(multipart?, "image", |_, _| {}).await?;
    let Some(file) = files.into_iter().next() else {
        return Err(AppError::BadRequest("No file uploaded".to_string()));
    };

    let image_url = store.upload(file).await?;
    tracing::info!(user_id = %user.id, url = %image_url, "Image uploaded");

    Ok((
        StatusCode::CREATED,
        Json(UploadedImage {
            message: "Image uploaded successfully".to_string(),
            image_url,
        }),
    ))
}

/// Upload up to five images (field `images`)
#[utoipa::path(
    post,
    path = "/multiple",
    tag = UPLOAD_TAG,
    request_body(content_type = "multipart/form-data", description = "images"),
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Images uploaded", body = UploadedImages),
        (status = 400, description = "Missing files, more than 5, bad type/size or provider failure"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn upload_multiple(
    State(store): SharedStore,
    user: CurrentUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, AppError> {
    let files = multipart::collect(multipart?, "images", |_, _| {}).await?;
    if files.is_empty() {
        return Err(AppError::BadRequest("No files uploaded".to_string()));
    }

    let image_urls = store.upload_many(files).await?;
    tracing::info!(user_id = %user.id, count = image_urls.len(), "Images uploaded");

    Ok((
        StatusCode::CREATED,
        Json(UploadedImages {
            message: "Images uploaded successfully".to_string(),
            image_urls,
        }),
    ))
}
