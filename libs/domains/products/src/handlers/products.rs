use axum::{
    Json,
    extract::{Multipart, Query, State, multipart::MultipartRejection, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use axum_helpers::{AppError, AuditEvent, AuditOutcome, CurrentUser, UuidPath, ValidatedJson};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use super::TAG;
use super::multipart;
use crate::error::{ProductError, ProductResult};
use crate::models::{CreateProduct, PaginatedProducts, Product, ProductQuery, UpdateProduct};
use crate::repository::ProductRepository;
use crate::service::ProductService;

type SharedService<R> = State<Arc<ProductService<R>>>;

/// Records a mutation of an existing product; ownership refusals are `Denied`.
fn audit<T>(user: &CurrentUser, action: &str, product: Uuid, result: &ProductResult<T>) {
    let outcome = match result {
        Ok(_) => AuditOutcome::Success,
        Err(ProductError::Forbidden(_)) => AuditOutcome::Denied,
        Err(_) => AuditOutcome::Failure,
    };
    AuditEvent::new(
        Some(user.id),
        action,
        Some(format!("product:{product}")),
        outcome,
    )
    .log();
}

/// Ownership gate for updates, run before the body is looked at.
async fn authorize<R: ProductRepository>(
    service: &ProductService<R>,
    user: &CurrentUser,
    id: Uuid,
) -> ProductResult<()> {
    let result = service.authorize_update(id, user.id).await;
    if result.is_err() {
        audit(user, "product.update", id, &result);
    }
    result
}

/// List products, newest first
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    params(ProductQuery),
    responses(
        (status = 200, description = "One page of products", body = PaginatedProducts),
        (status = 400, description = "Invalid page or limit"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_products<R: ProductRepository>(
    State(service): SharedService<R>,
    Query(query): Query<ProductQuery>,
) -> ProductResult<Json<PaginatedProducts>> {
    Ok(Json(service.list(query).await?))
}

/// Get a product by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = String, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product found", body = Product),
        (status = 400, description = "Invalid product ID"),
        (status = 404, description = "Product not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_product<R: ProductRepository>(
    State(service): SharedService<R>,
    UuidPath(id): UuidPath,
) -> ProductResult<Json<Product>> {
    Ok(Json(service.get_one(id).await?))
}

/// Create a product from JSON with already-hosted image URLs
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    request_body = CreateProduct,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Product created", body = Product),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Missing or invalid token"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn create_product<R: ProductRepository>(
    State(service): SharedService<R>,
    user: CurrentUser,
    ValidatedJson(input): ValidatedJson<CreateProduct>,
) -> ProductResult<impl IntoResponse> {
    let product = service.create(input, (&user).into()).await?;

    AuditEvent::new(
        Some(user.id),
        "product.create",
        Some(format!("product:{}", product.id)),
        AuditOutcome::Success,
    )
    .log();

    Ok((StatusCode::CREATED, Json(product)))
}

/// Create a product, uploading the attached image files
///
/// Text parts: `name`, `price`, `description`, and any number of `images`
/// holding URLs. File parts named `images` are uploaded and appended.
#[utoipa::path(
    post,
    path = "/with-images",
    tag = TAG,
    request_body(content_type = "multipart/form-data", description = "name, price, description, images"),
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Product created", body = Product),
        (status = 400, description = "Invalid form, image type/size or more than 5 images"),
        (status = 401, description = "Missing or invalid token"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn create_product_with_images<R: ProductRepository>(
    State(service): SharedService<R>,
    user: CurrentUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, AppError> {
    let (form, files) = multipart::create_form(multipart?).await?;
    let file_count = files.len();

    let input = form.into_create()?;
    let product = service
        .create_with_images(input, files, (&user).into())
        .await?;

    AuditEvent::new(
        Some(user.id),
        "product.create",
        Some(format!("product:{}", product.id)),
        AuditOutcome::Success,
    )
    .with_details(json!({ "uploaded": file_count }))
    .log();

    Ok((StatusCode::CREATED, Json(product)))
}

/// Replace fields and images from a multipart form
///
/// `existingImages` is a JSON array of URLs to keep; uploaded `images`
/// files are appended to it.
#[utoipa::path(
    put,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = String, Path, description = "Product ID")
    ),
    request_body(content_type = "multipart/form-data", description = "name, price, description, existingImages, images"),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Product updated", body = Product),
        (status = 400, description = "Invalid form or more than 5 images"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Product not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn update_product_with_images<R: ProductRepository>(
    State(service): SharedService<R>,
    user: CurrentUser,
    UuidPath(id): UuidPath,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Product>, AppError> {
    authorize(&service, &user, id).await?;
    let (form, files) = multipart::update_form(multipart?).await?;

    let result = service.update_with_images(id, form, files, user.id).await;
    audit(&user, "product.update", id, &result);

    Ok(Json(result?))
}

/// Partially update a product from JSON
#[utoipa::path(
    patch,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = String, Path, description = "Product ID")
    ),
    request_body = UpdateProduct,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Product updated", body = Product),
        (status = 400, description = "Invalid input or more than 5 images"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Product not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn update_product<R: ProductRepository>(
    State(service): SharedService<R>,
    user: CurrentUser,
    UuidPath(id): UuidPath,
    payload: Result<Json<UpdateProduct>, JsonRejection>,
) -> Result<Json<Product>, AppError> {
    authorize(&service, &user, id).await?;
    let Json(input) = payload?;

    let result = service.update(id, input, user.id).await;
    audit(&user, "product.update", id, &result);

    Ok(Json(result?))
}

/// Delete a product and its stored images
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = String, Path, description = "Product ID")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Product not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn delete_product<R: ProductRepository>(
    State(service): SharedService<R>,
    user: CurrentUser,
    UuidPath(id): UuidPath,
) -> ProductResult<StatusCode> {
    let result = service.remove(id, user.id).await;
    audit(&user, "product.delete", id, &result);

    result?;
    Ok(StatusCode::NO_CONTENT)
}
