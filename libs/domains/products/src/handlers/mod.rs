mod multipart;
mod products;
mod upload;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post, put},
};
use axum_helpers::{SharedAuthenticator, jwt_auth_middleware};
use image_store::ImageStore;
use std::sync::Arc;
use utoipa::OpenApi;

pub use upload::{UploadedImage, UploadedImages};

use crate::models::{
    CreateProduct, PaginatedProducts, Product, ProductOwner, ProductQuery, UpdateProduct,
};
use crate::repository::ProductRepository;
use crate::service::ProductService;

const TAG: &str = "products";
const UPLOAD_TAG: &str = "upload";

/// OpenAPI documentation for the product endpoints
#[derive(OpenApi)]
#[openapi(
    paths(
        products::list_products,
        products::get_product,
        products::create_product,
        products::create_product_with_images,
        products::update_product_with_images,
        products::update_product,
        products::delete_product,
    ),
    components(
        schemas(Product, ProductOwner, CreateProduct, UpdateProduct, ProductQuery, PaginatedProducts)
    ),
    tags(
        (name = TAG, description = "Product catalog")
    )
)]
pub struct ApiDoc;

/// OpenAPI documentation for the standalone upload endpoints
#[derive(OpenApi)]
#[openapi(
    paths(upload::upload_single, upload::upload_multiple),
    components(schemas(UploadedImage, UploadedImages)),
    tags(
        (name = UPLOAD_TAG, description = "Image uploads")
    )
)]
pub struct UploadApiDoc;

/// Product routes, meant to be nested under `/products`
///
/// Reads are public; every mutation requires a bearer token.
pub fn router<R: ProductRepository + 'static>(
    service: ProductService<R>,
    authenticator: SharedAuthenticator,
) -> Router {
    let shared_service = Arc::new(service);

    let protected = Router::new()
        .route("/", post(products::create_product))
        .route("/with-images", post(products::create_product_with_images))
        .route(
            "/{id}",
            put(products::update_product_with_images)
                .patch(products::update_product)
                .delete(products::delete_product),
        )
        .route_layer(from_fn_with_state(authenticator, jwt_auth_middleware));

    Router::new()
        .route("/", get(products::list_products))
        .route("/{id}", get(products::get_product))
        .merge(protected)
        .with_state(shared_service)
}

/// Upload routes, meant to be nested under `/upload`
pub fn upload_router(store: Arc<dyn ImageStore>, authenticator: SharedAuthenticator) -> Router {
    Router::new()
        .route("/single", post(upload::upload_single))
        .route("/multiple", post(upload::upload_multiple))
        .route_layer(from_fn_with_state(authenticator, jwt_auth_middleware))
        .with_state(store)
}
