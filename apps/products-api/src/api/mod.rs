//! API routes module

pub mod auth;
pub mod health;
pub mod products;

use axum::{Router, routing::get};
use axum_helpers::SharedAuthenticator;
use std::sync::Arc;

use crate::state::AppState;

/// Creates the API routes without the `/api` prefix, which
/// `create_router` adds.
///
/// One `AuthService` handles `/auth` and authenticates bearer tokens for
/// the protected product and upload routes.
pub fn routes(state: &AppState) -> Router {
    let auth_service = auth::service(state);
    let authenticator: SharedAuthenticator = Arc::new(auth_service.clone());

    Router::new()
        .nest("/auth", domain_users::handlers::router(auth_service))
        .nest("/products", products::router(state, authenticator.clone()))
        .nest("/upload", products::upload_router(state, authenticator))
}

/// `/ready`, outside `/api` like the `/health` route from `create_router`.
pub fn ready_router(state: AppState) -> Router {
    Router::new()
        .route("/ready", get(health::ready_handler))
        .with_state(state)
}

/// Apply the database schema
pub async fn init_schema(state: &AppState) -> eyre::Result<()> {
    products::init_schema(state).await
}
