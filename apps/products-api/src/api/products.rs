//! Products API routes

use axum::Router;
use axum_helpers::SharedAuthenticator;
use domain_products::{PgProductRepository, ProductService, handlers};
use sea_orm::ConnectionTrait;

use crate::state::AppState;

const SCHEMA: &str = include_str!("../../../../manifests/migrations/catalog/001_init.sql");

/// Create products router
pub fn router(state: &AppState, authenticator: SharedAuthenticator) -> Router {
    let repository = PgProductRepository::new(state.db.clone());
    let service = ProductService::new(repository, state.images.clone());
    handlers::router(service, authenticator)
}

/// Create upload router
pub fn upload_router(state: &AppState, authenticator: SharedAuthenticator) -> Router {
    handlers::upload_router(state.images.clone(), authenticator)
}

/// Apply the catalog schema. Every statement is `IF NOT EXISTS`.
pub async fn init_schema(state: &AppState) -> eyre::Result<()> {
    state
        .db
        .execute_unprepared(SCHEMA)
        .await
        .map_err(|e| eyre::eyre!("Failed to apply catalog schema: {}", e))?;
    Ok(())
}
