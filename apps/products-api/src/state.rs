//! Application state management

use axum_helpers::JwtAuth;
use image_store::ImageStore;
use std::sync::Arc;

/// Shared application state, cloned into the routers that need it.
#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    /// PostgreSQL connection pool
    pub db: database::postgres::DatabaseConnection,
    pub jwt: JwtAuth,
    pub images: Arc<dyn ImageStore>,
}
