//! Auth API routes

use domain_users::{AuthService, PgUserRepository};

use crate::state::AppState;

/// Auth service backed by the users table. Also serves as the bearer-token
/// authenticator for protected routes.
pub fn service(state: &AppState) -> AuthService<PgUserRepository> {
    AuthService::new(PgUserRepository::new(state.db.clone()), state.jwt.clone())
}
