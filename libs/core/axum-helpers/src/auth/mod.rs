//! Bearer-token authentication.
//!
//! [`JwtAuth`] signs and verifies HS256 tokens. Turning a verified token into
//! a [`CurrentUser`] is the job of a [`TokenAuthenticator`], supplied by the
//! users domain, which [`jwt_auth_middleware`] calls for protected routes.

pub mod config;
pub mod jwt;
pub mod middleware;

pub use config::JwtConfig;
pub use jwt::{JwtAuth, JwtClaims};
pub use middleware::{
    CurrentUser, SharedAuthenticator, TokenAuthenticator, extract_token_from_request,
    jwt_auth_middleware,
};
