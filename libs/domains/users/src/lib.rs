//! Users Domain
//!
//! Account registration, password login and bearer-token authentication.
//!
//! # Features
//!
//! - Argon2id password hashing (salted PHC strings, never the raw password)
//! - HS256 access tokens binding user id and email
//! - [`AuthService`] implements [`axum_helpers::TokenAuthenticator`], so other
//!   domains can protect routes without depending on this crate
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← POST /auth/register, POST /auth/login
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ AuthService │  ← Validation, hashing, token issue/verify
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Credential store (trait + in-memory / Postgres)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← User, DTOs
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use axum_helpers::{JwtAuth, JwtConfig};
//! use domain_users::{AuthService, InMemoryUserRepository, handlers};
//!
//! let jwt = JwtAuth::new(&JwtConfig::new("a-secret-that-is-at-least-32-chars-long"));
//! let service = AuthService::new(InMemoryUserRepository::new(), jwt);
//!
//! let router = axum::Router::new().nest("/auth", handlers::router(service));
//! ```

pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::{UserError, UserResult};
pub use models::{AuthResponse, LoginRequest, RegisterRequest, User, UserProfile};
pub use postgres::PgUserRepository;
pub use repository::{InMemoryUserRepository, UserRepository};
pub use service::AuthService;
