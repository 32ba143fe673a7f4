//! PostgreSQL connectivity for the catalog services.
//!
//! ```ignore
//! use core_config::FromEnv;
//! use database::postgres::{PostgresConfig, connect_from_config_with_retry};
//!
//! let db = connect_from_config_with_retry(PostgresConfig::from_env()?, None).await?;
//! ```
//!
//! Schema lives in plain SQL under `manifests/migrations/catalog/` and is
//! applied by operators (or by `test-utils` in integration tests).

pub mod common;
pub mod postgres;

pub use common::{DatabaseError, DatabaseResult};
