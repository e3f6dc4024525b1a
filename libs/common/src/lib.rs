//! Common library for the personal finance services
//!
//! This crate provides shared functionality used by the auth and api
//! services: database connectivity and migrations, the service error
//! taxonomy, the caller `Identity`, settings loading and the default
//! category seeding.
//!
//! ```rust,no_run
//! use common::database::{DatabaseConfig, connect, health_check};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DatabaseConfig::from_env()?;
//!     let pool = connect(&config).await?;
//!     let is_healthy = health_check(&pool).await?;
//!     assert!(is_healthy);
//!     Ok(())
//! }
//! ```

pub mod database;
pub mod error;
pub mod identity;
pub mod seed;
pub mod settings;

pub use error::{ErrorKind, ServiceError, ServiceResult};
pub use identity::Identity;

