//! Authentication service
//!
//! Token service (registration, login, refresh), the identity resolver
//! used by the API service, and the `/api/auth/*` HTTP surface.

pub mod bootstrap;
pub mod identity;
pub mod jwt;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod service;
pub mod validation;

use sqlx::SqlitePool;

pub use identity::IdentityResolver;
pub use jwt::{JwtConfig, JwtService};
pub use repositories::UserRepository;
pub use service::AuthService;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub auth_service: AuthService,
}

impl AppState {
    pub fn new(db_pool: SqlitePool, jwt_service: JwtService) -> Self {
        let users = UserRepository::new(db_pool.clone());
        Self {
            auth_service: AuthService::new(users, jwt_service),
            db_pool,
        }
    }
}
