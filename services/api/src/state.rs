//! Application state shared across handlers

use auth::{IdentityResolver, JwtService, UserRepository};
use sqlx::SqlitePool;

use crate::{
    models::CategoryKind,
    stores::{CategoryStore, LedgerStore},
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub identity_resolver: IdentityResolver,
    pub categories: CategoryStore,
    pub incomes: LedgerStore,
    pub expenses: LedgerStore,
    pub transactions: LedgerStore,
}

impl AppState {
    pub fn new(db_pool: SqlitePool, jwt_service: JwtService) -> Self {
        let users = UserRepository::new(db_pool.clone());

        Self {
            identity_resolver: IdentityResolver::new(jwt_service, users),
            categories: CategoryStore::new(db_pool.clone()),
            incomes: LedgerStore::for_kind(db_pool.clone(), CategoryKind::Income),
            expenses: LedgerStore::for_kind(db_pool.clone(), CategoryKind::Expense),
            transactions: LedgerStore::unfiltered(db_pool.clone()),
            db_pool,
        }
    }
}
