//! Shared fixtures for the API integration tests

#![allow(dead_code)]

use api::models::{CategoryKind, CategoryRequest, TransactionRequest};
use auth::{UserRepository, models::NewUser};
use chrono::{DateTime, Utc};
use common::{
    Identity,
    database::{DatabaseConfig, connect},
};
use rust_decimal::Decimal;
use sqlx::SqlitePool;
use std::str::FromStr;
use tempfile::TempDir;
use uuid::Uuid;

pub async fn pool() -> SqlitePool {
    connect(&DatabaseConfig::in_memory())
        .await
        .expect("in-memory database")
}

/// File-backed pool with several connections, for tests that need real
/// concurrent writers. The directory must outlive the pool.
pub async fn file_pool(max_connections: u32) -> (TempDir, SqlitePool) {
    let dir = TempDir::new().expect("temp dir");
    let config = DatabaseConfig {
        database_url: format!("sqlite://{}?mode=rwc", dir.path().join("finance.db").display()),
        max_connections,
        min_connections: 1,
        connection_timeout: 30,
    };
    let pool = connect(&config).await.expect("file database");
    (dir, pool)
}

/// Create an active account (with its default categories) and return its identity
pub async fn user(pool: &SqlitePool, username: &str) -> Identity {
    let users = UserRepository::new(pool.clone());
    let user = users
        .create(&NewUser {
            username: username.to_string(),
            password_hash: UserRepository::hash_password("s3cret").expect("hash"),
            first_name: None,
            last_name: None,
        })
        .await
        .expect("create user");
    Identity::new(user.id, user.username)
}

pub fn category(name: &str, kind: CategoryKind) -> CategoryRequest {
    CategoryRequest {
        name: name.to_string(),
        kind,
    }
}

pub fn date(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .expect("rfc3339 date")
        .with_timezone(&Utc)
}

pub fn entry(category_id: Uuid, amount: &str, operation_date: &str) -> TransactionRequest {
    TransactionRequest {
        category_id,
        amount: Decimal::from_str(amount).expect("decimal amount"),
        operation_date: date(operation_date),
        description: None,
    }
}
