//! User repository for database operations
//!
//! Acts as the credential store: user lookup, password hashing and
//! verification. Account creation also seeds the owner's default
//! categories in the same database transaction.

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use chrono::Utc;
use common::{
    ServiceError, ServiceResult, database::begin_write, seed::seed_default_categories,
};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::models::{NewUser, User};

const USER_COLUMNS: &str =
    "id, username, password_hash, first_name, last_name, active, created_at, updated_at";

/// Hash with the default argon2 parameters that no account is stored with
const DUMMY_PASSWORD_HASH: &str = concat!(
    "$argon2id$v=19$m=19456,t=2,p=1",
    "$+FkwzXQ8IufC1dlzZRRvFA",
    "$kz8VDyOpj6PBGrYAfzG2fgEaplMJVOz478GUuXZ8Eqs",
);

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Hash a plaintext password into an argon2 PHC string
    pub fn hash_password(password: &str) -> ServiceResult<String> {
        let salt = SaltString::generate(&mut rand::thread_rng());
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| ServiceError::internal(format!("Failed to hash password: {}", e)))
    }

    /// Whether a stored hash is a well-formed PHC string
    pub fn is_valid_hash(password_hash: &str) -> bool {
        PasswordHash::new(password_hash).is_ok()
    }

    /// Verify a user's password
    pub fn verify_password(&self, user: &User, password: &str) -> ServiceResult<bool> {
        let parsed_hash = PasswordHash::new(&user.password_hash)
            .map_err(|e| ServiceError::internal(format!("Failed to parse password hash: {}", e)))?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Spend the same argon2 work as a real check when no user matched,
    /// so unknown usernames answer in the same time as wrong passwords.
    pub fn verify_dummy_password(password: &str) {
        if let Ok(parsed_hash) = PasswordHash::new(DUMMY_PASSWORD_HASH) {
            let _ = Argon2::default().verify_password(password.as_bytes(), &parsed_hash);
        }
    }

    /// Create an active user and seed its default categories
    pub async fn create(&self, new_user: &NewUser) -> ServiceResult<User> {
        info!("Creating new user: {}", new_user.username);

        let now = Utc::now();
        let mut tx = begin_write(&self.pool).await?;

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users
                (id, username, password_hash, first_name, last_name, active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, 1, $6, $6)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&new_user.username)
        .bind(&new_user.password_hash)
        .bind(&new_user.first_name)
        .bind(&new_user.last_name)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| ServiceError::on_unique_violation(e, "Username already exists"))?;

        seed_default_categories(&mut *tx, user.id).await?;
        tx.commit().await?;

        Ok(user)
    }

    /// Find a user by exact (case-sensitive) username
    pub async fn find_by_username(&self, username: &str) -> ServiceResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find a user by ID
    pub async fn find_by_id(&self, id: Uuid) -> ServiceResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Whether a username is already taken
    pub async fn username_exists(&self, username: &str) -> ServiceResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE username = $1")
            .bind(username)
            .fetch_one(&self.pool)
            .await?;

        Ok(count > 0)
    }

    /// Replace a user's stored password hash
    pub async fn update_password_hash(&self, id: Uuid, password_hash: &str) -> ServiceResult<()> {
        let result =
            sqlx::query("UPDATE users SET password_hash = $1, updated_at = $2 WHERE id = $3")
                .bind(password_hash)
                .bind(Utc::now())
                .bind(id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::not_found("User not found"));
        }
        Ok(())
    }

    /// Enable or disable an account
    pub async fn set_active(&self, id: Uuid, active: bool) -> ServiceResult<()> {
        let result = sqlx::query("UPDATE users SET active = $1, updated_at = $2 WHERE id = $3")
            .bind(active)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::not_found("User not found"));
        }
        Ok(())
    }

    /// Seed default categories for an existing account
    pub async fn seed_defaults(&self, id: Uuid) -> ServiceResult<u64> {
        let mut conn = self.pool.acquire().await?;
        Ok(seed_default_categories(&mut *conn, id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{
        ErrorKind,
        database::{DatabaseConfig, connect},
        seed::DEFAULT_INCOME_CATEGORIES,
    };

    async fn repository() -> UserRepository {
        let pool = connect(&DatabaseConfig::in_memory()).await.unwrap();
        UserRepository::new(pool)
    }

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            password_hash: UserRepository::hash_password("s3cret").unwrap(),
            first_name: Some("Alice".to_string()),
            last_name: None,
        }
    }

    #[test]
    fn test_dummy_hash_costs_the_same_as_a_real_hash() {
        let real = UserRepository::hash_password("s3cret").unwrap();
        let real = PasswordHash::new(&real).unwrap();
        let dummy = PasswordHash::new(DUMMY_PASSWORD_HASH).unwrap();

        assert_eq!(dummy.algorithm, real.algorithm);
        assert_eq!(dummy.version, real.version);
        assert_eq!(dummy.params, real.params);
        assert!(
            Argon2::default()
                .verify_password(b"s3cret", &dummy)
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_create_and_find_user() {
        let repo = repository().await;
        let user = repo.create(&new_user("alice")).await.unwrap();

        assert!(user.active);
        assert_eq!(user.first_name.as_deref(), Some("Alice"));

        let by_name = repo.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(by_name.id, user.id);

        let by_id = repo.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(by_id.username, "alice");

        assert!(repo.find_by_username("Alice").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_seeds_default_categories() {
        let repo = repository().await;
        let user = repo.create(&new_user("alice")).await.unwrap();

        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM categories WHERE owner_id = $1 AND system_category = 1",
        )
        .bind(user.id)
        .fetch_one(&repo.pool)
        .await
        .unwrap();
        assert_eq!(count, DEFAULT_INCOME_CATEGORIES.len() as i64);

        assert_eq!(repo.seed_defaults(user.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_username_is_a_conflict() {
        let repo = repository().await;
        repo.create(&new_user("alice")).await.unwrap();

        let err = repo.create(&new_user("alice")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(repo.username_exists("alice").await.unwrap());
        assert!(!repo.username_exists("bob").await.unwrap());
    }

    #[tokio::test]
    async fn test_verify_password() {
        let repo = repository().await;
        let user = repo.create(&new_user("alice")).await.unwrap();

        assert!(repo.verify_password(&user, "s3cret").unwrap());
        assert!(!repo.verify_password(&user, "wrong").unwrap());
    }

    #[tokio::test]
    async fn test_update_password_hash_and_active_flag() {
        let repo = repository().await;
        let user = repo.create(&new_user("alice")).await.unwrap();

        let hash = UserRepository::hash_password("n3w").unwrap();
        repo.update_password_hash(user.id, &hash).await.unwrap();
        repo.set_active(user.id, false).await.unwrap();

        let reloaded = repo.find_by_id(user.id).await.unwrap().unwrap();
        assert!(!reloaded.active);
        assert!(repo.verify_password(&reloaded, "n3w").unwrap());

        let err = repo.set_active(Uuid::new_v4(), true).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_hash_validity() {
        let hash = UserRepository::hash_password("s3cret").unwrap();
        assert!(UserRepository::is_valid_hash(&hash));
        assert!(!UserRepository::is_valid_hash("admin"));
    }
}
