//! Default system categories
//!
//! Every activated account receives the same fixed set of income
//! categories. They are flagged as system categories and never modified
//! afterwards. Seeding is idempotent: rows that already exist for the
//! owner are left untouched.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;
use uuid::Uuid;

use crate::{database::begin_write, error::DatabaseResult};

/// Names of the income categories every account starts with
pub const DEFAULT_INCOME_CATEGORIES: [&str; 5] = [
    "Wages",
    "Scholarship",
    "Business",
    "Deposit interest",
    "Other income",
];

const INCOME_CODE: &str = "INCOME";

/// Insert the default categories for one owner, returning how many rows
/// were actually created.
///
/// Takes a connection so callers can run it inside their own transaction.
pub async fn seed_default_categories(
    conn: &mut SqliteConnection,
    owner_id: Uuid,
) -> DatabaseResult<u64> {
    let now = Utc::now();
    let mut created = 0;

    for name in DEFAULT_INCOME_CATEGORIES {
        let result = sqlx::query(
            r#"
            INSERT INTO categories (id, owner_id, name, kind_code, system_category, created_at)
            VALUES ($1, $2, $3, $4, 1, $5)
            ON CONFLICT (owner_id, name, kind_code) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(owner_id)
        .bind(name)
        .bind(INCOME_CODE)
        .bind(now)
        .execute(&mut *conn)
        .await
        .map_err(crate::error::DatabaseError::Query)?;

        if result.rows_affected() > 0 {
            info!("Created default income category '{}' for user {}", name, owner_id);
            created += result.rows_affected();
        }
    }

    Ok(created)
}

/// Backfill default categories for every existing user
pub async fn seed_all_users(pool: &SqlitePool) -> DatabaseResult<u64> {
    let user_ids: Vec<Uuid> = sqlx::query_scalar("SELECT id FROM users")
        .fetch_all(pool)
        .await
        .map_err(crate::error::DatabaseError::Query)?;

    let mut tx = begin_write(pool)
        .await
        .map_err(crate::error::DatabaseError::Query)?;
    let mut created = 0;
    for user_id in user_ids {
        created += seed_default_categories(&mut *tx, user_id).await?;
    }
    tx.commit()
        .await
        .map_err(crate::error::DatabaseError::Query)?;

    Ok(created)
}
