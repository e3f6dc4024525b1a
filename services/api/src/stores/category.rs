//! Category store

use chrono::Utc;
use common::{Identity, ServiceError, ServiceResult, database::begin_write};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::models::{Category, CategoryKind, CategoryRequest};

/// Maximum category name length, in characters
pub const MAX_NAME_LEN: usize = 100;

const CATEGORY_COLUMNS: &str = "id, owner_id, name, kind_code, system_category, created_at";

const DUPLICATE_MESSAGE: &str = "Category with this name and type already exists";

/// Load a category and check that `identity` owns it
///
/// `NotFound` when no category has this id, `AccessDenied` when it
/// belongs to someone else.
pub(crate) async fn load_owned_category(
    conn: &mut SqliteConnection,
    identity: &Identity,
    id: Uuid,
) -> ServiceResult<Category> {
    let category = sqlx::query_as::<_, Category>(&format!(
        "SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| ServiceError::not_found("Category not found"))?;

    if !identity.owns(category.owner_id) {
        warn!(user_id = %identity.user_id, category_id = %id, "Access to foreign category denied");
        return Err(ServiceError::access_denied(
            "You do not have permission to access this category",
        ));
    }

    Ok(category)
}

fn validate_name(name: &str) -> ServiceResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ServiceError::validation("Category name is required"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(ServiceError::validation(format!(
            "Category name must be at most {} characters long",
            MAX_NAME_LEN
        )));
    }
    Ok(name.to_string())
}

/// Whether another category of the owner already uses `(name, kind)`
async fn name_taken(
    conn: &mut SqliteConnection,
    owner_id: Uuid,
    name: &str,
    kind: CategoryKind,
    exclude_id: Option<Uuid>,
) -> ServiceResult<bool> {
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM categories
        WHERE owner_id = $1 AND name = $2 AND kind_code = $3
          AND ($4 IS NULL OR id <> $4)
        "#,
    )
    .bind(owner_id)
    .bind(name)
    .bind(kind.code())
    .bind(exclude_id)
    .fetch_one(&mut *conn)
    .await?;

    Ok(count > 0)
}

/// CRUD over the caller's categories
#[derive(Clone)]
pub struct CategoryStore {
    pool: SqlitePool,
}

impl CategoryStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All categories of the caller
    pub async fn list_all(&self, identity: &Identity) -> ServiceResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE owner_id = $1 ORDER BY kind_code, name"
        ))
        .bind(identity.user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// The caller's categories of one kind
    pub async fn list_by_type(
        &self,
        identity: &Identity,
        kind: CategoryKind,
    ) -> ServiceResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories \
             WHERE owner_id = $1 AND kind_code = $2 ORDER BY name"
        ))
        .bind(identity.user_id)
        .bind(kind.code())
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    pub async fn get_by_id(&self, identity: &Identity, id: Uuid) -> ServiceResult<Category> {
        let mut conn = self.pool.acquire().await?;
        load_owned_category(&mut *conn, identity, id).await
    }

    /// Create a user category
    #[instrument(skip(self, identity, request), fields(user_id = %identity.user_id))]
    pub async fn create(
        &self,
        identity: &Identity,
        request: &CategoryRequest,
    ) -> ServiceResult<Category> {
        let name = validate_name(&request.name)?;
        let mut tx = begin_write(&self.pool).await?;

        if name_taken(&mut *tx, identity.user_id, &name, request.kind, None).await? {
            return Err(ServiceError::conflict(DUPLICATE_MESSAGE));
        }

        let category = sqlx::query_as::<_, Category>(&format!(
            r#"
            INSERT INTO categories (id, owner_id, name, kind_code, system_category, created_at)
            VALUES ($1, $2, $3, $4, 0, $5)
            RETURNING {CATEGORY_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(identity.user_id)
        .bind(&name)
        .bind(request.kind.code())
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| ServiceError::on_unique_violation(e, DUPLICATE_MESSAGE))?;

        tx.commit().await?;
        info!(category_id = %category.id, "Category created");
        Ok(category)
    }

    /// Rename or re-type a user category
    #[instrument(skip(self, identity, request), fields(user_id = %identity.user_id))]
    pub async fn update(
        &self,
        identity: &Identity,
        id: Uuid,
        request: &CategoryRequest,
    ) -> ServiceResult<Category> {
        let name = validate_name(&request.name)?;
        let mut tx = begin_write(&self.pool).await?;

        let current = load_owned_category(&mut *tx, identity, id).await?;
        if current.system_category {
            return Err(ServiceError::invalid_operation(
                "System categories cannot be modified",
            ));
        }

        let unchanged = current.name == name && current.kind == request.kind;
        if !unchanged
            && name_taken(&mut *tx, identity.user_id, &name, request.kind, Some(id)).await?
        {
            return Err(ServiceError::conflict(DUPLICATE_MESSAGE));
        }

        let category = sqlx::query_as::<_, Category>(&format!(
            r#"
            UPDATE categories SET name = $1, kind_code = $2
            WHERE id = $3 AND owner_id = $4
            RETURNING {CATEGORY_COLUMNS}
            "#
        ))
        .bind(&name)
        .bind(request.kind.code())
        .bind(id)
        .bind(identity.user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| ServiceError::on_unique_violation(e, DUPLICATE_MESSAGE))?;

        tx.commit().await?;
        info!(category_id = %id, "Category updated");
        Ok(category)
    }

    /// Delete a user category that no transaction references
    #[instrument(skip(self, identity), fields(user_id = %identity.user_id))]
    pub async fn delete(&self, identity: &Identity, id: Uuid) -> ServiceResult<()> {
        let mut tx = begin_write(&self.pool).await?;

        let current = load_owned_category(&mut *tx, identity, id).await?;
        if current.system_category {
            return Err(ServiceError::invalid_operation(
                "System categories cannot be deleted",
            ));
        }

        let in_use: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM transactions WHERE category_id = $1")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
        if in_use > 0 {
            return Err(ServiceError::invalid_operation("Category has transactions"));
        }

        sqlx::query("DELETE FROM categories WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(identity.user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        info!(category_id = %id, "Category deleted");
        Ok(())
    }
}
