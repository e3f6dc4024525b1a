//! Ledger store
//!
//! One store type serves the income, expense and raw transaction
//! surfaces. A store built with a kind only sees entries whose category
//! has that kind, and only accepts categories of that kind on writes.
//! The unfiltered store applies ownership checks alone.

use chrono::{DateTime, Utc};
use common::{Identity, ServiceError, ServiceResult, database::begin_write};
use rust_decimal::Decimal;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::category::load_owned_category;
use crate::models::{Category, CategoryKind, LedgerEntry, TransactionRequest};

/// Maximum description length, in characters
pub const MAX_DESCRIPTION_LEN: usize = 500;

const ENTRY_SELECT: &str = r#"
    SELECT t.id, t.owner_id, t.amount, t.operation_date, t.description,
           t.created_at, t.updated_at,
           c.id AS category_id, c.owner_id AS category_owner_id, c.name AS category_name,
           c.kind_code AS category_kind_code, c.system_category AS category_system_category,
           c.created_at AS category_created_at
    FROM transactions t
    JOIN categories c ON c.id = t.category_id
"#;

fn validate_request(request: &TransactionRequest) -> ServiceResult<()> {
    if request.amount <= Decimal::ZERO {
        return Err(ServiceError::validation("Amount must be greater than zero"));
    }

    if let Some(description) = &request.description {
        if description.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(ServiceError::validation(format!(
                "Description must be at most {} characters long",
                MAX_DESCRIPTION_LEN
            )));
        }
    }

    Ok(())
}

async fn fetch_entry(conn: &mut SqliteConnection, id: Uuid) -> ServiceResult<Option<LedgerEntry>> {
    let entry = sqlx::query_as::<_, LedgerEntry>(&format!("{ENTRY_SELECT} WHERE t.id = $1"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(entry)
}

/// CRUD and period queries over the caller's ledger entries
#[derive(Clone)]
pub struct LedgerStore {
    pool: SqlitePool,
    kind: Option<CategoryKind>,
}

impl LedgerStore {
    /// Store restricted to entries of one kind
    pub fn for_kind(pool: SqlitePool, kind: CategoryKind) -> Self {
        Self {
            pool,
            kind: Some(kind),
        }
    }

    /// Store over raw entries of every kind
    pub fn unfiltered(pool: SqlitePool) -> Self {
        Self { pool, kind: None }
    }

    fn noun(&self) -> &'static str {
        match self.kind {
            Some(CategoryKind::Income) => "Income",
            Some(CategoryKind::Expense) => "Expense",
            None => "Transaction",
        }
    }

    /// All of the caller's entries, newest operation first
    pub async fn list(&self, identity: &Identity) -> ServiceResult<Vec<LedgerEntry>> {
        self.query(identity, None).await
    }

    /// The caller's entries with `start <= operation_date <= end`
    pub async fn list_by_period(
        &self,
        identity: &Identity,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ServiceResult<Vec<LedgerEntry>> {
        if start > end {
            return Err(ServiceError::validation(
                "Start date must not be after end date",
            ));
        }
        self.query(identity, Some((start, end))).await
    }

    async fn query(
        &self,
        identity: &Identity,
        period: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> ServiceResult<Vec<LedgerEntry>> {
        let mut builder = QueryBuilder::<Sqlite>::new(ENTRY_SELECT);
        builder.push(" WHERE t.owner_id = ").push_bind(identity.user_id);

        if let Some(kind) = self.kind {
            builder.push(" AND c.kind_code = ").push_bind(kind.code());
        }

        if let Some((start, end)) = period {
            builder
                .push(" AND t.operation_date >= ")
                .push_bind(start)
                .push(" AND t.operation_date <= ")
                .push_bind(end);
        }

        builder.push(" ORDER BY t.operation_date DESC, t.created_at DESC");

        let entries = builder
            .build_query_as::<LedgerEntry>()
            .fetch_all(&self.pool)
            .await?;

        Ok(entries)
    }

    /// Load an entry, checking ownership only
    async fn load_owned(
        &self,
        conn: &mut SqliteConnection,
        identity: &Identity,
        id: Uuid,
    ) -> ServiceResult<LedgerEntry> {
        let entry = fetch_entry(conn, id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("{} not found", self.noun())))?;

        if !identity.owns(entry.owner_id) {
            warn!(
                user_id = %identity.user_id,
                entry_id = %id,
                "Access to foreign transaction denied"
            );
            return Err(ServiceError::access_denied(
                "You do not have permission to access this transaction",
            ));
        }

        Ok(entry)
    }

    /// Load an entry, checking ownership and kind
    async fn load_owned_of_kind(
        &self,
        conn: &mut SqliteConnection,
        identity: &Identity,
        id: Uuid,
    ) -> ServiceResult<LedgerEntry> {
        let entry = self.load_owned(conn, identity, id).await?;

        if let Some(kind) = self.kind {
            if entry.category.kind != kind {
                return Err(ServiceError::invalid_operation(format!(
                    "Transaction is not of type {}",
                    kind
                )));
            }
        }

        Ok(entry)
    }

    /// Resolve the category a write points at
    async fn resolve_category(
        &self,
        conn: &mut SqliteConnection,
        identity: &Identity,
        category_id: Uuid,
    ) -> ServiceResult<Category> {
        let category = load_owned_category(conn, identity, category_id).await?;

        if let Some(kind) = self.kind {
            if category.kind != kind {
                return Err(ServiceError::validation(format!(
                    "Category must be of type {}",
                    kind
                )));
            }
        }

        Ok(category)
    }

    pub async fn get_by_id(&self, identity: &Identity, id: Uuid) -> ServiceResult<LedgerEntry> {
        let mut conn = self.pool.acquire().await?;
        self.load_owned_of_kind(&mut *conn, identity, id).await
    }

    /// Record a new entry owned by the caller
    #[instrument(skip(self, identity, request), fields(user_id = %identity.user_id))]
    pub async fn create(
        &self,
        identity: &Identity,
        request: &TransactionRequest,
    ) -> ServiceResult<LedgerEntry> {
        validate_request(request)?;
        let mut tx = begin_write(&self.pool).await?;

        let category = self
            .resolve_category(&mut *tx, identity, request.category_id)
            .await?;

        let id = Uuid::new_v4();
        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO transactions
                (id, owner_id, category_id, amount, operation_date, description,
                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            "#,
        )
        .bind(id)
        .bind(identity.user_id)
        .bind(category.id)
        .bind(request.amount.to_string())
        .bind(request.operation_date)
        .bind(&request.description)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let entry = fetch_entry(&mut *tx, id)
            .await?
            .ok_or_else(|| ServiceError::internal("Created transaction vanished"))?;

        tx.commit().await?;
        info!(entry_id = %id, category_id = %category.id, "Transaction created");
        Ok(entry)
    }

    /// Replace the business fields of an entry
    #[instrument(skip(self, identity, request), fields(user_id = %identity.user_id))]
    pub async fn update(
        &self,
        identity: &Identity,
        id: Uuid,
        request: &TransactionRequest,
    ) -> ServiceResult<LedgerEntry> {
        validate_request(request)?;
        let mut tx = begin_write(&self.pool).await?;

        self.load_owned_of_kind(&mut *tx, identity, id).await?;
        let category = self
            .resolve_category(&mut *tx, identity, request.category_id)
            .await?;

        sqlx::query(
            r#"
            UPDATE transactions
            SET category_id = $1, amount = $2, operation_date = $3, description = $4,
                updated_at = $5
            WHERE id = $6 AND owner_id = $7
            "#,
        )
        .bind(category.id)
        .bind(request.amount.to_string())
        .bind(request.operation_date)
        .bind(&request.description)
        .bind(Utc::now())
        .bind(id)
        .bind(identity.user_id)
        .execute(&mut *tx)
        .await?;

        let entry = fetch_entry(&mut *tx, id)
            .await?
            .ok_or_else(|| ServiceError::internal("Updated transaction vanished"))?;

        tx.commit().await?;
        info!(entry_id = %id, "Transaction updated");
        Ok(entry)
    }

    #[instrument(skip(self, identity), fields(user_id = %identity.user_id))]
    pub async fn delete(&self, identity: &Identity, id: Uuid) -> ServiceResult<()> {
        let mut tx = begin_write(&self.pool).await?;

        self.load_owned(&mut *tx, identity, id).await?;
        sqlx::query("DELETE FROM transactions WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(identity.user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        info!(entry_id = %id, "Transaction deleted");
        Ok(())
    }
}
