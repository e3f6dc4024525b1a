//! Ledger entry models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Row, sqlite::SqliteRow};
use std::str::FromStr;
use uuid::Uuid;

use super::category::{Category, CategoryResponse};

/// Transaction entity, joined with its category
///
/// The entry's kind is always the kind of `category`.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub category: Category,
    pub amount: Decimal,
    pub operation_date: DateTime<Utc>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, SqliteRow> for LedgerEntry {
    fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
        let raw_amount: String = row.try_get("amount")?;
        let amount = Decimal::from_str(&raw_amount).map_err(|e| sqlx::Error::ColumnDecode {
            index: "amount".to_string(),
            source: Box::new(e),
        })?;

        Ok(Self {
            id: row.try_get("id")?,
            owner_id: row.try_get("owner_id")?,
            category: Category::from_prefixed_row(row, "category_")?,
            amount,
            operation_date: row.try_get("operation_date")?,
            description: row.try_get("description")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Request for transaction create and update
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub category_id: Uuid,
    /// Decimal string or JSON number. Only the string form keeps its scale:
    /// a number is read as `f64`, so `100.50` arrives as `100.5`.
    pub amount: Decimal,
    pub operation_date: DateTime<Utc>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Response for transaction operations
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    pub id: Uuid,
    pub amount: Decimal,
    pub category_id: Uuid,
    pub category: CategoryResponse,
    pub operation_date: DateTime<Utc>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<LedgerEntry> for TransactionResponse {
    fn from(entry: LedgerEntry) -> Self {
        Self {
            id: entry.id,
            amount: entry.amount,
            category_id: entry.category.id,
            category: entry.category.into(),
            operation_date: entry.operation_date,
            description: entry.description,
            created_at: entry.created_at,
            updated_at: entry.updated_at,
        }
    }
}

/// Query parameters for period listing
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodQuery {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}
