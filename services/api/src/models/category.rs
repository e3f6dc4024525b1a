//! Category models
//!
//! A category kind is persisted as a stable string code from the
//! `category_kinds` table, never as the enum's Rust name. The mapping
//! below mirrors that table and is versioned alongside it.

use chrono::{DateTime, Utc};
use common::ServiceError;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Row, sqlite::SqliteRow};
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// Version of the kind code mapping stored in `category_kinds.mapping_version`
pub const KIND_MAPPING_VERSION: i64 = 1;

/// INCOME / EXPENSE classification of a category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CategoryKind {
    Income,
    Expense,
}

impl CategoryKind {
    pub const ALL: [CategoryKind; 2] = [CategoryKind::Income, CategoryKind::Expense];

    /// Stable storage and wire code
    pub const fn code(self) -> &'static str {
        match self {
            CategoryKind::Income => "INCOME",
            CategoryKind::Expense => "EXPENSE",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.code() == code)
    }

    pub const fn label(self) -> &'static str {
        match self {
            CategoryKind::Income => "Income",
            CategoryKind::Expense => "Expense",
        }
    }
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for CategoryKind {
    type Err = ServiceError;

    /// Parse a kind code, ignoring ASCII case
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(&s.to_ascii_uppercase())
            .ok_or_else(|| ServiceError::validation(format!("Unknown category type: {}", s)))
    }
}

impl TryFrom<String> for CategoryKind {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_code(&value).ok_or_else(|| format!("unknown category type `{}`", value))
    }
}

impl From<CategoryKind> for String {
    fn from(kind: CategoryKind) -> Self {
        kind.code().to_string()
    }
}

/// Category entity
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub kind: CategoryKind,
    pub system_category: bool,
    pub created_at: DateTime<Utc>,
}

impl Category {
    /// Decode a category from a row whose columns carry `prefix`
    pub(crate) fn from_prefixed_row(row: &SqliteRow, prefix: &str) -> sqlx::Result<Self> {
        let column = |name: &str| format!("{}{}", prefix, name);

        let code: String = row.try_get(column("kind_code").as_str())?;
        let kind = CategoryKind::from_code(&code).ok_or_else(|| sqlx::Error::ColumnDecode {
            index: column("kind_code"),
            source: format!("unknown category kind code: {}", code).into(),
        })?;

        Ok(Self {
            id: row.try_get(column("id").as_str())?,
            owner_id: row.try_get(column("owner_id").as_str())?,
            name: row.try_get(column("name").as_str())?,
            kind,
            system_category: row.try_get(column("system_category").as_str())?,
            created_at: row.try_get(column("created_at").as_str())?,
        })
    }
}

impl<'r> FromRow<'r, SqliteRow> for Category {
    fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
        Self::from_prefixed_row(row, "")
    }
}

/// Request for category create and update
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: CategoryKind,
}

/// Response for category operations
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: CategoryKind,
    pub system_category: bool,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            kind: category.kind,
            system_category: category.system_category,
        }
    }
}
