//! API models for request and response payloads

use serde::Serialize;

pub mod category;
pub mod transaction;

pub use category::{Category, CategoryKind, CategoryRequest, CategoryResponse};
pub use transaction::{LedgerEntry, PeriodQuery, TransactionRequest, TransactionResponse};

/// Response for delete operations
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
