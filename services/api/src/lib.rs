//! Personal finance API service
//!
//! Per-owner categories and ledger entries behind bearer-token
//! authentication. Every store operation receives the caller's
//! `Identity` from the authentication middleware.

pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
pub mod stores;

pub use error::{ApiError, ApiResult};
pub use state::AppState;
