//! Stores for per-owner categories and ledger entries
//!
//! Every operation takes the caller's [`common::Identity`] explicitly and
//! scopes reads and writes by its user id. Read-check-write sequences run
//! inside one database transaction.

pub mod category;
pub mod ledger;

pub use category::CategoryStore;
pub use ledger::LedgerStore;
