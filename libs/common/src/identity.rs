//! The resolved, trusted representation of an authenticated caller

use uuid::Uuid;

/// Authenticated caller, produced once per request by the identity resolver
/// and passed explicitly into every store operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub username: String,
}

impl Identity {
    pub fn new(user_id: Uuid, username: impl Into<String>) -> Self {
        Self {
            user_id,
            username: username.into(),
        }
    }

    /// Whether this caller owns a resource with the given owner id.
    pub fn owns(&self, owner_id: Uuid) -> bool {
        self.user_id == owner_id
    }
}
