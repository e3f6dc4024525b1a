//! Authentication service models

pub mod user;

// Re-export for convenience
pub use user::{
    LoginCredentials, NewUser, RefreshRequest, RegisterRequest, TokenPair, User, UserResponse,
};
