//! Identity resolution for protected requests
//!
//! Turns an inbound bearer credential into an [`Identity`] or fails
//! closed with `Unauthenticated`.

use common::{Identity, ServiceError, ServiceResult};
use tracing::warn;

use crate::{
    jwt::{JwtService, TokenType},
    repositories::UserRepository,
};

const BEARER_PREFIX: &str = "Bearer ";

/// Resolves bearer tokens to identities
#[derive(Clone)]
pub struct IdentityResolver {
    jwt: JwtService,
    users: UserRepository,
}

impl IdentityResolver {
    pub fn new(jwt: JwtService, users: UserRepository) -> Self {
        Self { jwt, users }
    }

    /// Resolve the value of an `Authorization` header
    pub async fn resolve_header(&self, header: Option<&str>) -> ServiceResult<Identity> {
        let header =
            header.ok_or_else(|| ServiceError::unauthenticated("Missing Authorization header"))?;

        let token = header
            .strip_prefix(BEARER_PREFIX)
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ServiceError::unauthenticated("Invalid Authorization format"))?;

        self.resolve(token).await
    }

    /// Resolve a raw access token
    ///
    /// The subject must name an existing, active account.
    pub async fn resolve(&self, token: &str) -> ServiceResult<Identity> {
        let claims = self.jwt.validate_token_of_type(token, TokenType::Access)?;

        let user = self
            .users
            .find_by_username(&claims.sub)
            .await?
            .ok_or_else(|| {
                warn!(username = %claims.sub, "Token subject does not exist");
                ServiceError::unauthenticated("Unknown user")
            })?;

        if !user.active {
            warn!(username = %claims.sub, "Token subject is inactive");
            return Err(ServiceError::unauthenticated("Account is not activated"));
        }

        Ok(Identity::new(user.id, user.username))
    }
}
