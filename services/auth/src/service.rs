//! Registration, login and token refresh

use common::{ServiceError, ServiceResult};
use tracing::{info, instrument, warn};

use crate::{
    jwt::{JwtService, TokenType},
    models::{LoginCredentials, NewUser, RegisterRequest, TokenPair, User},
    repositories::UserRepository,
    validation::{validate_password, validate_person_name, validate_username},
};

/// Token service: creates accounts and issues signed token pairs
#[derive(Clone)]
pub struct AuthService {
    users: UserRepository,
    jwt: JwtService,
}

impl AuthService {
    pub fn new(users: UserRepository, jwt: JwtService) -> Self {
        Self { users, jwt }
    }

    /// Register a new active account
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn register(&self, request: &RegisterRequest) -> ServiceResult<User> {
        validate_username(&request.username).map_err(ServiceError::Validation)?;
        validate_password(&request.password).map_err(ServiceError::Validation)?;
        validate_person_name("First name", request.first_name.as_deref())
            .map_err(ServiceError::Validation)?;
        validate_person_name("Last name", request.last_name.as_deref())
            .map_err(ServiceError::Validation)?;

        if request.password != request.confirm_password {
            return Err(ServiceError::validation("Passwords do not match"));
        }

        if self.users.username_exists(&request.username).await? {
            return Err(ServiceError::conflict("Username already exists"));
        }

        let new_user = NewUser {
            username: request.username.clone(),
            password_hash: UserRepository::hash_password(&request.password)?,
            first_name: request.first_name.clone(),
            last_name: request.last_name.clone(),
        };

        let user = self.users.create(&new_user).await?;
        info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Verify credentials and issue an access + refresh token pair
    #[instrument(skip(self, credentials), fields(username = %credentials.username))]
    pub async fn login(&self, credentials: &LoginCredentials) -> ServiceResult<TokenPair> {
        let Some(user) = self.users.find_by_username(&credentials.username).await? else {
            UserRepository::verify_dummy_password(&credentials.password);
            warn!("Login failed: unknown username");
            return Err(ServiceError::unauthenticated("Invalid credentials"));
        };

        if !self.users.verify_password(&user, &credentials.password)? {
            warn!("Login failed: bad password");
            return Err(ServiceError::unauthenticated("Invalid credentials"));
        }

        if !user.active {
            warn!("Login failed: inactive account");
            return Err(ServiceError::unauthenticated("Account is not activated"));
        }

        info!("Login succeeded");
        self.issue(&user)
    }

    /// Exchange a valid refresh token for a fresh token pair
    #[instrument(skip(self, refresh_token))]
    pub async fn refresh(&self, refresh_token: &str) -> ServiceResult<TokenPair> {
        let claims = self
            .jwt
            .validate_token_of_type(refresh_token, TokenType::Refresh)?;

        let user = self
            .users
            .find_by_username(&claims.sub)
            .await?
            .filter(|user| user.active)
            .ok_or_else(|| ServiceError::unauthenticated("Account is not available"))?;

        self.issue(&user)
    }

    fn issue(&self, user: &User) -> ServiceResult<TokenPair> {
        Ok(TokenPair {
            access_token: self.jwt.generate_access_token(user)?,
            refresh_token: self.jwt.generate_refresh_token(user)?,
            token_type: "Bearer".to_string(),
            expires_in: self.jwt.access_token_expiry(),
        })
    }
}
