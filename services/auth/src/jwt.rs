//! JWT service for token generation and validation
//!
//! This module provides functionality for creating and validating
//! HS256-signed JWT tokens. Access tokens are short-lived and presented on
//! every protected request; refresh tokens are longer-lived and only
//! exchanged for a new pair. Both carry the username as subject.

use anyhow::Result;
use common::{ServiceError, ServiceResult};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::warn;

use crate::models::User;

/// Minimum accepted length of the signing secret, in bytes
const MIN_SECRET_LEN: usize = 32;

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Shared secret for signing and verifying tokens
    pub secret: String,
    /// Access token expiration time in seconds (default: 15 minutes)
    pub access_token_expiry: u64,
    /// Refresh token expiration time in seconds (default: 7 days)
    pub refresh_token_expiry: u64,
}

impl JwtConfig {
    /// Create a new JwtConfig from environment variables
    ///
    /// # Environment Variables
    /// - `JWT_SECRET`: Shared HMAC secret, at least 32 bytes
    /// - `JWT_ACCESS_TOKEN_EXPIRY`: Access token expiry in seconds (default: 900)
    /// - `JWT_REFRESH_TOKEN_EXPIRY`: Refresh token expiry in seconds (default: 604800)
    pub fn from_env() -> Result<Self> {
        let secret = std::env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable not set"))?;

        if secret.len() < MIN_SECRET_LEN {
            anyhow::bail!("JWT_SECRET must be at least {} bytes long", MIN_SECRET_LEN);
        }

        let access_token_expiry = std::env::var("JWT_ACCESS_TOKEN_EXPIRY")
            .unwrap_or_else(|_| "900".to_string()) // 15 minutes
            .parse()
            .unwrap_or(900);

        let refresh_token_expiry = std::env::var("JWT_REFRESH_TOKEN_EXPIRY")
            .unwrap_or_else(|_| "604800".to_string()) // 7 days
            .parse()
            .unwrap_or(604800);

        Ok(JwtConfig {
            secret,
            access_token_expiry,
            refresh_token_expiry,
        })
    }
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Username
    pub sub: String,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
    /// Token type (access or refresh)
    pub token_type: TokenType,
}

/// Token type enum
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub enum TokenType {
    /// Access token
    Access,
    /// Refresh token
    Refresh,
}

/// JWT service
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    config: JwtConfig,
}

impl JwtService {
    /// Initialize a new JWT service
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        JwtService {
            encoding_key,
            decoding_key,
            validation,
            config,
        }
    }

    fn now() -> ServiceResult<u64> {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .map_err(|e| ServiceError::internal(format!("Failed to get current time: {}", e)))
    }

    fn sign(&self, username: &str, token_type: TokenType, ttl: u64) -> ServiceResult<String> {
        let now = Self::now()?;
        let claims = Claims {
            sub: username.to_string(),
            iat: now,
            exp: now + ttl,
            token_type,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| ServiceError::internal(format!("Token signing failed: {}", e)))
    }

    /// Generate an access token for a user
    pub fn generate_access_token(&self, user: &User) -> ServiceResult<String> {
        self.sign(&user.username, TokenType::Access, self.config.access_token_expiry)
    }

    /// Generate a refresh token for a user
    pub fn generate_refresh_token(&self, user: &User) -> ServiceResult<String> {
        self.sign(&user.username, TokenType::Refresh, self.config.refresh_token_expiry)
    }

    /// Validate a token and return the claims
    ///
    /// Any failure (bad signature, expiry, malformed input) is reported as
    /// `Unauthenticated`.
    pub fn validate_token(&self, token: &str) -> ServiceResult<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                warn!("Token rejected: {}", e);
                ServiceError::unauthenticated("Invalid or expired token")
            })
    }

    /// Validate a token and require it to be of the given type
    pub fn validate_token_of_type(
        &self,
        token: &str,
        expected: TokenType,
    ) -> ServiceResult<Claims> {
        let claims = self.validate_token(token)?;
        if claims.token_type != expected {
            return Err(ServiceError::unauthenticated("Unexpected token type"));
        }
        Ok(claims)
    }

    /// Get the access token expiry time
    pub fn access_token_expiry(&self) -> u64 {
        self.config.access_token_expiry
    }
}
