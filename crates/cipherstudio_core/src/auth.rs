//! Password hashing and bearer token issuance.

use crate::config::Config;
use crate::error::AppError;
use crate::models::user::User;
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Claims carried by CipherStudio bearer tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub username: String,
    pub iat: u64,
    pub exp: u64,
}

/// Hash `password` with bcrypt at `cost`.
///
/// # Errors
/// Returns [`AppError::Auth`] when bcrypt rejects the cost or input.
pub fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    Ok(bcrypt::hash(password, cost)?)
}

/// Check `password` against a stored bcrypt hash.
///
/// # Errors
/// Returns [`AppError::Auth`] when the stored hash is malformed.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    Ok(bcrypt::verify(password, password_hash)?)
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header_value: &str) -> Option<&str> {
    header_value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Issues and verifies HS256 bearer tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl_secs: u64,
}

impl TokenService {
    pub fn new(secret: &str, ttl_secs: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
            ttl_secs,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.jwt_secret, config.token_ttl_secs)
    }

    /// Sign a token for `user` valid for the configured TTL.
    ///
    /// # Errors
    /// Returns [`AppError::Auth`] when signing fails.
    pub fn issue(&self, user: &User) -> Result<String, AppError> {
        let iat = Utc::now().timestamp().max(0) as u64;
        let claims = Claims {
            sub: user.id.clone(),
            username: user.username.clone(),
            iat,
            exp: iat.saturating_add(self.ttl_secs),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|err| AppError::Auth(err.to_string()))
    }

    /// Validate signature and expiry of `token`.
    ///
    /// # Errors
    /// Returns [`AppError::Unauthorized`] for malformed, tampered, or expired
    /// tokens.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)?;
        Ok(data.claims)
    }
}
