use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::ConnectionTrait;
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::User;
use crate::repositories::UserRepository;

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // username
    pub exp: i64,    // expiration timestamp
    pub iat: i64,    // issued at timestamp
}

pub struct AuthService;

impl AuthService {
    /// Hash a password using Argon2
    pub fn hash_password(password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        Ok(hash.to_string())
    }

    /// Verify a password against a hash
    pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AppError::Internal(format!("Invalid password hash: {}", e)))?;

        let result = Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok();

        Ok(result)
    }

    /// Issue a token for `subject` that expires `ttl` from now
    pub fn issue_token(subject: &str, ttl: Duration, config: &Config) -> AppResult<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + ttl;

        let claims = Claims {
            sub: subject.to_string(),
            exp: exp.unix_timestamp(),
            iat: now.unix_timestamp(),
        };

        let token = encode(
            &Header::new(config.jwt_algorithm),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))?;

        Ok(token)
    }

    /// Generate an access token with the configured lifetime
    pub fn generate_token(username: &str, config: &Config) -> AppResult<String> {
        Self::issue_token(
            username,
            Duration::minutes(config.access_token_expire_minutes),
            config,
        )
    }

    /// Verify and decode a JWT token
    pub fn verify_token(token: &str, config: &Config) -> AppResult<Claims> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            &Validation::new(config.jwt_algorithm),
        )?;

        Ok(token_data.claims)
    }

    /// Check a username/password pair.
    ///
    /// Returns `None` both for an unknown user and for a wrong password so
    /// callers cannot tell the two apart.
    pub async fn authenticate<C: ConnectionTrait>(
        db: &C,
        username: &str,
        password: &str,
    ) -> AppResult<Option<User>> {
        let Some(user) = UserRepository::find_by_username(db, username).await? else {
            return Ok(None);
        };

        if !Self::verify_password(password, &user.password_hash)? {
            return Ok(None);
        }

        Ok(Some(user))
    }

    /// Resolve a bearer token to its (active) user
    pub async fn resolve<C: ConnectionTrait>(
        db: &C,
        token: &str,
        config: &Config,
    ) -> AppResult<User> {
        let claims = Self::verify_token(token, config)?;
        if claims.sub.is_empty() {
            return Err(AppError::Unauthorized);
        }

        let user = UserRepository::find_by_username(db, &claims.sub)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !user.is_active {
            return Err(AppError::InactiveAccount);
        }

        Ok(user)
    }
}
