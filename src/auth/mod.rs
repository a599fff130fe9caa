use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, Result};

pub mod permissions;

/// Issues and verifies bearer tokens and hashes passwords. The token only
/// carries the user id; roles are loaded fresh from the database on every
/// request so a role change takes effect without re-login.
pub struct AuthService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_duration_hours: i64,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
}

impl AuthService {
    pub fn new(secret: &str, token_duration_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_duration_hours,
        }
    }

    pub async fn verify_password(password: &str, hash: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AppError::Internal(format!("Invalid password hash: {}", e)))?;

        let argon2 = Argon2::default();

        Ok(argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    pub async fn hash_password(password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        let password_hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        Ok(password_hash.to_string())
    }

    pub fn issue_token(&self, user_id: Uuid) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(self.token_duration_hours)).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Token encoding failed: {}", e)))
    }

    /// Returns the user id a valid token was issued for. Expired, malformed
    /// and mis-signed tokens are all an authentication failure; we don't
    /// distinguish them for the caller.
    pub fn verify_token(&self, token: &str) -> Result<Uuid> {
        let data = decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map_err(|_| AppError::Unauthorized)?;

        Uuid::parse_str(&data.claims.sub).map_err(|_| AppError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn password_hash_roundtrip() {
        let hash = AuthService::hash_password("my_secure_password").await.unwrap();
        assert!(AuthService::verify_password("my_secure_password", &hash)
            .await
            .unwrap());
        assert!(!AuthService::verify_password("wrong_password", &hash)
            .await
            .unwrap());
    }

    #[test]
    fn token_roundtrip() {
        let service = AuthService::new("test-secret", 1);
        let user_id = Uuid::new_v4();
        let token = service.issue_token(user_id).unwrap();
        assert_eq!(service.verify_token(&token).unwrap(), user_id);
    }

    #[test]
    fn bad_token_is_unauthorized() {
        let service = AuthService::new("test-secret", 1);
        assert!(matches!(
            service.verify_token("not-a-token"),
            Err(AppError::Unauthorized)
        ));

        let other = AuthService::new("other-secret", 1);
        let token = other.issue_token(Uuid::new_v4()).unwrap();
        assert!(matches!(
            service.verify_token(&token),
            Err(AppError::Unauthorized)
        ));
    }
}
