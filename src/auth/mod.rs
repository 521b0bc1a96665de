pub mod password;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::Role;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Username of the authenticated account
    pub sub: String,
    pub user_id: Uuid,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    /// Fails when `expiry_hours` pushes the expiry past what a timestamp can hold
    pub fn new(username: String, user_id: Uuid, role: Role, expiry_hours: u64) -> Result<Self, JwtError> {
        let now = Utc::now();
        let exp = i64::try_from(expiry_hours)
            .ok()
            .and_then(Duration::try_hours)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or(JwtError::InvalidExpiry(expiry_hours))?;

        Ok(Self {
            sub: username,
            user_id,
            role,
            exp: exp.timestamp(),
            iat: now.timestamp(),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),
    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),
    #[error("Invalid JWT secret")]
    InvalidSecret,
    #[error("Token lifetime of {0} hours is out of range")]
    InvalidExpiry(u64),
}

pub fn generate_jwt(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key)
        .map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

/// Verify signature and expiry, returning the claims
pub fn decode_jwt(token: &str, secret: &str) -> Result<Claims, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    decode::<Claims>(token, &decoding_key, &Validation::default())
        .map(|data| data.claims)
        .map_err(|e| JwtError::InvalidToken(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_carries_identity() {
        let id = Uuid::new_v4();
        let token = generate_jwt(&Claims::new("jdoe".into(), id, Role::Employee, 1).unwrap(), "secret").unwrap();

        let claims = decode_jwt(&token, "secret").unwrap();
        assert_eq!(claims.sub, "jdoe");
        assert_eq!(claims.user_id, id);
        assert_eq!(claims.role, Role::Employee);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = generate_jwt(&Claims::new("jdoe".into(), Uuid::new_v4(), Role::Manager, 1).unwrap(), "secret").unwrap();
        assert!(matches!(decode_jwt(&token, "other"), Err(JwtError::InvalidToken(_))));
    }

    #[test]
    fn expired_token_is_rejected() {
        let mut claims = Claims::new("jdoe".into(), Uuid::new_v4(), Role::Manager, 1).unwrap();
        claims.exp = Utc::now().timestamp() - 3600;
        claims.iat = claims.exp - 60;
        let token = generate_jwt(&claims, "secret").unwrap();
        assert!(decode_jwt(&token, "secret").is_err());
    }

    #[test]
    fn oversized_lifetime_is_an_error() {
        let result = Claims::new("jdoe".into(), Uuid::new_v4(), Role::Manager, 3_000_000_000_000_000);
        assert!(matches!(result, Err(JwtError::InvalidExpiry(_))));
        let result = Claims::new("jdoe".into(), Uuid::new_v4(), Role::Manager, u64::MAX);
        assert!(matches!(result, Err(JwtError::InvalidExpiry(_))));
    }

    #[test]
    fn empty_secret_is_refused() {
        let claims = Claims::new("jdoe".into(), Uuid::new_v4(), Role::Manager, 1).unwrap();
        assert!(matches!(generate_jwt(&claims, ""), Err(JwtError::InvalidSecret)));
    }
}
