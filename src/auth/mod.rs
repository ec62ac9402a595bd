pub mod identity;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::SecurityConfig;

pub use identity::{extract_principal, IdentityError, Principal};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(sub: impl Into<String>, email: Option<String>, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: sub.into(),
            email,
            exp,
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT secret")]
    InvalidSecret,

    #[error("{0}")]
    InvalidToken(String),
}

/// Signs and verifies HS256 bearer tokens.
/// Stands in for the external identity provider when running locally.
#[derive(Clone)]
pub struct TokenAuthority {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry_hours: u64,
}

impl TokenAuthority {
    pub fn new(secret: &str, expiry_hours: u64) -> Result<Self, JwtError> {
        if secret.is_empty() {
            return Err(JwtError::InvalidSecret);
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiry_hours,
        })
    }

    pub fn from_config(config: &SecurityConfig) -> Result<Self, JwtError> {
        Self::new(&config.jwt_secret, config.jwt_expiry_hours)
    }

    /// Issue a token for `sub` with the configured lifetime
    pub fn issue(&self, sub: &str, email: Option<String>) -> Result<String, JwtError> {
        self.issue_claims(&Claims::new(sub, email, self.expiry_hours))
    }

    pub fn issue_claims(&self, claims: &Claims) -> Result<String, JwtError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| JwtError::TokenGeneration(e.to_string()))
    }

    /// Verify signature and expiry; returns every claim in the token
    pub fn verify(&self, token: &str) -> Result<Map<String, Value>, JwtError> {
        let validation = Validation::new(Algorithm::HS256);

        let token_data = decode::<Map<String, Value>>(token, &self.decoding_key, &validation)
            .map_err(|e| JwtError::InvalidToken(e.to_string()))?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejects_empty_secret() {
        assert!(matches!(TokenAuthority::new("", 1), Err(JwtError::InvalidSecret)));
    }

    #[test]
    fn issued_token_verifies_with_claims() {
        let authority = TokenAuthority::new("test-secret", 1).unwrap();
        let token = authority.issue("u1", Some("u1@example.com".to_string())).unwrap();

        let claims = authority.verify(&token).unwrap();
        assert_eq!(claims["sub"], json!("u1"));
        assert_eq!(claims["email"], json!("u1@example.com"));
    }

    #[test]
    fn rejects_token_signed_with_other_secret() {
        let issuer = TokenAuthority::new("one-secret", 1).unwrap();
        let verifier = TokenAuthority::new("another-secret", 1).unwrap();
        let token = issuer.issue("u1", None).unwrap();

        assert!(matches!(verifier.verify(&token), Err(JwtError::InvalidToken(_))));
    }

    #[test]
    fn rejects_expired_token() {
        let authority = TokenAuthority::new("test-secret", 1).unwrap();
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "u1".to_string(),
            email: None,
            exp: now - 3600,
            iat: now - 7200,
        };
        let token = authority.issue_claims(&claims).unwrap();

        assert!(matches!(authority.verify(&token), Err(JwtError::InvalidToken(_))));
    }

    #[test]
    fn rejects_garbage() {
        let authority = TokenAuthority::new("test-secret", 1).unwrap();
        assert!(authority.verify("not.a.token").is_err());
    }
}
