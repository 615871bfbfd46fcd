//! Session tokens: issuing, verifying and the edge-only structural decode.
//!
//! Sessions are stateless HS256 JWTs carried in the `token` cookie. The
//! gatekeeper may only *decode* a token (routing decision), while handlers that
//! change state *verify* it again through [`crate::middleware::VerifiedSession`].

pub mod access;
pub mod cookie;
pub mod password;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::types::Role;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: i64,
    pub email: String,
    pub role: Role,
    pub name: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: i64, email: String, role: Role, name: String, ttl_secs: i64) -> Self {
        let now = Utc::now().timestamp();

        Self {
            user_id,
            email,
            role,
            name,
            exp: now + ttl_secs,
            iat: now,
        }
    }

    pub fn for_user(user: &crate::database::models::User, config: &AppConfig) -> Self {
        Self::new(
            user.id,
            user.email.clone(),
            user.role,
            user.name.clone(),
            config.session_ttl_secs(),
        )
    }

    pub fn is_expired_at(&self, now: i64) -> bool {
        self.exp <= now
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),
    #[error("Invalid JWT secret")]
    InvalidSecret,
    #[error("Malformed token: {0}")]
    Malformed(String),
    #[error("Token expired")]
    Expired,
    #[error("Token signature mismatch")]
    BadSignature,
}

pub fn generate_jwt(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::new(Algorithm::HS256), claims, &encoding_key)
        .map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

/// Verify signature and expiry
pub fn verify_jwt(token: &str, secret: &str, now: i64) -> Result<Claims, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let claims = decode_with(token, &DecodingKey::from_secret(secret.as_bytes()), validation(true))?;
    check_expiry(claims, now)
}

/// Structural decode of the payload segment. Does NOT check the signature.
pub fn decode_unverified(token: &str, now: i64) -> Result<Claims, JwtError> {
    let claims = decode_with(token, &DecodingKey::from_secret(&[]), validation(false))?;
    check_expiry(claims, now)
}

fn validation(verify_signature: bool) -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    // Expiry is checked against the caller's clock in check_expiry
    validation.validate_exp = false;
    validation.required_spec_claims.clear();
    if !verify_signature {
        validation.insecure_disable_signature_validation();
    }
    validation
}

fn decode_with(token: &str, key: &DecodingKey, validation: Validation) -> Result<Claims, JwtError> {
    use jsonwebtoken::errors::ErrorKind;

    if token.split('.').count() != 3 {
        return Err(JwtError::Malformed("expected three segments".to_string()));
    }

    decode::<Claims>(token, key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::InvalidSignature => JwtError::BadSignature,
            _ => JwtError::Malformed(e.to_string()),
        })
}

fn check_expiry(claims: Claims, now: i64) -> Result<Claims, JwtError> {
    if claims.is_expired_at(now) {
        Err(JwtError::Expired)
    } else {
        Ok(claims)
    }
}
