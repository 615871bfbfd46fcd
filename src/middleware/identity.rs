//! Caller identity as seen by handlers.
//!
//! [`Identity`] reads the trusted `x-user-*` headers stamped by the gatekeeper.
//! [`VerifiedSession`] additionally re-verifies the cookie signature and checks
//! it names the same user; state-changing handlers take this one.

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, HeaderMap, HeaderValue},
};
use axum_extra::extract::CookieJar;
use chrono::Utc;

use crate::auth::{self, cookie::SESSION_COOKIE, Claims};
use crate::config::AppConfig;
use crate::error::ApiError;
use crate::types::Role;

pub const HEADER_USER_ID: &str = "x-user-id";
pub const HEADER_USER_ROLE: &str = "x-user-role";
pub const HEADER_USER_EMAIL: &str = "x-user-email";
pub const HEADER_USER_NAME: &str = "x-user-name";

pub const IDENTITY_HEADERS: [&str; 4] = [HEADER_USER_ID, HEADER_USER_ROLE, HEADER_USER_EMAIL, HEADER_USER_NAME];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i64,
    pub role: Role,
    pub email: String,
    pub name: String,
}

impl Identity {
    /// Read the trusted headers; `None` when any is missing or unreadable
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        Some(Self {
            user_id: header_str(headers, HEADER_USER_ID)?.parse().ok()?,
            role: header_str(headers, HEADER_USER_ROLE)?.parse().ok()?,
            email: header_str(headers, HEADER_USER_EMAIL)?.to_string(),
            name: header_str(headers, HEADER_USER_NAME)?.to_string(),
        })
    }

    /// Write the trusted headers, replacing whatever is there.
    /// Fails only on values a header cannot carry (control characters).
    pub fn write_headers(&self, headers: &mut HeaderMap) -> Result<(), axum::http::header::InvalidHeaderValue> {
        let id = HeaderValue::from_str(&self.user_id.to_string())?;
        let role = HeaderValue::from_static(self.role.as_str());
        // Names may be non-ASCII; header values carry the raw UTF-8 bytes
        let email = HeaderValue::from_bytes(self.email.as_bytes())?;
        let name = HeaderValue::from_bytes(self.name.as_bytes())?;

        headers.insert(HEADER_USER_ID, id);
        headers.insert(HEADER_USER_ROLE, role);
        headers.insert(HEADER_USER_EMAIL, email);
        headers.insert(HEADER_USER_NAME, name);
        Ok(())
    }

    fn matches(&self, claims: &Claims) -> bool {
        self.user_id == claims.user_id && self.role == claims.role && self.email == claims.email
    }
}

impl From<&Claims> for Identity {
    fn from(claims: &Claims) -> Self {
        Self {
            user_id: claims.user_id,
            role: claims.role,
            email: claims.email.clone(),
            name: claims.name.clone(),
        }
    }
}

/// Remove every client-supplied identity header
pub fn strip_identity_headers(headers: &mut HeaderMap) {
    for name in IDENTITY_HEADERS {
        headers.remove(name);
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| std::str::from_utf8(value.as_bytes()).ok())
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Identity::from_headers(&parts.headers).ok_or_else(|| ApiError::unauthorized("Unauthorized"))
    }
}

/// Identity backed by a signature-verified session token
#[derive(Debug, Clone)]
pub struct VerifiedSession {
    pub identity: Identity,
    pub claims: Claims,
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for VerifiedSession
where
    Arc<AppConfig>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let identity = Identity::from_request_parts(parts, state).await?;
        let config = Arc::<AppConfig>::from_ref(state);

        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(SESSION_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .ok_or_else(|| ApiError::unauthorized("Unauthorized"))?;

        let claims = auth::verify_jwt(&token, &config.security.jwt_secret, Utc::now().timestamp())
            .map_err(|e| {
                tracing::warn!("Session re-verification failed for user {}: {}", identity.user_id, e);
                ApiError::from(e)
            })?;

        if !identity.matches(&claims) {
            tracing::warn!(
                "Session claims for user {} do not match forwarded identity {}",
                claims.user_id,
                identity.user_id
            );
            return Err(ApiError::unauthorized("Invalid token"));
        }

        Ok(Self { identity, claims })
    }
}
