// handlers/protected/auth.rs - session owner endpoints under /api/auth

use axum::{body::Bytes, extract::State};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use crate::auth::access::{authorize, Action};
use crate::auth::{cookie, password};
use crate::database::{models::User, users};
use crate::error::ApiError;
use crate::handlers::Done;
use crate::middleware::{ApiResponse, ApiResult, Identity, VerifiedSession};
use crate::state::AppState;
use crate::validation::{parse_body, Validate};

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

impl Validate for ChangePasswordRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if self.current_password.is_empty() || self.new_password.is_empty() {
            return Err(ApiError::bad_request("Both current and new password are required"));
        }
        if self.new_password.chars().count() < 6 {
            return Err(ApiError::invalid_field(
                "newPassword",
                "New password must be at least 6 characters",
            ));
        }
        Ok(())
    }
}

/// GET /api/auth/me - The caller's stored profile
pub async fn me(State(state): State<AppState>, identity: Identity) -> ApiResult<User> {
    authorize(Action::ViewProfile, identity.role)?;

    let user = users::find_by_id(state.pool(), identity.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(ApiResponse::success(user))
}

/// POST /api/auth/logout - Drop the session cookie
pub async fn logout(identity: Identity, jar: CookieJar) -> (CookieJar, ApiResponse<Done>) {
    tracing::info!("User {} signed out", identity.user_id);
    (
        jar.add(cookie::cleared_session_cookie()),
        ApiResponse::success(Done {
            message: "Logged out successfully",
        }),
    )
}

/// POST /api/auth/change-password
///
/// Expected Input:
/// ```json
/// { "currentPassword": "leader123", "newPassword": "n3w-secret" }
/// ```
pub async fn change_password(
    State(state): State<AppState>,
    session: VerifiedSession,
    body: Bytes,
) -> ApiResult<Done> {
    let identity = session.identity;
    authorize(Action::ChangePassword, identity.role)?;

    let request: ChangePasswordRequest = parse_body(&body)?;
    request.validate()?;

    let user = users::find_by_id(state.pool(), identity.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    if !password::verify_password(&request.current_password, &user.password_hash) {
        return Err(ApiError::bad_request("Current password is incorrect"));
    }

    let hash = password::hash_password(&request.new_password)?;
    users::set_password(state.pool(), user.id, &hash).await?;

    tracing::info!("User {} changed their password", user.id);
    Ok(ApiResponse::success(Done {
        message: "Password changed successfully",
    }))
}
