// handlers/elevated/admin.rs - /api/admin/*, SUPER_ADMIN only

use axum::{body::Bytes, extract::State};
use serde::Deserialize;

use crate::auth::access::{authorize, Action};
use crate::auth::password;
use crate::database::models::User;
use crate::database::stats::{self, SystemStats};
use crate::database::users;
use crate::error::ApiError;
use crate::handlers::public::auth::{create_account, RegisterRequest};
use crate::middleware::{ApiResponse, ApiResult, Identity, VerifiedSession};
use crate::state::AppState;
use crate::types::Role;
use crate::validation::{parse_body, parse_valid, Checks, Validate};

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub user_id: Option<i64>,
    pub new_password: Option<String>,
    pub role: Option<Role>,
}

impl Validate for UpdateUserRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if self.user_id.is_none() {
            return Err(ApiError::bad_request("userId is required"));
        }
        if self.new_password.is_none() && self.role.is_none() {
            return Err(ApiError::bad_request("newPassword or role is required"));
        }

        let password_ok = self.new_password.as_deref().map_or(true, |p| p.chars().count() >= 6);
        Checks::new()
            .check(password_ok, "newPassword", "Password must be at least 6 characters")
            .finish()
    }
}

/// GET /api/admin/users - Every account, newest first, without password hashes
pub async fn list_users(State(state): State<AppState>, identity: Identity) -> ApiResult<Vec<User>> {
    authorize(Action::ManageUsers, identity.role)?;
    Ok(ApiResponse::success(users::list(state.pool()).await?))
}

/// PATCH /api/admin/users - Reset a password and/or change a role
///
/// Expected Input:
/// ```json
/// { "userId": 4, "newPassword": "optional", "role": "COORDINATOR" }
/// ```
pub async fn update_user(State(state): State<AppState>, session: VerifiedSession, body: Bytes) -> ApiResult<User> {
    let identity = session.identity;
    authorize(Action::ManageUsers, identity.role)?;

    let request: UpdateUserRequest = parse_body(&body)
        .map_err(|_| ApiError::invalid_json("Invalid JSON body or unknown role"))?;
    request.validate()?;
    let user_id = request.user_id.unwrap_or_default();

    let hash = request
        .new_password
        .as_deref()
        .map(password::hash_password)
        .transpose()?;

    let user = users::admin_update(state.pool(), user_id, hash.as_deref(), request.role).await?;

    tracing::info!(
        "Admin {} updated user {} (password reset: {}, role: {})",
        identity.user_id,
        user.id,
        hash.is_some(),
        user.role
    );
    Ok(ApiResponse::success(user))
}

/// GET /api/admin/stats - System-wide totals
pub async fn stats(State(state): State<AppState>, identity: Identity) -> ApiResult<SystemStats> {
    authorize(Action::ViewStats, identity.role)?;
    Ok(ApiResponse::success(stats::collect(state.pool()).await?))
}

/// POST /api/admin/coordinators - Create a COORDINATOR account
///
/// Expected Input:
/// ```json
/// { "name": "Dr. Alami", "email": "alami@pfe.com", "password": "secret1" }
/// ```
pub async fn create_coordinator(
    State(state): State<AppState>,
    session: VerifiedSession,
    body: Bytes,
) -> ApiResult<User> {
    let identity = session.identity;
    authorize(Action::CreateCoordinator, identity.role)?;

    let request: RegisterRequest = parse_valid(&body)?;
    let user = create_account(&state, &request, Role::Coordinator).await?;
    Ok(ApiResponse::created(user))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_needs_something_to_change() {
        let request = UpdateUserRequest {
            user_id: Some(3),
            ..Default::default()
        };
        assert_eq!(request.validate().unwrap_err().message(), "newPassword or role is required");
    }

    #[test]
    fn reset_password_is_length_checked() {
        let request = UpdateUserRequest {
            user_id: Some(3),
            new_password: Some("123".into()),
            role: None,
        };
        assert_eq!(
            request.validate().unwrap_err().message(),
            "Password must be at least 6 characters"
        );
    }

    #[test]
    fn role_names_are_wire_names() {
        let request: UpdateUserRequest =
            serde_json::from_str(r#"{"userId":3,"role":"SUPER_ADMIN"}"#).unwrap();
        assert_eq!(request.role, Some(Role::SuperAdmin));
        assert!(request.validate().is_ok());
    }
}
