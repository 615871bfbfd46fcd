// handlers/public/auth.rs - POST /api/auth/login, POST /api/auth/register

use axum::{body::Bytes, extract::State};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use crate::auth::{cookie, generate_jwt, password, Claims};
use crate::database::{models::User, users};
use crate::error::ApiError;
use crate::middleware::ApiResponse;
use crate::state::AppState;
use crate::types::Role;
use crate::validation::{parse_valid, Checks, Validate};

pub const BAD_CREDENTIALS: &str = "Invalid email or password";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), ApiError> {
        Checks::new()
            .email("email", &self.email, "Invalid email address")
            .min_len("password", &self.password, 6, "Password must be at least 6 characters")
            .finish()
    }
}

/// Name, email and password of a new account. Shared with coordinator creation.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl Validate for RegisterRequest {
    fn validate(&self) -> Result<(), ApiError> {
        Checks::new()
            .min_len("name", self.name.trim(), 2, "Name must be at least 2 characters")
            .email("email", &self.email, "Invalid email address")
            .min_len("password", &self.password, 6, "Password must be at least 6 characters")
            .finish()
    }
}

/// POST /api/auth/login - Check credentials and start a session
///
/// Expected Input:
/// ```json
/// { "email": "leader@pfe.com", "password": "leader123" }
/// ```
///
/// Sets the `token` cookie and returns the user. Unknown email and wrong
/// password are indistinguishable to the caller.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Bytes,
) -> Result<(CookieJar, ApiResponse<User>), ApiError> {
    let request: LoginRequest = parse_valid(&body)?;

    let user = users::find_by_email(state.pool(), &request.email).await?;
    let stored_hash = user.as_ref().map(|user| user.password_hash.as_str());
    let verified = password::verify_account_password(&request.password, stored_hash);

    let user = user
        .filter(|_| verified)
        .ok_or_else(|| {
            tracing::info!("Failed login for {}", request.email);
            ApiError::unauthorized(BAD_CREDENTIALS)
        })?;

    let claims = Claims::for_user(&user, &state.config);
    let token = generate_jwt(&claims, &state.config.security.jwt_secret)?;

    tracing::info!("User {} ({}) signed in", user.id, user.role);
    Ok((
        jar.add(cookie::session_cookie(token, &state.config)),
        ApiResponse::success(user),
    ))
}

/// POST /api/auth/register - Create a TEAM_LEADER account
///
/// Expected Input:
/// ```json
/// { "name": "Sara", "email": "sara@pfe.com", "password": "secret1" }
/// ```
pub async fn register(State(state): State<AppState>, body: Bytes) -> Result<ApiResponse<User>, ApiError> {
    let request: RegisterRequest = parse_valid(&body)?;
    let user = create_account(&state, &request, Role::TeamLeader).await?;
    Ok(ApiResponse::created(user))
}

/// Hash the password and insert the user; a taken email is a 409
pub async fn create_account(state: &AppState, request: &RegisterRequest, role: Role) -> Result<User, ApiError> {
    let hash = password::hash_password(&request.password)?;
    let user = users::create(state.pool(), request.name.trim(), &request.email, &hash, role).await?;
    tracing::info!("Created {} account {} for {}", role, user.id, user.email);
    Ok(user)
}
