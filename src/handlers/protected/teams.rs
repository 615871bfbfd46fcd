// handlers/protected/teams.rs - /api/teams
//
// Leaders manage their single team; coordinators and the admin review,
// evaluate and delete. Ownership is always resolved through a TeamScope.

use axum::{
    body::Bytes,
    extract::{Path, State},
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;

use crate::auth::access::{authorize, Action};
use crate::database::models::{Team, TeamDetail};
use crate::database::teams::{self, NewTeam, TeamScope};
use crate::error::ApiError;
use crate::handlers::Done;
use crate::middleware::{ApiResponse, ApiResult, Identity, VerifiedSession};
use crate::state::AppState;
use crate::types::{Role, TeamStatus};
use crate::validation::{non_empty, parse_body, parse_valid, Checks, Validate};

pub const INVALID_TRANSITION: &str = "Invalid status transition";
pub const NOT_ASSIGNED: &str = "You are not assigned to this team";

/// Teams `identity` owns or is assigned to; everything for the admin
pub fn scope_for(identity: &Identity) -> TeamScope {
    match identity.role {
        Role::TeamLeader => TeamScope::LedBy(identity.user_id),
        Role::Coordinator => TeamScope::AssignedTo(identity.user_id),
        Role::SuperAdmin => TeamScope::All,
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateTeamRequest {
    pub team_name: String,
    pub project_name: String,
    pub project_description: Option<String>,
    pub project_logo: Option<String>,
}

impl Validate for CreateTeamRequest {
    fn validate(&self) -> Result<(), ApiError> {
        Checks::new()
            .min_len("teamName", self.team_name.trim(), 2, "Team name must be at least 2 characters")
            .min_len("projectName", self.project_name.trim(), 2, "Project name must be at least 2 characters")
            .finish()
    }
}

impl From<CreateTeamRequest> for NewTeam {
    fn from(request: CreateTeamRequest) -> Self {
        NewTeam {
            team_name: request.team_name.trim().to_string(),
            project_name: request.project_name.trim().to_string(),
            project_description: non_empty(request.project_description),
            project_logo: non_empty(request.project_logo),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StatusRequest {
    pub team_id: Option<i64>,
    pub status: Option<String>,
}

impl StatusRequest {
    /// Target status, rejecting anything that is not a reviewable outcome
    fn target(&self) -> Result<(i64, TeamStatus), ApiError> {
        let (Some(team_id), Some(status)) = (self.team_id, self.status.as_deref()) else {
            return Err(ApiError::bad_request("teamId and status are required"));
        };

        let next = match status {
            "APPROVED" => TeamStatus::Approved,
            "REJECTED" => TeamStatus::Rejected,
            "PENDING" => TeamStatus::Pending,
            _ => return Err(ApiError::bad_request("Invalid status")),
        };

        // Reviews only ever start from PENDING
        if !TeamStatus::Pending.can_transition_to(next) {
            return Err(ApiError::conflict(INVALID_TRANSITION));
        }

        Ok((team_id, next))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EvaluateRequest {
    pub team_id: Option<i64>,
    pub score: Option<f64>,
}

impl Validate for EvaluateRequest {
    fn validate(&self) -> Result<(), ApiError> {
        let score_ok = matches!(self.score, Some(s) if s.is_finite() && (0.0..=20.0).contains(&s));
        Checks::new()
            .positive_id("teamId", self.team_id, "teamId must be a positive integer")
            .check(score_ok, "score", "Score must be between 0 and 20")
            .finish()
    }
}

/// GET /api/teams - Teams visible to the caller
///
/// Leader: their own team. Coordinator: teams assigned to them. Admin: all.
/// Leader and coordinator views include observations, newest first.
pub async fn list(State(state): State<AppState>, identity: Identity) -> ApiResult<Vec<TeamDetail>> {
    authorize(Action::ListTeams, identity.role)?;
    let teams = teams::list_details(state.pool(), scope_for(&identity)).await?;
    Ok(ApiResponse::success(teams))
}

/// GET /api/teams/all - Every team, for review
pub async fn list_all(State(state): State<AppState>, identity: Identity) -> ApiResult<Vec<TeamDetail>> {
    authorize(Action::ListAllTeams, identity.role)?;
    let teams = teams::list_details(state.pool(), TeamScope::All).await?;
    Ok(ApiResponse::success(teams))
}

/// GET /api/teams/:id - One team; leaders only see their own
pub async fn show(
    State(state): State<AppState>,
    identity: Identity,
    WithRejection(Path(id), _): WithRejection<Path<i64>, ApiError>,
) -> ApiResult<TeamDetail> {
    authorize(Action::ListTeams, identity.role)?;

    let scope = match identity.role {
        Role::TeamLeader => TeamScope::LedBy(identity.user_id),
        Role::Coordinator | Role::SuperAdmin => TeamScope::All,
    };

    teams::find_detail(state.pool(), id, scope)
        .await?
        .map(ApiResponse::success)
        .ok_or_else(|| ApiError::not_found("Team not found"))
}

/// POST /api/teams - Create the caller's team
///
/// Expected Input:
/// ```json
/// {
///   "teamName": "Alpha",
///   "projectName": "Smart Campus",
///   "projectDescription": "optional",
///   "projectLogo": "optional"
/// }
/// ```
pub async fn create(State(state): State<AppState>, session: VerifiedSession, body: Bytes) -> ApiResult<Team> {
    let identity = session.identity;
    authorize(Action::CreateTeam, identity.role)?;

    let request: CreateTeamRequest = parse_valid(&body)?;
    let team = teams::create(state.pool(), identity.user_id, &request.into()).await?;

    tracing::info!("Leader {} created team {} ({})", identity.user_id, team.id, team.team_name);
    Ok(ApiResponse::created(team))
}

/// PATCH /api/teams/status - Approve or reject a PENDING team
///
/// Expected Input:
/// ```json
/// { "teamId": 3, "status": "APPROVED" }
/// ```
///
/// A coordinator approving becomes the team's coordinator in the same
/// conditional update; the admin approves without claiming it.
pub async fn update_status(
    State(state): State<AppState>,
    session: VerifiedSession,
    body: Bytes,
) -> ApiResult<Team> {
    let identity = session.identity;
    authorize(Action::UpdateTeamStatus, identity.role)?;

    let request: StatusRequest = parse_body(&body)?;
    let (team_id, next) = request.target()?;

    let claim_by = match (next, identity.role) {
        (TeamStatus::Approved, Role::Coordinator) => Some(identity.user_id),
        _ => None,
    };

    match teams::transition(state.pool(), team_id, next, claim_by).await? {
        Some(team) => {
            tracing::info!("Team {} moved to {} by user {}", team.id, team.status, identity.user_id);
            Ok(ApiResponse::success(team))
        }
        None => match teams::find_by_id(state.pool(), team_id).await? {
            None => Err(ApiError::not_found("Team not found")),
            Some(team) => {
                tracing::debug!("Refused {} -> {} for team {}", team.status, next, team.id);
                Err(ApiError::conflict(INVALID_TRANSITION))
            }
        },
    }
}

/// DELETE /api/teams/:id - Remove a team with its members, observations and messages
pub async fn delete(
    State(state): State<AppState>,
    session: VerifiedSession,
    WithRejection(Path(id), _): WithRejection<Path<i64>, ApiError>,
) -> ApiResult<Done> {
    let identity = session.identity;
    authorize(Action::DeleteTeam, identity.role)?;

    if teams::delete(state.pool(), id, scope_for(&identity)).await? {
        tracing::info!("Team {} deleted by user {}", id, identity.user_id);
        return Ok(ApiResponse::success(Done::new("Team deleted successfully")));
    }

    match teams::find_by_id(state.pool(), id).await? {
        Some(_) => Err(ApiError::forbidden("You can only delete your own teams")),
        None => Err(ApiError::not_found("Team not found")),
    }
}

/// POST /api/teams/evaluate - Grade a team from 0 to 20
///
/// Expected Input:
/// ```json
/// { "teamId": 3, "score": 15.5 }
/// ```
pub async fn evaluate(State(state): State<AppState>, session: VerifiedSession, body: Bytes) -> ApiResult<Team> {
    let identity = session.identity;
    authorize(Action::EvaluateTeam, identity.role)?;

    let request: EvaluateRequest = parse_valid(&body)?;
    let (team_id, score) = match (request.team_id, request.score) {
        (Some(team_id), Some(score)) => (team_id, score),
        _ => return Err(ApiError::bad_request("teamId and score are required")),
    };

    if let Some(team) = teams::set_score(state.pool(), team_id, score, scope_for(&identity)).await? {
        tracing::info!("Team {} evaluated {} by user {}", team.id, score, identity.user_id);
        return Ok(ApiResponse::success(team));
    }

    match teams::find_by_id(state.pool(), team_id).await? {
        Some(_) => Err(ApiError::forbidden(NOT_ASSIGNED)),
        None => Err(ApiError::not_found("Team not found")),
    }
}
