// handlers/protected/observations.rs - /api/observations

use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{Query, State},
};
use serde::Deserialize;

use crate::auth::access::{authorize, Action};
use crate::database::models::Observation;
use crate::database::observations;
use crate::database::teams::{self, TeamScope};
use crate::error::ApiError;
use crate::handlers::protected::teams::{scope_for, NOT_ASSIGNED};
use crate::middleware::{ApiResponse, ApiResult, Identity, VerifiedSession};
use crate::state::AppState;
use crate::validation::{parse_valid, query_id, Checks, Validate};

/// `?teamId=N` shared by the observation and message listings
pub fn team_param(params: &HashMap<String, String>) -> Result<i64, ApiError> {
    query_id(params, "teamId").ok_or_else(|| ApiError::bad_request("teamId is required"))
}

/// Body shared by observations and chat messages
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TeamNoteRequest {
    pub team_id: Option<i64>,
    pub message: String,
}

impl Validate for TeamNoteRequest {
    fn validate(&self) -> Result<(), ApiError> {
        Checks::new()
            .positive_id("teamId", self.team_id, "teamId must be a positive integer")
            .min_len("message", self.message.trim(), 1, "Message is required")
            .finish()
    }
}

impl TeamNoteRequest {
    /// Validated team id and trimmed message
    pub fn parts(&self) -> (i64, &str) {
        (self.team_id.unwrap_or_default(), self.message.trim())
    }
}

/// Ok when `scope` may read the team's thread; 403 otherwise
pub async fn readable_team(state: &AppState, team_id: i64, scope: TeamScope) -> Result<(), ApiError> {
    if scope == TeamScope::All {
        return Ok(());
    }
    teams::find_in_scope(state.pool(), team_id, scope)
        .await?
        .map(|_| ())
        .ok_or_else(|| ApiError::forbidden("Unauthorized"))
}

/// GET /api/observations?teamId=N - Observations on a team, newest first
pub async fn list(
    State(state): State<AppState>,
    identity: Identity,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Vec<Observation>> {
    authorize(Action::ListObservations, identity.role)?;

    let team_id = team_param(&params)?;
    readable_team(&state, team_id, scope_for(&identity)).await?;

    Ok(ApiResponse::success(observations::list_for_team(state.pool(), team_id).await?))
}

/// POST /api/observations - Remark on a team the caller coordinates
///
/// Expected Input:
/// ```json
/// { "teamId": 3, "message": "Update the architecture diagram" }
/// ```
pub async fn create(State(state): State<AppState>, session: VerifiedSession, body: Bytes) -> ApiResult<Observation> {
    let identity = session.identity;
    authorize(Action::PostObservation, identity.role)?;

    let request: TeamNoteRequest = parse_valid(&body)?;
    let (team_id, message) = request.parts();

    teams::find_in_scope(state.pool(), team_id, TeamScope::AssignedTo(identity.user_id))
        .await?
        .ok_or_else(|| ApiError::forbidden(NOT_ASSIGNED))?;

    let observation = observations::create(state.pool(), team_id, identity.user_id, message).await?;
    tracing::info!("Coordinator {} posted observation {} on team {}", identity.user_id, observation.id, team_id);
    Ok(ApiResponse::created(observation))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notes_need_a_team_and_text() {
        let request = TeamNoteRequest {
            team_id: Some(0),
            message: "hi".into(),
        };
        assert_eq!(request.validate().unwrap_err().message(), "teamId must be a positive integer");

        let request = TeamNoteRequest {
            team_id: Some(3),
            message: "   ".into(),
        };
        assert_eq!(request.validate().unwrap_err().message(), "Message is required");
    }
}
