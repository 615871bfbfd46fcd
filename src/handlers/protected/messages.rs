// handlers/protected/messages.rs - /api/messages, the per-team chat log

use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{Query, State},
};

use crate::auth::access::{authorize, Action};
use crate::database::models::Message;
use crate::database::messages;
use crate::database::teams::{self, TeamScope};
use crate::error::ApiError;
use crate::handlers::protected::observations::{readable_team, team_param, TeamNoteRequest};
use crate::handlers::protected::teams::scope_for;
use crate::middleware::{ApiResponse, ApiResult, Identity, VerifiedSession};
use crate::state::AppState;
use crate::types::Role;
use crate::validation::parse_valid;

/// GET /api/messages?teamId=N - A team's chat, oldest first
pub async fn list(
    State(state): State<AppState>,
    identity: Identity,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Vec<Message>> {
    authorize(Action::ListMessages, identity.role)?;

    let team_id = team_param(&params)?;
    readable_team(&state, team_id, scope_for(&identity)).await?;

    Ok(ApiResponse::success(messages::list_for_team(state.pool(), team_id).await?))
}

/// POST /api/messages - Post to a team's chat
///
/// Expected Input:
/// ```json
/// { "teamId": 3, "message": "Meeting moved to Thursday" }
/// ```
///
/// Leaders may only post to their own team. Coordinators and the admin may
/// post to any existing team.
pub async fn create(State(state): State<AppState>, session: VerifiedSession, body: Bytes) -> ApiResult<Message> {
    let identity = session.identity;
    authorize(Action::SendMessage, identity.role)?;

    let request: TeamNoteRequest = parse_valid(&body)?;
    let (team_id, text) = request.parts();

    let scope = match identity.role {
        Role::TeamLeader => TeamScope::LedBy(identity.user_id),
        Role::Coordinator | Role::SuperAdmin => TeamScope::All,
    };

    if teams::find_in_scope(state.pool(), team_id, scope).await?.is_none() {
        return Err(match scope {
            TeamScope::LedBy(_) => ApiError::forbidden("Unauthorized"),
            _ => ApiError::not_found("Team not found"),
        });
    }

    let message = messages::create(state.pool(), team_id, identity.user_id, text).await?;
    tracing::debug!("User {} posted message {} to team {}", identity.user_id, message.id, team_id);
    Ok(ApiResponse::created(message))
}
