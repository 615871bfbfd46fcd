// handlers/protected/members.rs - /api/teams/members (POST, PUT, DELETE ?id=)

use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{Query, State},
};
use serde::Deserialize;

use crate::auth::access::{authorize, Action};
use crate::database::models::{MemberFields, Team, TeamMember};
use crate::database::{members, teams};
use crate::error::ApiError;
use crate::handlers::Done;
use crate::middleware::{ApiResponse, ApiResult, VerifiedSession};
use crate::state::AppState;
use crate::validation::{non_empty, parse_body, query_id, Checks, Validate};

const NO_TEAM: &str = "You don't have a team yet";
const MEMBER_NOT_FOUND: &str = "Member not found in your team";

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MemberRequest {
    pub member_id: Option<i64>,
    pub first_name: String,
    pub last_name: String,
    pub cin: Option<String>,
    pub cne: Option<String>,
    pub email: Option<String>,
    pub github_link: Option<String>,
    pub linkedin_link: Option<String>,
    pub phone_number: Option<String>,
    pub photo: Option<String>,
}

impl Validate for MemberRequest {
    fn validate(&self) -> Result<(), ApiError> {
        Checks::new()
            .min_len("firstName", self.first_name.trim(), 1, "First name is required")
            .min_len("lastName", self.last_name.trim(), 1, "Last name is required")
            .optional_email("email", self.email.as_deref().map(str::trim), "Invalid email")
            .optional_url("githubLink", self.github_link.as_deref().map(str::trim), "Invalid URL")
            .optional_url("linkedinLink", self.linkedin_link.as_deref().map(str::trim), "Invalid URL")
            .finish()
    }
}

impl MemberRequest {
    /// Column values; empty optional strings are stored as NULL
    fn into_fields(self) -> MemberFields {
        MemberFields {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            cin: non_empty(self.cin),
            cne: non_empty(self.cne),
            email: non_empty(self.email),
            github_link: non_empty(self.github_link),
            linkedin_link: non_empty(self.linkedin_link),
            phone_number: non_empty(self.phone_number),
            photo: non_empty(self.photo),
        }
    }
}

async fn own_team(state: &AppState, leader_id: i64) -> Result<Team, ApiError> {
    teams::find_by_leader(state.pool(), leader_id)
        .await?
        .ok_or_else(|| ApiError::not_found(NO_TEAM))
}

/// POST /api/teams/members - Add a member to the caller's team
///
/// Expected Input:
/// ```json
/// {
///   "firstName": "Yassine", "lastName": "Amrani",
///   "cin": "AB123456", "cne": "R130000000",
///   "email": "", "githubLink": "https://github.com/yamrani",
///   "linkedinLink": "", "phoneNumber": "0600000000", "photo": null
/// }
/// ```
pub async fn add(State(state): State<AppState>, session: VerifiedSession, body: Bytes) -> ApiResult<TeamMember> {
    let identity = session.identity;
    authorize(Action::AddMember, identity.role)?;

    let team = own_team(&state, identity.user_id).await?;
    let request: MemberRequest = parse_body(&body)?;
    request.validate()?;

    let member = members::add(state.pool(), team.id, &request.into_fields()).await?;
    tracing::info!("Member {} added to team {}", member.id, team.id);
    Ok(ApiResponse::created(member))
}

/// PUT /api/teams/members - Edit a member of the caller's team
///
/// Same body as POST plus `memberId`. `photo` is only replaced when sent.
pub async fn update(State(state): State<AppState>, session: VerifiedSession, body: Bytes) -> ApiResult<TeamMember> {
    let identity = session.identity;
    authorize(Action::EditMember, identity.role)?;

    let team = own_team(&state, identity.user_id).await?;
    let request: MemberRequest = parse_body(&body)?;
    let member_id = request
        .member_id
        .ok_or_else(|| ApiError::bad_request("memberId is required"))?;
    request.validate()?;

    let member = members::update(state.pool(), team.id, member_id, &request.into_fields())
        .await?
        .ok_or_else(|| ApiError::not_found(MEMBER_NOT_FOUND))?;

    tracing::info!("Member {} of team {} updated", member.id, team.id);
    Ok(ApiResponse::success(member))
}

/// DELETE /api/teams/members?id=N - Remove a member of the caller's team
pub async fn remove(
    State(state): State<AppState>,
    session: VerifiedSession,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Done> {
    let identity = session.identity;
    authorize(Action::RemoveMember, identity.role)?;

    let member_id = query_id(&params, "id").ok_or_else(|| ApiError::bad_request("Member id is required"))?;
    let team = own_team(&state, identity.user_id).await?;

    if !members::remove(state.pool(), team.id, member_id).await? {
        return Err(ApiError::not_found(MEMBER_NOT_FOUND));
    }

    tracing::info!("Member {} removed from team {}", member_id, team.id);
    Ok(ApiResponse::success(Done::new("Member deleted successfully")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member() -> MemberRequest {
        MemberRequest {
            first_name: "Yassine".into(),
            last_name: "Amrani".into(),
            ..Default::default()
        }
    }

    #[test]
    fn names_are_required() {
        let mut request = member();
        request.last_name = "  ".into();
        assert_eq!(request.validate().unwrap_err().message(), "Last name is required");
    }

    #[test]
    fn empty_links_pass_and_become_null() {
        let mut request = member();
        request.email = Some(String::new());
        request.github_link = Some(String::new());
        request.cin = Some("AB123".into());
        assert!(request.validate().is_ok());

        let fields = request.into_fields();
        assert_eq!(fields.email, None);
        assert_eq!(fields.github_link, None);
        assert_eq!(fields.cin.as_deref(), Some("AB123"));
    }

    #[test]
    fn non_empty_links_must_be_urls() {
        let mut request = member();
        request.linkedin_link = Some("linkedin.com/in/someone".into());
        let err = request.validate().unwrap_err();
        assert_eq!(err.message(), "Invalid URL");
        assert_eq!(err.to_json()["fieldErrors"]["linkedinLink"], "Invalid URL");
    }
}
