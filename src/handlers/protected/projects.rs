// handlers/protected/projects.rs - /api/projects, /api/projects/apply

use axum::{body::Bytes, extract::State};
use serde::Deserialize;

use crate::auth::access::{authorize, Action};
use crate::database::models::{Project, ProjectDetail, Team};
use crate::database::projects::{self, ProjectScope};
use crate::database::teams::{self, Application};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, Identity, VerifiedSession};
use crate::state::AppState;
use crate::types::Role;
use crate::validation::{non_empty, parse_body, parse_valid, Checks, Validate};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateProjectRequest {
    pub title: String,
    pub description: Option<String>,
}

impl Validate for CreateProjectRequest {
    fn validate(&self) -> Result<(), ApiError> {
        Checks::new()
            .min_len("title", self.title.trim(), 2, "Title must be at least 2 characters")
            .finish()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ApplyRequest {
    pub project_id: Option<i64>,
}

/// GET /api/projects
///
/// Coordinator: own projects with the teams that applied. Leader: OPEN
/// projects with a team count. Admin: every project with its teams.
pub async fn list(State(state): State<AppState>, identity: Identity) -> ApiResult<Vec<ProjectDetail>> {
    authorize(Action::ListProjects, identity.role)?;

    let scope = match identity.role {
        Role::Coordinator => ProjectScope::CreatedBy(identity.user_id),
        Role::TeamLeader => ProjectScope::Open,
        Role::SuperAdmin => ProjectScope::All,
    };

    Ok(ApiResponse::success(projects::list(state.pool(), scope).await?))
}

/// POST /api/projects - Publish a project
///
/// Expected Input:
/// ```json
/// { "title": "Smart Campus", "description": "optional" }
/// ```
pub async fn create(State(state): State<AppState>, session: VerifiedSession, body: Bytes) -> ApiResult<Project> {
    let identity = session.identity;
    authorize(Action::CreateProject, identity.role)?;

    let request: CreateProjectRequest = parse_valid(&body)?;
    let description = non_empty(request.description);
    let project = projects::create(state.pool(), identity.user_id, request.title.trim(), description.as_deref()).await?;

    tracing::info!("Coordinator {} created project {}", identity.user_id, project.id);
    Ok(ApiResponse::created(project))
}

/// POST /api/projects/apply - Attach the caller's team to an OPEN project
///
/// Expected Input:
/// ```json
/// { "projectId": 7 }
/// ```
pub async fn apply(State(state): State<AppState>, session: VerifiedSession, body: Bytes) -> ApiResult<Team> {
    let identity = session.identity;
    authorize(Action::ApplyToProject, identity.role)?;

    let request: ApplyRequest = parse_body(&body)?;
    let project_id = request
        .project_id
        .ok_or_else(|| ApiError::bad_request("projectId is required"))?;

    let team = teams::find_by_leader(state.pool(), identity.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("You need to create a team first"))?;

    match teams::apply_to_project(state.pool(), team.id, project_id).await? {
        Application::Applied(team) => {
            tracing::info!("Team {} applied to project {}", team.id, project_id);
            Ok(ApiResponse::success(team))
        }
        Application::AlreadyApplied => Err(ApiError::conflict("Your team is already assigned to a project")),
        Application::ProjectUnavailable => Err(ApiError::not_found("Project not found or not open")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_title_is_checked_trimmed() {
        let request = CreateProjectRequest {
            title: " x ".into(),
            description: None,
        };
        assert_eq!(request.validate().unwrap_err().message(), "Title must be at least 2 characters");
    }
}
