use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::UserSummary;
use crate::types::ProjectStatus;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
}

/// Team that applied to a project, as listed under the project
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectTeam {
    pub id: i64,
    pub team_name: String,
    pub project_name: String,
    pub status: crate::types::TeamStatus,
    pub leader: UserSummary,
    pub member_count: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: Project,
    pub creator: UserSummary,
    pub team_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teams: Option<Vec<ProjectTeam>>,
}
