use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{Observation, Project, TeamMember, UserSummary};
use crate::types::TeamStatus;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: i64,
    pub team_name: String,
    pub project_name: String,
    pub project_description: Option<String>,
    pub project_logo: Option<String>,
    pub status: TeamStatus,
    pub evaluation_score: Option<f64>,
    pub leader_id: i64,
    pub coordinator_id: Option<i64>,
    pub project_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// A team together with everything the dashboards display about it
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamDetail {
    #[serde(flatten)]
    pub team: Team,
    pub leader: UserSummary,
    pub coordinator: Option<UserSummary>,
    pub project: Option<Project>,
    pub members: Vec<TeamMember>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observations: Option<Vec<Observation>>,
}
