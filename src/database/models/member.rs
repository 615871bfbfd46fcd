use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub id: i64,
    pub team_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub cin: Option<String>,
    pub cne: Option<String>,
    pub email: Option<String>,
    pub github_link: Option<String>,
    pub linkedin_link: Option<String>,
    pub phone_number: Option<String>,
    pub photo: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Column values for inserting or replacing a member's personal fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemberFields {
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
