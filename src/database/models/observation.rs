use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Coordinator remark on a team. Rows are only ever inserted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    pub id: i64,
    pub team_id: i64,
    pub coordinator_id: i64,
    pub coordinator_name: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}
