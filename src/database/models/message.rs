use chrono::{DateTime, Utc};
use serde::Serialize;

use super::Sender;

/// One line of a team's chat log
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: i64,
    pub team_id: i64,
    pub sender_id: i64,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub sender: Sender,
}
