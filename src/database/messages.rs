use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::database::manager::DatabaseError;
use crate::database::models::{Message, Sender};
use crate::types::Role;

#[derive(FromRow)]
struct MessageRow {
    id: i64,
    team_id: i64,
    sender_id: i64,
    message: String,
    created_at: DateTime<Utc>,
    sender_name: String,
    sender_role: Role,
}

impl From<MessageRow> for Message {
    fn from(row: MessageRow) -> Self {
        Message {
            id: row.id,
            team_id: row.team_id,
            sender_id: row.sender_id,
            message: row.message,
            created_at: row.created_at,
            sender: Sender {
                id: row.sender_id,
                name: row.sender_name,
                role: row.sender_role,
            },
        }
    }
}

/// Chat log of one team in the order it was written
pub async fn list_for_team(pool: &PgPool, team_id: i64) -> Result<Vec<Message>, DatabaseError> {
    let rows = sqlx::query_as::<_, MessageRow>(
        "SELECT m.id, m.team_id, m.sender_id, m.message, m.created_at,
                u.name AS sender_name, u.role AS sender_role
         FROM messages m JOIN users u ON u.id = m.sender_id
         WHERE m.team_id = $1
         ORDER BY m.created_at ASC, m.id ASC",
    )
    .bind(team_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Message::from).collect())
}

pub async fn create(pool: &PgPool, team_id: i64, sender_id: i64, message: &str) -> Result<Message, DatabaseError> {
    let row = sqlx::query_as::<_, MessageRow>(
        "WITH m AS (
             INSERT INTO messages (team_id, sender_id, message)
             VALUES ($1, $2, $3)
             RETURNING *
         )
         SELECT m.id, m.team_id, m.sender_id, m.message, m.created_at,
                u.name AS sender_name, u.role AS sender_role
         FROM m JOIN users u ON u.id = m.sender_id",
    )
    .bind(team_id)
    .bind(sender_id)
    .bind(message)
    .fetch_one(pool)
    .await
    .map_err(|e| match DatabaseError::foreign_key_violation(&e) {
        Some(_) => DatabaseError::NotFound("Team not found".to_string()),
        None => DatabaseError::from(e),
    })?;

    Ok(row.into())
}
