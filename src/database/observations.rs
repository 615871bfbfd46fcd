use sqlx::PgPool;

use crate::database::manager::DatabaseError;
use crate::database::models::Observation;

const OBSERVATION_SELECT: &str = "SELECT o.id, o.team_id, o.coordinator_id, u.name AS coordinator_name, \
     o.message, o.created_at FROM observations o JOIN users u ON u.id = o.coordinator_id";

/// Observations on one team, newest first
pub async fn list_for_team(pool: &PgPool, team_id: i64) -> Result<Vec<Observation>, DatabaseError> {
    list_for_teams(pool, &[team_id]).await
}

pub async fn list_for_teams(pool: &PgPool, team_ids: &[i64]) -> Result<Vec<Observation>, DatabaseError> {
    let sql = format!("{OBSERVATION_SELECT} WHERE o.team_id = ANY($1) ORDER BY o.created_at DESC, o.id DESC");
    Ok(sqlx::query_as::<_, Observation>(&sql).bind(team_ids).fetch_all(pool).await?)
}

pub async fn create(
    pool: &PgPool,
    team_id: i64,
    coordinator_id: i64,
    message: &str,
) -> Result<Observation, DatabaseError> {
    sqlx::query_as::<_, Observation>(
        "WITH o AS (
             INSERT INTO observations (team_id, coordinator_id, message)
             VALUES ($1, $2, $3)
             RETURNING *
         )
         SELECT o.id, o.team_id, o.coordinator_id, u.name AS coordinator_name, o.message, o.created_at
         FROM o JOIN users u ON u.id = o.coordinator_id",
    )
    .bind(team_id)
    .bind(coordinator_id)
    .bind(message)
    .fetch_one(pool)
    .await
    .map_err(|e| match DatabaseError::foreign_key_violation(&e) {
        Some(_) => DatabaseError::NotFound("Team not found".to_string()),
        None => e.into(),
    })
}
