use std::collections::BTreeMap;

use serde::Serialize;
use sqlx::PgPool;

use crate::database::manager::DatabaseError;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemStats {
    pub total_users: i64,
    pub total_teams: i64,
    pub total_projects: i64,
    pub total_coordinators: i64,
    pub total_team_leaders: i64,
    pub teams_by_status: BTreeMap<String, i64>,
    pub projects_by_status: BTreeMap<String, i64>,
}

/// System-wide counts for the admin dashboard
pub async fn collect(pool: &PgPool) -> Result<SystemStats, DatabaseError> {
    let (total_users, total_coordinators, total_team_leaders): (i64, i64, i64) = sqlx::query_as(
        "SELECT COUNT(*),
                COUNT(*) FILTER (WHERE role = 'COORDINATOR'),
                COUNT(*) FILTER (WHERE role = 'TEAM_LEADER')
         FROM users",
    )
    .fetch_one(pool)
    .await?;

    let teams_by_status = count_by_status(pool, "SELECT status::TEXT, COUNT(*) FROM teams GROUP BY status").await?;
    let projects_by_status =
        count_by_status(pool, "SELECT status::TEXT, COUNT(*) FROM projects GROUP BY status").await?;

    Ok(SystemStats {
        total_users,
        total_teams: teams_by_status.values().sum(),
        total_projects: projects_by_status.values().sum(),
        total_coordinators,
        total_team_leaders,
        teams_by_status,
        projects_by_status,
    })
}

async fn count_by_status(pool: &PgPool, sql: &str) -> Result<BTreeMap<String, i64>, DatabaseError> {
    let rows: Vec<(String, i64)> = sqlx::query_as(sql).fetch_all(pool).await?;
    Ok(rows.into_iter().collect())
}
