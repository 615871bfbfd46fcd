//! Project queries. Coordinators see their own projects with the teams that
//! applied, leaders see open projects, the admin sees everything.

use std::collections::HashMap;

use sqlx::{FromRow, PgPool};

use crate::database::manager::DatabaseError;
use crate::database::models::{Project, ProjectDetail, ProjectTeam, UserSummary};
use crate::types::{ProjectStatus, TeamStatus};

const PROJECT_COLUMNS: &str = "p.id, p.title, p.description, p.status, p.created_by, p.created_at";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectScope {
    All,
    CreatedBy(i64),
    Open,
}

impl ProjectScope {
    fn binds(self) -> (Option<i64>, Option<ProjectStatus>) {
        match self {
            ProjectScope::All => (None, None),
            ProjectScope::CreatedBy(id) => (Some(id), None),
            ProjectScope::Open => (None, Some(ProjectStatus::Open)),
        }
    }

    /// Leaders only get the count of applied teams, not the teams themselves
    fn includes_teams(self) -> bool {
        !matches!(self, ProjectScope::Open)
    }
}

#[derive(FromRow)]
struct ProjectRow {
    #[sqlx(flatten)]
    project: Project,
    creator_name: String,
    creator_email: String,
    team_count: i64,
}

#[derive(FromRow)]
struct AppliedTeamRow {
    id: i64,
    team_name: String,
    project_name: String,
    status: TeamStatus,
    project_id: i64,
    leader_id: i64,
    leader_name: String,
    leader_email: String,
    member_count: i64,
}

pub async fn create(
    pool: &PgPool,
    created_by: i64,
    title: &str,
    description: Option<&str>,
) -> Result<Project, DatabaseError> {
    let sql = format!(
        "INSERT INTO projects AS p (title, description, created_by) VALUES ($1, $2, $3)
         RETURNING {PROJECT_COLUMNS}"
    );

    sqlx::query_as::<_, Project>(&sql)
        .bind(title)
        .bind(description)
        .bind(created_by)
        .fetch_one(pool)
        .await
        .map_err(|e| match DatabaseError::foreign_key_violation(&e) {
            Some(_) => DatabaseError::NotFound("User not found".to_string()),
            None => e.into(),
        })
}

pub async fn list(pool: &PgPool, scope: ProjectScope) -> Result<Vec<ProjectDetail>, DatabaseError> {
    let (creator, status) = scope.binds();
    let sql = format!(
        "SELECT {PROJECT_COLUMNS},
                u.name AS creator_name, u.email AS creator_email,
                (SELECT COUNT(*) FROM teams t WHERE t.project_id = p.id) AS team_count
         FROM projects p
         JOIN users u ON u.id = p.created_by
         WHERE ($1::BIGINT IS NULL OR p.created_by = $1)
           AND ($2::project_status IS NULL OR p.status = $2)
         ORDER BY p.created_at DESC, p.id DESC"
    );

    let rows = sqlx::query_as::<_, ProjectRow>(&sql)
        .bind(creator)
        .bind(status)
        .fetch_all(pool)
        .await?;

    let mut applied = if scope.includes_teams() && !rows.is_empty() {
        let ids: Vec<i64> = rows.iter().map(|r| r.project.id).collect();
        Some(applied_teams(pool, &ids).await?)
    } else {
        None
    };

    Ok(rows
        .into_iter()
        .map(|row| ProjectDetail {
            creator: UserSummary {
                id: row.project.created_by,
                name: row.creator_name,
                email: row.creator_email,
            },
            team_count: row.team_count,
            teams: applied
                .as_mut()
                .map(|by_project| by_project.remove(&row.project.id).unwrap_or_default()),
            project: row.project,
        })
        .collect())
}

async fn applied_teams(pool: &PgPool, project_ids: &[i64]) -> Result<HashMap<i64, Vec<ProjectTeam>>, DatabaseError> {
    let rows = sqlx::query_as::<_, AppliedTeamRow>(
        "SELECT t.id, t.team_name, t.project_name, t.status, t.project_id,
                l.id AS leader_id, l.name AS leader_name, l.email AS leader_email,
                (SELECT COUNT(*) FROM team_members m WHERE m.team_id = t.id) AS member_count
         FROM teams t
         JOIN users l ON l.id = t.leader_id
         WHERE t.project_id = ANY($1)
         ORDER BY t.id",
    )
    .bind(project_ids)
    .fetch_all(pool)
    .await?;

    let mut grouped: HashMap<i64, Vec<ProjectTeam>> = HashMap::new();
    for row in rows {
        grouped.entry(row.project_id).or_default().push(ProjectTeam {
            id: row.id,
            team_name: row.team_name,
            project_name: row.project_name,
            status: row.status,
            leader: UserSummary {
                id: row.leader_id,
                name: row.leader_name,
                email: row.leader_email,
            },
            member_count: row.member_count,
        });
    }
    Ok(grouped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaders_browse_open_projects_without_teams() {
        assert_eq!(ProjectScope::Open.binds(), (None, Some(ProjectStatus::Open)));
        assert!(!ProjectScope::Open.includes_teams());
        assert!(ProjectScope::CreatedBy(4).includes_teams());
        assert!(ProjectScope::All.includes_teams());
    }
}
