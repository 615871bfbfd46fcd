//! Team queries. Ownership is expressed as a [`TeamScope`] and folded into the
//! SQL, so a leader or coordinator can never read or touch a team outside it.

use std::collections::HashMap;

use sqlx::{FromRow, PgPool};

use crate::database::manager::DatabaseError;
use crate::database::models::{Observation, Project, Team, TeamDetail, TeamMember, UserSummary};
use crate::database::{members, observations};
use crate::types::TeamStatus;

const TEAM_COLUMNS: &str = "t.id, t.team_name, t.project_name, t.project_description, t.project_logo, \
     t.status, t.evaluation_score, t.leader_id, t.coordinator_id, t.project_id, t.created_at";

pub const ALREADY_HAS_TEAM: &str = "You already have a team. Only one team per leader.";

/// Which teams a caller can see
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeamScope {
    All,
    LedBy(i64),
    AssignedTo(i64),
}

impl TeamScope {
    fn binds(self) -> (Option<i64>, Option<i64>) {
        match self {
            TeamScope::All => (None, None),
            TeamScope::LedBy(id) => (Some(id), None),
            TeamScope::AssignedTo(id) => (None, Some(id)),
        }
    }

    /// Leaders and coordinators see observations; the admin overview does not
    fn includes_observations(self) -> bool {
        !matches!(self, TeamScope::All)
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewTeam {
    pub team_name: String,
    pub project_name: String,
    pub project_description: Option<String>,
    pub project_logo: Option<String>,
}

#[derive(FromRow)]
struct TeamRow {
    #[sqlx(flatten)]
    team: Team,
    leader_name: String,
    leader_email: String,
    coordinator_name: Option<String>,
    coordinator_email: Option<String>,
}

/// Outcome of an application to a project
#[derive(Debug)]
pub enum Application {
    Applied(Team),
    AlreadyApplied,
    ProjectUnavailable,
}

/// Create a team for `leader_id`. UNIQUE(leader_id) decides races between
/// concurrent creations.
pub async fn create(pool: &PgPool, leader_id: i64, new: &NewTeam) -> Result<Team, DatabaseError> {
    let sql = format!(
        "INSERT INTO teams AS t (team_name, project_name, project_description, project_logo, leader_id)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING {TEAM_COLUMNS}"
    );

    sqlx::query_as::<_, Team>(&sql)
        .bind(&new.team_name)
        .bind(&new.project_name)
        .bind(&new.project_description)
        .bind(&new.project_logo)
        .bind(leader_id)
        .fetch_one(pool)
        .await
        .map_err(|e| {
            if DatabaseError::unique_violation(&e).is_some() {
                DatabaseError::Conflict(ALREADY_HAS_TEAM.to_string())
            } else if DatabaseError::foreign_key_violation(&e).is_some() {
                DatabaseError::NotFound("User not found".to_string())
            } else {
                e.into()
            }
        })
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Team>, DatabaseError> {
    let sql = format!("SELECT {TEAM_COLUMNS} FROM teams t WHERE t.id = $1");
    Ok(sqlx::query_as::<_, Team>(&sql).bind(id).fetch_optional(pool).await?)
}

pub async fn find_by_leader(pool: &PgPool, leader_id: i64) -> Result<Option<Team>, DatabaseError> {
    let sql = format!("SELECT {TEAM_COLUMNS} FROM teams t WHERE t.leader_id = $1");
    Ok(sqlx::query_as::<_, Team>(&sql).bind(leader_id).fetch_optional(pool).await?)
}

/// The team with `id` if it falls inside `scope`
pub async fn find_in_scope(pool: &PgPool, id: i64, scope: TeamScope) -> Result<Option<Team>, DatabaseError> {
    let (leader, coordinator) = scope.binds();
    let sql = format!(
        "SELECT {TEAM_COLUMNS} FROM teams t
         WHERE t.id = $1
           AND ($2::BIGINT IS NULL OR t.leader_id = $2)
           AND ($3::BIGINT IS NULL OR t.coordinator_id = $3)"
    );

    Ok(sqlx::query_as::<_, Team>(&sql)
        .bind(id)
        .bind(leader)
        .bind(coordinator)
        .fetch_optional(pool)
        .await?)
}

/// Teams visible in `scope`, newest first, with people, project and members attached
pub async fn list_details(pool: &PgPool, scope: TeamScope) -> Result<Vec<TeamDetail>, DatabaseError> {
    details(pool, scope, None).await
}

pub async fn find_detail(pool: &PgPool, id: i64, scope: TeamScope) -> Result<Option<TeamDetail>, DatabaseError> {
    Ok(details(pool, scope, Some(id)).await?.into_iter().next())
}

async fn details(pool: &PgPool, scope: TeamScope, only: Option<i64>) -> Result<Vec<TeamDetail>, DatabaseError> {
    let (leader, coordinator) = scope.binds();
    let sql = format!(
        "SELECT {TEAM_COLUMNS},
                l.name AS leader_name, l.email AS leader_email,
                c.name AS coordinator_name, c.email AS coordinator_email
         FROM teams t
         JOIN users l ON l.id = t.leader_id
         LEFT JOIN users c ON c.id = t.coordinator_id
         WHERE ($1::BIGINT IS NULL OR t.leader_id = $1)
           AND ($2::BIGINT IS NULL OR t.coordinator_id = $2)
           AND ($3::BIGINT IS NULL OR t.id = $3)
         ORDER BY t.created_at DESC, t.id DESC"
    );

    let rows = sqlx::query_as::<_, TeamRow>(&sql)
        .bind(leader)
        .bind(coordinator)
        .bind(only)
        .fetch_all(pool)
        .await?;

    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let team_ids: Vec<i64> = rows.iter().map(|r| r.team.id).collect();
    let project_ids: Vec<i64> = rows.iter().filter_map(|r| r.team.project_id).collect();

    let mut members = group_by_team(members::list_for_teams(pool, &team_ids).await?, |m| m.team_id);
    let mut observations = if scope.includes_observations() {
        Some(group_by_team(observations::list_for_teams(pool, &team_ids).await?, |o| o.team_id))
    } else {
        None
    };
    let projects: HashMap<i64, Project> = projects_by_id(pool, &project_ids).await?;

    let details = rows
        .into_iter()
        .map(|row| {
            let team = row.team;
            let coordinator = match (team.coordinator_id, row.coordinator_name, row.coordinator_email) {
                (Some(id), Some(name), Some(email)) => Some(UserSummary { id, name, email }),
                _ => None,
            };

            TeamDetail {
                leader: UserSummary {
                    id: team.leader_id,
                    name: row.leader_name,
                    email: row.leader_email,
                },
                coordinator,
                project: team.project_id.and_then(|id| projects.get(&id).cloned()),
                members: members.remove(&team.id).unwrap_or_default(),
                observations: observations
                    .as_mut()
                    .map(|by_team| by_team.remove(&team.id).unwrap_or_default()),
                team,
            }
        })
        .collect();

    Ok(details)
}

fn group_by_team<T>(items: Vec<T>, team_of: impl Fn(&T) -> i64) -> HashMap<i64, Vec<T>> {
    let mut grouped: HashMap<i64, Vec<T>> = HashMap::new();
    for item in items {
        grouped.entry(team_of(&item)).or_default().push(item);
    }
    grouped
}

async fn projects_by_id(pool: &PgPool, ids: &[i64]) -> Result<HashMap<i64, Project>, DatabaseError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let projects = sqlx::query_as::<_, Project>(
        "SELECT id, title, description, status, created_by, created_at FROM projects WHERE id = ANY($1)",
    )
    .bind(ids)
    .fetch_all(pool)
    .await?;

    Ok(projects.into_iter().map(|p| (p.id, p)).collect())
}

/// Move a PENDING team to `next` in a single conditional update.
///
/// `claim_by` records the approving coordinator; `None` leaves the current
/// coordinator untouched. Returns `None` when no PENDING team with `id` exists,
/// which is also what the loser of two concurrent approvals sees.
pub async fn transition(
    pool: &PgPool,
    id: i64,
    next: TeamStatus,
    claim_by: Option<i64>,
) -> Result<Option<Team>, DatabaseError> {
    let sql = format!(
        "UPDATE teams AS t
         SET status = $2, coordinator_id = COALESCE($3, t.coordinator_id)
         WHERE t.id = $1 AND t.status = 'PENDING'
         RETURNING {TEAM_COLUMNS}"
    );

    Ok(sqlx::query_as::<_, Team>(&sql)
        .bind(id)
        .bind(next)
        .bind(claim_by)
        .fetch_optional(pool)
        .await?)
}

/// Delete a team inside `scope`. Members, observations and messages cascade.
pub async fn delete(pool: &PgPool, id: i64, scope: TeamScope) -> Result<bool, DatabaseError> {
    let (leader, coordinator) = scope.binds();
    let result = sqlx::query(
        "DELETE FROM teams
         WHERE id = $1
           AND ($2::BIGINT IS NULL OR leader_id = $2)
           AND ($3::BIGINT IS NULL OR coordinator_id = $3)",
    )
    .bind(id)
    .bind(leader)
    .bind(coordinator)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Record an evaluation score for a team inside `scope`
pub async fn set_score(pool: &PgPool, id: i64, score: f64, scope: TeamScope) -> Result<Option<Team>, DatabaseError> {
    let (leader, coordinator) = scope.binds();
    let sql = format!(
        "UPDATE teams AS t SET evaluation_score = $2
         WHERE t.id = $1
           AND ($3::BIGINT IS NULL OR t.leader_id = $3)
           AND ($4::BIGINT IS NULL OR t.coordinator_id = $4)
         RETURNING {TEAM_COLUMNS}"
    );

    Ok(sqlx::query_as::<_, Team>(&sql)
        .bind(id)
        .bind(score)
        .bind(leader)
        .bind(coordinator)
        .fetch_optional(pool)
        .await?)
}

/// Attach `team_id` to an OPEN project, once
pub async fn apply_to_project(pool: &PgPool, team_id: i64, project_id: i64) -> Result<Application, DatabaseError> {
    let sql = format!(
        "UPDATE teams AS t SET project_id = $2
         WHERE t.id = $1
           AND t.project_id IS NULL
           AND EXISTS (SELECT 1 FROM projects p WHERE p.id = $2 AND p.status = 'OPEN')
         RETURNING {TEAM_COLUMNS}"
    );

    let applied = sqlx::query_as::<_, Team>(&sql)
        .bind(team_id)
        .bind(project_id)
        .fetch_optional(pool)
        .await?;

    if let Some(team) = applied {
        return Ok(Application::Applied(team));
    }

    match find_by_id(pool, team_id).await? {
        Some(team) if team.project_id.is_some() => Ok(Application::AlreadyApplied),
        Some(_) => Ok(Application::ProjectUnavailable),
        None => Err(DatabaseError::NotFound("Team not found".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_binds_one_owner_column_at_most() {
        assert_eq!(TeamScope::All.binds(), (None, None));
        assert_eq!(TeamScope::LedBy(3).binds(), (Some(3), None));
        assert_eq!(TeamScope::AssignedTo(9).binds(), (None, Some(9)));
    }

    #[test]
    fn admin_overview_omits_observations() {
        assert!(!TeamScope::All.includes_observations());
        assert!(TeamScope::LedBy(1).includes_observations());
        assert!(TeamScope::AssignedTo(1).includes_observations());
    }

    #[test]
    fn grouping_keeps_row_order_per_team() {
        let grouped = group_by_team(vec![(1, "a"), (2, "b"), (1, "c")], |(team, _)| *team);
        assert_eq!(grouped[&1], vec![(1, "a"), (1, "c")]);
        assert_eq!(grouped[&2], vec![(2, "b")]);
    }
}
