use sqlx::PgPool;

use crate::database::manager::DatabaseError;
use crate::database::models::{MemberFields, TeamMember};

const MEMBER_COLUMNS: &str = "id, team_id, first_name, last_name, cin, cne, email, github_link, \
     linkedin_link, phone_number, photo, created_at";

pub async fn add(pool: &PgPool, team_id: i64, fields: &MemberFields) -> Result<TeamMember, DatabaseError> {
    let sql = format!(
        "INSERT INTO team_members
             (team_id, first_name, last_name, cin, cne, email, github_link, linkedin_link, phone_number, photo)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
         RETURNING {MEMBER_COLUMNS}"
    );

    sqlx::query_as::<_, TeamMember>(&sql)
        .bind(team_id)
        .bind(&fields.first_name)
        .bind(&fields.last_name)
        .bind(&fields.cin)
        .bind(&fields.cne)
        .bind(&fields.email)
        .bind(&fields.github_link)
        .bind(&fields.linkedin_link)
        .bind(&fields.phone_number)
        .bind(&fields.photo)
        .fetch_one(pool)
        .await
        .map_err(|e| match DatabaseError::foreign_key_violation(&e) {
            Some(_) => DatabaseError::NotFound("Team not found".to_string()),
            None => e.into(),
        })
}

/// Replace a member's fields. The photo is kept when `fields.photo` is `None`.
/// Returns `None` unless the member belongs to `team_id`.
pub async fn update(
    pool: &PgPool,
    team_id: i64,
    member_id: i64,
    fields: &MemberFields,
) -> Result<Option<TeamMember>, DatabaseError> {
    let sql = format!(
        "UPDATE team_members
         SET first_name = $3, last_name = $4, cin = $5, cne = $6, email = $7,
             github_link = $8, linkedin_link = $9, phone_number = $10,
             photo = COALESCE($11, photo)
         WHERE id = $1 AND team_id = $2
         RETURNING {MEMBER_COLUMNS}"
    );

    Ok(sqlx::query_as::<_, TeamMember>(&sql)
        .bind(member_id)
        .bind(team_id)
        .bind(&fields.first_name)
        .bind(&fields.last_name)
        .bind(&fields.cin)
        .bind(&fields.cne)
        .bind(&fields.email)
        .bind(&fields.github_link)
        .bind(&fields.linkedin_link)
        .bind(&fields.phone_number)
        .bind(&fields.photo)
        .fetch_optional(pool)
        .await?)
}

/// Remove a member of `team_id`; false when no such member exists in that team
pub async fn remove(pool: &PgPool, team_id: i64, member_id: i64) -> Result<bool, DatabaseError> {
    let result = sqlx::query("DELETE FROM team_members WHERE id = $1 AND team_id = $2")
        .bind(member_id)
        .bind(team_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn list_for_teams(pool: &PgPool, team_ids: &[i64]) -> Result<Vec<TeamMember>, DatabaseError> {
    let sql = format!("SELECT {MEMBER_COLUMNS} FROM team_members WHERE team_id = ANY($1) ORDER BY id");
    Ok(sqlx::query_as::<_, TeamMember>(&sql).bind(team_ids).fetch_all(pool).await?)
}
