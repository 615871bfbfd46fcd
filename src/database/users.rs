use sqlx::PgPool;

use crate::database::manager::DatabaseError;
use crate::database::models::User;
use crate::types::Role;

const USER_COLUMNS: &str = "id, name, email, password_hash, role, created_at";

pub const EMAIL_TAKEN: &str = "Email already registered";

/// Insert a user; a duplicate email is a conflict decided by the unique constraint
pub async fn create(
    pool: &PgPool,
    name: &str,
    email: &str,
    password_hash: &str,
    role: Role,
) -> Result<User, DatabaseError> {
    let sql = format!(
        "INSERT INTO users (name, email, password_hash, role) VALUES ($1, $2, $3, $4) RETURNING {USER_COLUMNS}"
    );

    sqlx::query_as::<_, User>(&sql)
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(role)
        .fetch_one(pool)
        .await
        .map_err(|e| match DatabaseError::unique_violation(&e) {
            Some(_) => DatabaseError::Conflict(EMAIL_TAKEN.to_string()),
            None => e.into(),
        })
}

/// Insert a user unless the email already exists; returns the stored row either way
pub async fn ensure(
    pool: &PgPool,
    name: &str,
    email: &str,
    password_hash: &str,
    role: Role,
) -> Result<(User, bool), DatabaseError> {
    let sql = format!(
        "INSERT INTO users (name, email, password_hash, role) VALUES ($1, $2, $3, $4)
         ON CONFLICT ON CONSTRAINT users_email_key DO NOTHING
         RETURNING {USER_COLUMNS}"
    );

    let inserted = sqlx::query_as::<_, User>(&sql)
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(role)
        .fetch_optional(pool)
        .await?;

    match inserted {
        Some(user) => Ok((user, true)),
        None => find_by_email(pool, email)
            .await?
            .map(|user| (user, false))
            .ok_or_else(|| DatabaseError::NotFound(format!("user {email}"))),
    }
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, DatabaseError> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
    Ok(sqlx::query_as::<_, User>(&sql).bind(email).fetch_optional(pool).await?)
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<User>, DatabaseError> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
    Ok(sqlx::query_as::<_, User>(&sql).bind(id).fetch_optional(pool).await?)
}

/// Every user, newest first
pub async fn list(pool: &PgPool) -> Result<Vec<User>, DatabaseError> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC, id DESC");
    Ok(sqlx::query_as::<_, User>(&sql).fetch_all(pool).await?)
}

pub async fn set_password(pool: &PgPool, id: i64, password_hash: &str) -> Result<(), DatabaseError> {
    let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
        .bind(id)
        .bind(password_hash)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound("User not found".to_string()));
    }
    Ok(())
}

/// Administrative update: either field may be left unchanged with `None`
pub async fn admin_update(
    pool: &PgPool,
    id: i64,
    password_hash: Option<&str>,
    role: Option<Role>,
) -> Result<User, DatabaseError> {
    let sql = format!(
        "UPDATE users
         SET password_hash = COALESCE($2, password_hash),
             role = COALESCE($3, role)
         WHERE id = $1
         RETURNING {USER_COLUMNS}"
    );

    sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .bind(password_hash)
        .bind(role)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound("User not found".to_string()))
}
