use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Postgres error codes the handlers care about
const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Errors from the data store
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl DatabaseError {
    /// Name of the violated unique constraint, if this is a unique violation
    pub fn unique_violation(err: &sqlx::Error) -> Option<String> {
        Self::violation(err, UNIQUE_VIOLATION)
    }

    /// Name of the violated foreign key, if this is a foreign key violation
    pub fn foreign_key_violation(err: &sqlx::Error) -> Option<String> {
        Self::violation(err, FOREIGN_KEY_VIOLATION)
    }

    fn violation(err: &sqlx::Error, code: &str) -> Option<String> {
        match err {
            sqlx::Error::Database(db) if db.code().as_deref() == Some(code) => {
                Some(db.constraint().unwrap_or_default().to_string())
            }
            _ => None,
        }
    }
}

/// Owns the connection pool shared by every request
#[derive(Clone)]
pub struct DatabaseManager {
    pool: PgPool,
}

impl DatabaseManager {
    /// Connect eagerly, failing fast when the database is unreachable
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let url = config.url.as_deref().ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;

        let pool = Self::pool_options(config).connect(url).await?;
        info!("Connected to database {}", Self::redacted(url));
        Ok(Self { pool })
    }

    /// Build a pool that opens connections on first use
    pub fn connect_lazy(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let url = config.url.as_deref().ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;

        let pool = Self::pool_options(config).connect_lazy(url)?;
        Ok(Self { pool })
    }

    fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply the embedded SQL migrations
    pub async fn migrate(&self) -> Result<(), DatabaseError> {
        MIGRATOR.run(&self.pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("Closed database pool");
    }

    /// Connection URL with the password masked, for logs
    fn redacted(raw: &str) -> String {
        match url::Url::parse(raw) {
            Ok(mut url) => {
                if url.password().is_some() {
                    let _ = url.set_password(Some("***"));
                }
                url.to_string()
            }
            Err(_) => "<unparseable url>".to_string(),
        }
    }
}
