use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::PgPool;

use crate::config::AppConfig;
use crate::database::DatabaseManager;

/// Shared by every handler: the pool and the immutable configuration
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseManager,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(db: DatabaseManager, config: AppConfig) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    pub fn pool(&self) -> &PgPool {
        self.db.pool()
    }
}

impl FromRef<AppState> for Arc<AppConfig> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
