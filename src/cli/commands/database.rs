use serde_json::json;

use crate::auth::password::hash_password;
use crate::cli::{utils, OutputFormat};
use crate::config;
use crate::database::{users, DatabaseManager};
use crate::types::Role;

/// Accounts every fresh installation starts with
pub const DEFAULT_ACCOUNTS: [(&str, &str, &str, Role); 3] = [
    ("Super Admin", "admin@pfe.com", "admin123", Role::SuperAdmin),
    ("Coordinator", "coordinator@pfe.com", "coord123", Role::Coordinator),
    ("Team Leader", "leader@pfe.com", "leader123", Role::TeamLeader),
];

pub async fn migrate(output_format: OutputFormat) -> anyhow::Result<()> {
    let db = DatabaseManager::connect(&config::config().database).await?;
    db.migrate().await?;
    db.close().await;

    utils::output_success(output_format, "Migrations applied", None)
}

/// Insert the default accounts; existing emails are left untouched
pub async fn seed(output_format: OutputFormat) -> anyhow::Result<()> {
    let db = DatabaseManager::connect(&config::config().database).await?;

    let mut seeded = Vec::new();
    for (name, email, password, role) in DEFAULT_ACCOUNTS {
        let hash = hash_password(password)?;
        let (user, created) = users::ensure(db.pool(), name, email, &hash, role).await?;

        if let OutputFormat::Text = output_format {
            let state = if created { "created" } else { "exists" };
            println!("  {:<22} {:<12} {}", user.email, user.role.as_str(), state);
        }
        seeded.push(json!({ "id": user.id, "email": user.email, "role": user.role, "created": created }));
    }

    db.close().await;
    utils::output_success(output_format, "Default accounts ready", Some(json!({ "users": seeded })))
}
