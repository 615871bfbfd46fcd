/// Shared domain enums used by the token, the gatekeeper, the handlers and the store

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// User roles. Stored as the `user_role` Postgres enum and carried in the session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "user_role", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    TeamLeader,
    Coordinator,
    SuperAdmin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::TeamLeader, Role::Coordinator, Role::SuperAdmin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::TeamLeader => "TEAM_LEADER",
            Role::Coordinator => "COORDINATOR",
            Role::SuperAdmin => "SUPER_ADMIN",
        }
    }

    /// Landing page for this role, used by the `/` redirect
    pub fn home_path(&self) -> &'static str {
        match self {
            Role::TeamLeader => "/dashboard",
            Role::Coordinator => "/coordinator",
            Role::SuperAdmin => "/admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TEAM_LEADER" => Ok(Role::TeamLeader),
            "COORDINATOR" => Ok(Role::Coordinator),
            "SUPER_ADMIN" => Ok(Role::SuperAdmin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Team review lifecycle. PENDING -> APPROVED | REJECTED; nothing leaves REJECTED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "team_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TeamStatus {
    Pending,
    Approved,
    Rejected,
}

impl TeamStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TeamStatus::Pending => "PENDING",
            TeamStatus::Approved => "APPROVED",
            TeamStatus::Rejected => "REJECTED",
        }
    }

    /// Whether a reviewer may move a team from `self` to `next`
    pub fn can_transition_to(&self, next: TeamStatus) -> bool {
        matches!(
            (self, next),
            (TeamStatus::Pending, TeamStatus::Approved) | (TeamStatus::Pending, TeamStatus::Rejected)
        )
    }
}

impl fmt::Display for TeamStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "project_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectStatus {
    Open,
    Assigned,
    Closed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_wire_names() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
            assert_eq!(serde_json::to_value(role).unwrap(), role.as_str());
        }
        assert!("ADMIN".parse::<Role>().is_err());
    }

    #[test]
    fn only_pending_teams_move() {
        assert!(TeamStatus::Pending.can_transition_to(TeamStatus::Approved));
        assert!(TeamStatus::Pending.can_transition_to(TeamStatus::Rejected));
        assert!(!TeamStatus::Pending.can_transition_to(TeamStatus::Pending));
        assert!(!TeamStatus::Rejected.can_transition_to(TeamStatus::Approved));
        assert!(!TeamStatus::Rejected.can_transition_to(TeamStatus::Pending));
        assert!(!TeamStatus::Approved.can_transition_to(TeamStatus::Rejected));
    }
}
