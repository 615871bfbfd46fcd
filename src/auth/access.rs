//! Per-endpoint authorization table.
//!
//! Each handler names the [`Action`] it performs and calls [`authorize`] before
//! reading its body. Ownership (a leader's own team, a coordinator's assigned
//! teams) is scoped inside the queries, not here.

use crate::error::ApiError;
use crate::types::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ViewProfile,
    ChangePassword,
    ListTeams,
    ListAllTeams,
    CreateTeam,
    AddMember,
    EditMember,
    RemoveMember,
    UpdateTeamStatus,
    DeleteTeam,
    EvaluateTeam,
    ListProjects,
    CreateProject,
    ApplyToProject,
    ListObservations,
    PostObservation,
    ListMessages,
    SendMessage,
    ManageUsers,
    ViewStats,
    CreateCoordinator,
}

use Role::{Coordinator, SuperAdmin, TeamLeader};

const EVERYONE: &[Role] = &[TeamLeader, Coordinator, SuperAdmin];
const LEADERS: &[Role] = &[TeamLeader];
const COORDINATORS: &[Role] = &[Coordinator];
const REVIEWERS: &[Role] = &[Coordinator, SuperAdmin];
const ADMINS: &[Role] = &[SuperAdmin];

impl Action {
    pub const ALL: [Action; 21] = [
        Action::ViewProfile,
        Action::ChangePassword,
        Action::ListTeams,
        Action::ListAllTeams,
        Action::CreateTeam,
        Action::AddMember,
        Action::EditMember,
        Action::RemoveMember,
        Action::UpdateTeamStatus,
        Action::DeleteTeam,
        Action::EvaluateTeam,
        Action::ListProjects,
        Action::CreateProject,
        Action::ApplyToProject,
        Action::ListObservations,
        Action::PostObservation,
        Action::ListMessages,
        Action::SendMessage,
        Action::ManageUsers,
        Action::ViewStats,
        Action::CreateCoordinator,
    ];

    pub fn allowed_roles(&self) -> &'static [Role] {
        match self {
            Action::ViewProfile
            | Action::ChangePassword
            | Action::ListTeams
            | Action::ListProjects
            | Action::ListObservations
            | Action::ListMessages
            | Action::SendMessage => EVERYONE,
            Action::CreateTeam
            | Action::AddMember
            | Action::EditMember
            | Action::RemoveMember
            | Action::ApplyToProject => LEADERS,
            Action::CreateProject | Action::PostObservation => COORDINATORS,
            Action::ListAllTeams
            | Action::UpdateTeamStatus
            | Action::DeleteTeam
            | Action::EvaluateTeam => REVIEWERS,
            Action::ManageUsers | Action::ViewStats | Action::CreateCoordinator => ADMINS,
        }
    }

    /// Message returned to a caller whose role is not in the table
    pub fn denial_message(&self) -> &'static str {
        match self {
            Action::CreateTeam => "Only team leaders can create teams",
            Action::AddMember => "Only team leaders can add members",
            Action::EditMember => "Only team leaders can edit members",
            Action::ApplyToProject => "Only team leaders can apply to projects",
            Action::CreateProject => "Only coordinators can create projects",
            Action::PostObservation => "Only coordinators can post observations",
            _ => "Unauthorized",
        }
    }

    pub fn permits(&self, role: Role) -> bool {
        self.allowed_roles().contains(&role)
    }
}

/// Table lookup: Ok when `role` may perform `action`, 403 otherwise
pub fn authorize(action: Action, role: Role) -> Result<(), ApiError> {
    if action.permits(role) {
        Ok(())
    } else {
        tracing::debug!("Denied {:?} for role {}", action, role);
        Err(ApiError::forbidden(action.denial_message()))
    }
}
