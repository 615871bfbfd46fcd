pub mod member;
pub mod message;
pub mod observation;
pub mod project;
pub mod team;
pub mod user;

pub use member::{MemberFields, TeamMember};
pub use message::Message;
pub use observation::Observation;
pub use project::{Project, ProjectDetail, ProjectTeam};
pub use team::{Team, TeamDetail};
pub use user::{Sender, User, UserSummary};
