pub mod manager;
pub mod members;
pub mod messages;
pub mod models;
pub mod observations;
pub mod projects;
pub mod stats;
pub mod teams;
pub mod users;

pub use manager::{DatabaseError, DatabaseManager};
