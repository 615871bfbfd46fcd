pub mod auth;
pub mod members;
pub mod messages;
pub mod observations;
pub mod pages;
pub mod projects;
pub mod teams;
