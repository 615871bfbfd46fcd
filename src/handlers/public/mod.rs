pub mod auth;
pub mod pages;

pub use auth::{login, register};
