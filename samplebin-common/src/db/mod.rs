//! Database models and queries

pub mod init;
pub mod models;
pub mod samples;
pub mod sessions;
pub mod users;

pub use init::init_database;
pub use models::{Sample, User};
