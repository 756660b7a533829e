//! # Samplebin Common Library
//!
//! Shared code for the samplebin service:
//! - Database models and queries
//! - Configuration loading
//! - Common error types

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
