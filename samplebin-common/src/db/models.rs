//! Database models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub guid: String,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// A user-owned record pairing an image and an audio file with metadata
///
/// `imageid` and `soundid` are stored filenames under the media directories.
/// Every persisted sample references files that exist on disk; the files are
/// written before the row is inserted, and superseded files are removed only
/// after the row update succeeds.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Sample {
    pub guid: String,
    /// Owner username (denormalized, immutable)
    pub user: String,
    pub name: String,
    pub instruments: String,
    pub description: Option<String>,
    pub imageid: Option<String>,
    pub soundid: Option<String>,
    pub date_uploaded: DateTime<Utc>,
    pub numdownloads: i64,
}
