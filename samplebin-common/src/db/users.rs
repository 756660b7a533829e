//! User queries

use crate::db::models::User;
use crate::Result;
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Insert a new user and return it
pub async fn create_user(pool: &SqlitePool, username: &str, password_hash: &str) -> Result<User> {
    let user = User {
        guid: Uuid::new_v4().to_string(),
        username: username.to_string(),
        password_hash: password_hash.to_string(),
        created_at: Utc::now(),
    };

    sqlx::query(
        "INSERT INTO users (guid, username, password_hash, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(&user.guid)
    .bind(&user.username)
    .bind(&user.password_hash)
    .bind(user.created_at)
    .execute(pool)
    .await?;

    Ok(user)
}

/// Look up a user by username
pub async fn find_by_username(pool: &SqlitePool, username: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "SELECT guid, username, password_hash, created_at FROM users WHERE username = ?",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// Look up a user by guid
pub async fn find_by_guid(pool: &SqlitePool, guid: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "SELECT guid, username, password_hash, created_at FROM users WHERE guid = ?",
    )
    .bind(guid)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}
