//! Session queries
//!
//! Sessions are keyed by the SHA-256 of the client-held token, so a database
//! leak does not expose usable session cookies.

use crate::db::models::User;
use crate::Result;
use sqlx::SqlitePool;

/// Insert a session row for a user
pub async fn insert_session(pool: &SqlitePool, token_hash: &str, user_guid: &str) -> Result<()> {
    sqlx::query(
        "INSERT INTO sessions (token_hash, user_guid, created_at) VALUES (?, ?, CURRENT_TIMESTAMP)",
    )
    .bind(token_hash)
    .bind(user_guid)
    .execute(pool)
    .await?;

    Ok(())
}

/// Resolve the user a session token hash belongs to
pub async fn find_user_by_token_hash(pool: &SqlitePool, token_hash: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "SELECT u.guid, u.username, u.password_hash, u.created_at
         FROM sessions s
         JOIN users u ON u.guid = s.user_guid
         WHERE s.token_hash = ?",
    )
    .bind(token_hash)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// Delete a session row (logout)
pub async fn delete_session(pool: &SqlitePool, token_hash: &str) -> Result<()> {
    sqlx::query("DELETE FROM sessions WHERE token_hash = ?")
        .bind(token_hash)
        .execute(pool)
        .await?;

    Ok(())
}
