//! Sample queries

use crate::db::models::Sample;
use crate::{Error, Result};
use sqlx::SqlitePool;

const SAMPLE_COLUMNS: &str =
    "guid, user, name, instruments, description, imageid, soundid, date_uploaded, numdownloads";

/// Insert a new sample row
pub async fn insert_sample(pool: &SqlitePool, sample: &Sample) -> Result<()> {
    sqlx::query(
        "INSERT INTO samples (guid, user, name, instruments, description, imageid, soundid, date_uploaded, numdownloads)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&sample.guid)
    .bind(&sample.user)
    .bind(&sample.name)
    .bind(&sample.instruments)
    .bind(&sample.description)
    .bind(&sample.imageid)
    .bind(&sample.soundid)
    .bind(sample.date_uploaded)
    .bind(sample.numdownloads)
    .execute(pool)
    .await?;

    Ok(())
}

/// Look up a sample by its unique name
pub async fn find_by_name(pool: &SqlitePool, name: &str) -> Result<Option<Sample>> {
    let sample = sqlx::query_as::<_, Sample>(&format!(
        "SELECT {} FROM samples WHERE name = ?",
        SAMPLE_COLUMNS
    ))
    .bind(name)
    .fetch_optional(pool)
    .await?;

    Ok(sample)
}

/// List all samples, newest first
pub async fn list_all(pool: &SqlitePool) -> Result<Vec<Sample>> {
    let samples = sqlx::query_as::<_, Sample>(&format!(
        "SELECT {} FROM samples ORDER BY date_uploaded DESC",
        SAMPLE_COLUMNS
    ))
    .fetch_all(pool)
    .await?;

    Ok(samples)
}

/// Case-insensitive substring search over owner, name, instruments and
/// description
pub async fn search(pool: &SqlitePool, query: &str) -> Result<Vec<Sample>> {
    let pattern = like_pattern(query);

    let samples = sqlx::query_as::<_, Sample>(&format!(
        "SELECT {} FROM samples
         WHERE lower(user) LIKE ? ESCAPE '\\'
            OR lower(name) LIKE ? ESCAPE '\\'
            OR lower(instruments) LIKE ? ESCAPE '\\'
            OR lower(description) LIKE ? ESCAPE '\\'
         ORDER BY date_uploaded DESC",
        SAMPLE_COLUMNS
    ))
    .bind(&pattern)
    .bind(&pattern)
    .bind(&pattern)
    .bind(&pattern)
    .fetch_all(pool)
    .await?;

    Ok(samples)
}

/// Persist updated fields of an existing sample (matched by guid)
pub async fn update_sample(pool: &SqlitePool, sample: &Sample) -> Result<()> {
    let result = sqlx::query(
        "UPDATE samples
         SET name = ?, instruments = ?, description = ?, imageid = ?, soundid = ?
         WHERE guid = ?",
    )
    .bind(&sample.name)
    .bind(&sample.instruments)
    .bind(&sample.description)
    .bind(&sample.imageid)
    .bind(&sample.soundid)
    .bind(&sample.guid)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Sample guid {}", sample.guid)));
    }

    Ok(())
}

/// Delete a sample row
pub async fn delete_sample(pool: &SqlitePool, guid: &str) -> Result<()> {
    sqlx::query("DELETE FROM samples WHERE guid = ?")
        .bind(guid)
        .execute(pool)
        .await?;

    Ok(())
}

/// Increment the download counter; returns false if no sample has that name
pub async fn increment_downloads(pool: &SqlitePool, name: &str) -> Result<bool> {
    let result = sqlx::query("UPDATE samples SET numdownloads = numdownloads + 1 WHERE name = ?")
        .bind(name)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Number of samples owned by a user
pub async fn count_for_user(pool: &SqlitePool, username: &str) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM samples WHERE user = ?")
        .bind(username)
        .fetch_one(pool)
        .await?;

    Ok(count)
}

/// Escape LIKE metacharacters and wrap the lowercased query in wildcards
fn like_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    for c in query.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    format!("%{}%", escaped)
}
