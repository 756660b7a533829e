//! Cookie-backed sessions
//!
//! The client holds an opaque random token in a cookie; the database stores
//! only the SHA-256 of the token, joined to the user it identifies.

use axum_extra::extract::cookie::{Cookie, CookieJar};
use samplebin_common::db::{sessions, User};
use samplebin_common::Result;
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;

/// Session cookie name
pub const SESSION_COOKIE: &str = "samplebin_session";

/// Generate a fresh 256-bit session token, hex encoded
fn generate_token() -> String {
    let bytes: [u8; 32] = rand::random();
    hex::encode(bytes)
}

/// SHA-256 of a session token, hex encoded, as stored at rest
fn token_hash(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Create a session for a user and return the cookie carrying its token
pub async fn start_session(pool: &SqlitePool, user_guid: &str) -> Result<Cookie<'static>> {
    let token = generate_token();
    sessions::insert_session(pool, &token_hash(&token), user_guid).await?;

    Ok(Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .build())
}

/// Resolve the user behind the session cookie, if any
pub async fn user_from_jar(pool: &SqlitePool, jar: &CookieJar) -> Result<Option<User>> {
    match jar.get(SESSION_COOKIE) {
        Some(cookie) => sessions::find_user_by_token_hash(pool, &token_hash(cookie.value())).await,
        None => Ok(None),
    }
}

/// Remove the session row behind the cookie, if any
pub async fn end_session(pool: &SqlitePool, jar: &CookieJar) -> Result<()> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        sessions::delete_session(pool, &token_hash(cookie.value())).await?;
    }
    Ok(())
}
