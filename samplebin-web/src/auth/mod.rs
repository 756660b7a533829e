//! Authentication: password hashing, sessions and request extractors

pub mod password;
pub mod session;

use crate::AppState;
use axum::{
    async_trait, extract::FromRequestParts, http::request::Parts, response::Redirect,
};
use axum_extra::extract::cookie::CookieJar;
use samplebin_common::db::User;
use std::convert::Infallible;

/// Extractor for routes restricted to logged-in users
///
/// Requests without a valid session are redirected to the login page.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Redirect> {
        let jar = CookieJar::from_headers(&parts.headers);
        match session::user_from_jar(&state.db, &jar).await {
            Ok(Some(user)) => Ok(CurrentUser(user)),
            _ => Err(Redirect::to("/login")),
        }
    }
}

/// Optional identity for endpoints that only personalize their response
pub struct MaybeUser(pub Option<User>);

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Infallible> {
        let jar = CookieJar::from_headers(&parts.headers);
        let user = session::user_from_jar(&state.db, &jar)
            .await
            .unwrap_or(None);
        Ok(MaybeUser(user))
    }
}
