//! Server-rendered pages: index, auth forms, upload form
//!
//! Validation failures re-render the form with a message (HTTP 200). The
//! index page is a static shell; the client-side app fetches /api/samples
//! and renders the cards.

use crate::auth::{password, session, CurrentUser};
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use samplebin_common::db::users;
use serde::Deserialize;
use tracing::warn;

const INDEX_HTML: &str = include_str!("../ui/index.html");
const LOGIN_HTML: &str = include_str!("../ui/login.html");
const REGISTER_HTML: &str = include_str!("../ui/register.html");
const UPLOAD_HTML: &str = include_str!("../ui/upload.html");
const APP_JS: &str = include_str!("../ui/app.js");

/// Minimum length for usernames and passwords
const MIN_CREDENTIAL_LEN: usize = 5;

/// Replace `{{key}}` placeholders in a page template, HTML-escaping values
pub(crate) fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut page = template.to_string();
    for (key, value) in vars {
        page = page.replace(&format!("{{{{{}}}}}", key), &html_escape(value));
    }
    page
}

fn html_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// GET /
pub async fn serve_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /static/app.js
pub async fn serve_app_js() -> Response {
    (
        StatusCode::OK,
        [("content-type", "application/javascript")],
        APP_JS,
    )
        .into_response()
}

/// Login/register form body
#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

fn validate_credentials(creds: &Credentials) -> Result<(), &'static str> {
    if creds.username.len() < MIN_CREDENTIAL_LEN {
        return Err("Username too short");
    }
    if creds.password.len() < MIN_CREDENTIAL_LEN {
        return Err("Password too short");
    }
    Ok(())
}

/// GET /login
pub async fn login_page() -> Html<String> {
    Html(render(LOGIN_HTML, &[("message", "")]))
}

/// POST /login
pub async fn login_submit(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(creds): Form<Credentials>,
) -> Response {
    if let Err(message) = validate_credentials(&creds) {
        return login_error(message);
    }

    let user = match users::find_by_username(&state.db, &creds.username).await {
        Ok(Some(user)) => user,
        Ok(None) => return login_error("Username is incorrect"),
        Err(e) => return login_error(&e.to_string()),
    };

    if !password::verify_password(&creds.password, &user.password_hash) {
        return login_error("Password is incorrect");
    }

    match session::start_session(&state.db, &user.guid).await {
        Ok(cookie) => (jar.add(cookie), Redirect::to("/")).into_response(),
        Err(e) => login_error(&e.to_string()),
    }
}

fn login_error(message: &str) -> Response {
    Html(render(LOGIN_HTML, &[("message", message)])).into_response()
}

/// GET /register
pub async fn register_page() -> Html<String> {
    Html(render(REGISTER_HTML, &[("message", "")]))
}

/// POST /register
pub async fn register_submit(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(creds): Form<Credentials>,
) -> Response {
    if let Err(message) = validate_credentials(&creds) {
        return register_error(message);
    }

    match users::find_by_username(&state.db, &creds.username).await {
        Ok(Some(_)) => return register_error("Username already taken"),
        Ok(None) => {}
        Err(e) => return register_error(&e.to_string()),
    }

    let hash = match password::hash_password(&creds.password) {
        Ok(hash) => hash,
        Err(e) => return register_error(&e.to_string()),
    };

    let user = match users::create_user(&state.db, &creds.username, &hash).await {
        Ok(user) => user,
        Err(e) => return register_error(&e.to_string()),
    };

    match session::start_session(&state.db, &user.guid).await {
        Ok(cookie) => (jar.add(cookie), Redirect::to("/")).into_response(),
        Err(e) => register_error(&e.to_string()),
    }
}

fn register_error(message: &str) -> Response {
    Html(render(REGISTER_HTML, &[("message", message)])).into_response()
}

/// GET /logout
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> Response {
    if let Err(e) = session::end_session(&state.db, &jar).await {
        warn!("Could not delete session: {}", e);
    }
    let jar = jar.remove(Cookie::from(session::SESSION_COOKIE));
    (jar, Redirect::to("/")).into_response()
}

/// GET /upload
pub async fn upload_page(_user: CurrentUser) -> Html<String> {
    Html(render(UPLOAD_HTML, &[("message", "")]))
}

pub(crate) fn upload_form_with_message(message: &str) -> Response {
    Html(render(UPLOAD_HTML, &[("message", message)])).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_substitutes_and_escapes() {
        let page = render("<p>{{message}}</p>", &[("message", "a < b & \"c\"")]);
        assert_eq!(page, "<p>a &lt; b &amp; &quot;c&quot;</p>");
    }

    #[test]
    fn credential_length_limits() {
        let short_user = Credentials {
            username: "abcd".to_string(),
            password: "secret1".to_string(),
        };
        assert_eq!(validate_credentials(&short_user), Err("Username too short"));

        let short_pass = Credentials {
            username: "alice1".to_string(),
            password: "1234".to_string(),
        };
        assert_eq!(validate_credentials(&short_pass), Err("Password too short"));

        let ok = Credentials {
            username: "alice1".to_string(),
            password: "secret1".to_string(),
        };
        assert!(validate_credentials(&ok).is_ok());
    }
}
