//! Read API: sample listing, substring search, download counting

use crate::auth::MaybeUser;
use crate::error::ApiResult;
use crate::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use samplebin_common::db::{samples, Sample};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DownloadParams {
    pub soundname: Option<String>,
}

/// GET /api/samples
///
/// All samples plus the requesting user's name ("none" when anonymous).
pub async fn list_samples(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
) -> ApiResult<Json<Value>> {
    let all = samples::list_all(&state.db).await?;
    let username = user
        .map(|u| u.username)
        .unwrap_or_else(|| "none".to_string());

    Ok(Json(json!({
        "samples": all.iter().map(sample_json).collect::<Vec<_>>(),
        "username": username,
    })))
}

/// GET /api/search?query=<substring>
///
/// Case-insensitive substring match over owner, name, instruments and
/// description; a missing or empty query returns everything.
pub async fn search_samples(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<Vec<Value>>> {
    let found = match params.query.as_deref().filter(|q| !q.is_empty()) {
        Some(query) => samples::search(&state.db, query).await?,
        None => samples::list_all(&state.db).await?,
    };

    Ok(Json(found.iter().map(sample_json).collect()))
}

/// GET /api/download?soundname=<name>
///
/// Increments the download counter; the response is a bare status string.
pub async fn record_download(
    State(state): State<AppState>,
    Query(params): Query<DownloadParams>,
) -> ApiResult<Json<String>> {
    let Some(name) = params.soundname else {
        return Ok(Json("Sample not found".to_string()));
    };

    if samples::increment_downloads(&state.db, &name).await? {
        Ok(Json(format!("OK {} updated", name)))
    } else {
        Ok(Json("Sample not found".to_string()))
    }
}

/// JSON shape consumed by the client-side card renderer
fn sample_json(sample: &Sample) -> Value {
    json!({
        // Render key for the client list; unique per response
        "id": format!("{}{}", sample.name, Utc::now().timestamp_millis()),
        "user": sample.user,
        "name": sample.name,
        "instruments": sample.instruments,
        "description": sample.description.as_deref().unwrap_or(""),
        "imageid": sample.imageid.as_deref().unwrap_or(""),
        "soundid": sample.soundid.as_deref().unwrap_or(""),
        "dateUploaded": sample.date_uploaded.format("%-d/%-m/%Y").to_string(),
        "numdownloads": sample.numdownloads.to_string(),
    })
}
