//! Modify handler: edit or delete an owned sample
//!
//! The sample is addressed by name via the query string. Ownership is
//! checked before anything else touches disk or database. Replacement files
//! go through the same MIME validation as uploads; superseded files are
//! removed only after the row update succeeds.

use crate::api::form::read_sample_form;
use crate::api::pages::render;
use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::storage::{FileKind, StoredFile};
use crate::AppState;
use axum::{
    extract::{Multipart, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use samplebin_common::db::{samples, Sample};
use serde::Deserialize;

const DETAIL_HTML: &str = include_str!("../ui/sampledetail.html");

#[derive(Debug, Deserialize)]
pub struct ModifyParams {
    pub sample: Option<String>,
}

/// Look up the sample and verify the requesting user owns it
async fn owned_sample(
    state: &AppState,
    name: &str,
    username: &str,
) -> Result<Sample, ApiError> {
    let sample = samples::find_by_name(&state.db, name)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Sample {} does not exist", name)))?;

    if sample.user != username {
        return Err(ApiError::Unauthorized(format!(
            "No permission to modify sample {}",
            name
        )));
    }

    Ok(sample)
}

fn render_detail(sample: &Sample, message: &str) -> String {
    let query =
        serde_urlencoded::to_string([("sample", sample.name.as_str())]).unwrap_or_default();

    render(
        DETAIL_HTML,
        &[
            ("query", query.as_str()),
            ("name", &sample.name),
            ("user", &sample.user),
            ("instruments", &sample.instruments),
            ("description", sample.description.as_deref().unwrap_or("")),
            ("imageid", sample.imageid.as_deref().unwrap_or("")),
            ("soundid", sample.soundid.as_deref().unwrap_or("")),
            (
                "date_uploaded",
                &sample.date_uploaded.format("%-d/%-m/%Y").to_string(),
            ),
            ("numdownloads", &sample.numdownloads.to_string()),
            ("message", message),
        ],
    )
}

/// GET /modify?sample=<name>
pub async fn modify_page(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(params): Query<ModifyParams>,
) -> Result<Html<String>, ApiError> {
    let name = params
        .sample
        .ok_or_else(|| ApiError::NotFound("Cannot GET /modify".to_string()))?;

    let sample = owned_sample(&state, &name, &user.username).await?;
    Ok(Html(render_detail(&sample, "")))
}

/// POST /modify?sample=<name>
pub async fn modify_submit(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(params): Query<ModifyParams>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let name = params
        .sample
        .ok_or_else(|| ApiError::NotFound("Cannot POST /modify".to_string()))?;

    // Serialize concurrent edits to the same sample name
    let _guard = state.locks.lock(&name).await;

    let mut sample = owned_sample(&state, &name, &user.username).await?;

    let mut form = match read_sample_form(multipart, &state.storage).await {
        Ok(form) => form,
        Err(rejection) => {
            return Ok(Html(render_detail(&sample, &rejection.0)).into_response())
        }
    };

    // Exactly one of save/delete must be requested
    if form.save == form.delete {
        state.storage.discard(form.staged()).await;
        return Ok(Html(render_detail(&sample, "You must press save or delete")).into_response());
    }

    if form.delete {
        // Files arriving with a delete request have no record to belong to
        state.storage.discard(form.staged()).await;

        samples::delete_sample(&state.db, &sample.guid).await?;
        if let Some(imageid) = &sample.imageid {
            state.storage.remove(FileKind::Image, imageid).await;
        }
        if let Some(soundid) = &sample.soundid {
            state.storage.remove(FileKind::Audio, soundid).await;
        }
        return Ok(Redirect::to("/").into_response());
    }

    // save: apply non-empty text updates and swap in any replacement files
    if let Some(new_name) = form.name.take() {
        sample.name = new_name;
    }
    if let Some(instruments) = form.instruments.take() {
        sample.instruments = instruments;
    }
    if let Some(description) = form.description.take() {
        sample.description = Some(description);
    }

    let mut superseded: Vec<StoredFile> = Vec::new();
    if let Some(new_image) = &form.image {
        if let Some(old) = sample.imageid.replace(new_image.filename.clone()) {
            superseded.push(StoredFile {
                kind: FileKind::Image,
                filename: old,
            });
        }
    }
    if let Some(new_sound) = &form.sound {
        if let Some(old) = sample.soundid.replace(new_sound.filename.clone()) {
            superseded.push(StoredFile {
                kind: FileKind::Audio,
                filename: old,
            });
        }
    }

    if let Err(e) = samples::update_sample(&state.db, &sample).await {
        // Failed persist: keep the old files, drop the new ones
        state.storage.discard(form.staged()).await;
        let message = e.to_string();
        let original = samples::find_by_name(&state.db, &name).await?.unwrap_or(sample);
        return Ok(Html(render_detail(&original, &message)).into_response());
    }

    // Superseded files are removed only after the row update succeeded
    state.storage.discard(superseded).await;

    let query =
        serde_urlencoded::to_string([("sample", sample.name.as_str())]).unwrap_or_default();
    Ok(Redirect::to(&format!("/modify?{}", query)).into_response())
}
