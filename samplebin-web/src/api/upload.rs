//! Upload handler
//!
//! Ordered, short-circuit validation: per-file MIME checks happen as the
//! multipart fields stream in, then both files must be present, then all
//! three text fields. Any rejection deletes whatever was already written, so
//! a rejected upload leaves the media directories exactly as it found them.
//! Only after every check passes is the sample row persisted.

use crate::api::form::read_sample_form;
use crate::api::pages::upload_form_with_message;
use crate::auth::CurrentUser;
use crate::AppState;
use axum::{
    extract::{Multipart, State},
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use samplebin_common::db::{samples, Sample};
use uuid::Uuid;

/// POST /upload
pub async fn upload_submit(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    multipart: Multipart,
) -> Response {
    let mut form = match read_sample_form(multipart, &state.storage).await {
        Ok(form) => form,
        Err(rejection) => return upload_form_with_message(&rejection.0),
    };

    // A lone file must not outlive the rejected request
    if form.image.is_none() || form.sound.is_none() {
        state.storage.discard(form.staged()).await;
        return upload_form_with_message("Must upload both an image and a sound");
    }

    let (name, instruments, description) = match (
        form.name.clone(),
        form.instruments.clone(),
        form.description.clone(),
    ) {
        (Some(name), Some(instruments), Some(description)) => (name, instruments, description),
        _ => {
            state.storage.discard(form.staged()).await;
            return upload_form_with_message("A field has not been filled out");
        }
    };

    let sample = Sample {
        guid: Uuid::new_v4().to_string(),
        user: user.username,
        name,
        instruments,
        description: Some(description),
        imageid: form.image.as_ref().map(|f| f.filename.clone()),
        soundid: form.sound.as_ref().map(|f| f.filename.clone()),
        date_uploaded: Utc::now(),
        numdownloads: 0,
    };

    // Files are on disk before the row that references them is written; a
    // failed insert (e.g. duplicate name) must take the staged files with it
    if let Err(e) = samples::insert_sample(&state.db, &sample).await {
        state.storage.discard(form.staged()).await;
        return upload_form_with_message(&e.to_string());
    }

    Redirect::to("/").into_response()
}
