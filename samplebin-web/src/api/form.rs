//! Multipart ingestion shared by the upload and modify handlers
//!
//! Files are streamed to disk chunk by chunk as they arrive, before the
//! surrounding form is validated; no upload is buffered whole in memory.
//! When a field is rejected, anything already staged is removed before the
//! error is returned, so a failed request never leaves files behind.

use crate::storage::{FileKind, Storage, StoredFile};
use axum::extract::Multipart;

/// Decoded upload/modify form
#[derive(Debug, Default)]
pub struct SampleForm {
    pub image: Option<StoredFile>,
    pub sound: Option<StoredFile>,
    pub name: Option<String>,
    pub instruments: Option<String>,
    pub description: Option<String>,
    pub save: bool,
    pub delete: bool,
}

impl SampleForm {
    /// Take whatever files were staged, for cleanup
    pub fn staged(&mut self) -> Vec<StoredFile> {
        self.image
            .take()
            .into_iter()
            .chain(self.sound.take())
            .collect()
    }

    fn text(value: String) -> Option<String> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

/// User-facing rejection message, rendered back into the originating form
#[derive(Debug)]
pub struct FormRejection(pub String);

/// Read all multipart fields, staging accepted files to disk
///
/// A browser submits file inputs even when left empty; such fields are
/// skipped rather than rejected.
pub async fn read_sample_form(
    mut multipart: Multipart,
    storage: &Storage,
) -> Result<SampleForm, FormRejection> {
    let mut form = SampleForm::default();

    loop {
        let mut field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                storage.discard(form.staged()).await;
                return Err(FormRejection(format!("Invalid upload: {}", e)));
            }
        };

        let field_name = field.name().unwrap_or("").to_string();
        match field_name.as_str() {
            "images" | "sounds" => {
                let kind = if field_name == "images" {
                    FileKind::Image
                } else {
                    FileKind::Audio
                };
                let declared_mime = field.content_type().map(str::to_string);
                let file_name = field.file_name().unwrap_or("").to_string();

                let first_chunk = match field.chunk().await {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        storage.discard(form.staged()).await;
                        return Err(FormRejection(format!("Invalid upload: {}", e)));
                    }
                };

                // Empty file input left in the form
                if first_chunk.is_none() && file_name.is_empty() {
                    continue;
                }
                let first_chunk = first_chunk.unwrap_or_default();

                // Type sniffing sees only the first chunk; the magic bytes
                // for every accepted format sit at offset zero
                let mut pending = match storage
                    .begin_store(kind, declared_mime.as_deref(), &first_chunk)
                    .await
                {
                    Ok(pending) => pending,
                    Err(e) => {
                        storage.discard(form.staged()).await;
                        return Err(FormRejection(e.to_string()));
                    }
                };

                let stored = loop {
                    match field.chunk().await {
                        Ok(Some(chunk)) => {
                            if let Err(e) = pending.write_chunk(&chunk).await {
                                pending.abort().await;
                                storage.discard(form.staged()).await;
                                return Err(FormRejection(format!("IO error: {}", e)));
                            }
                        }
                        Ok(None) => match pending.finish().await {
                            Ok(stored) => break stored,
                            Err(e) => {
                                storage.discard(form.staged()).await;
                                return Err(FormRejection(format!("IO error: {}", e)));
                            }
                        },
                        Err(e) => {
                            pending.abort().await;
                            storage.discard(form.staged()).await;
                            return Err(FormRejection(format!("Invalid upload: {}", e)));
                        }
                    }
                };

                let slot = match kind {
                    FileKind::Image => &mut form.image,
                    FileKind::Audio => &mut form.sound,
                };
                if let Some(previous) = slot.replace(stored) {
                    storage.remove_stored(&previous).await;
                }
            }
            "name" | "instruments" | "description" => {
                let value = match field.text().await {
                    Ok(value) => value,
                    Err(e) => {
                        storage.discard(form.staged()).await;
                        return Err(FormRejection(format!("Invalid upload: {}", e)));
                    }
                };
                let value = SampleForm::text(value);
                match field_name.as_str() {
                    "name" => form.name = value,
                    "instruments" => form.instruments = value,
                    _ => form.description = value,
                }
            }
            "save" => form.save = true,
            "delete" => form.delete = true,
            _ => {}
        }
    }

    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_fields_are_trimmed_and_empties_dropped() {
        assert_eq!(SampleForm::text("  drums ".to_string()).as_deref(), Some("drums"));
        assert_eq!(SampleForm::text("   ".to_string()), None);
        assert_eq!(SampleForm::text(String::new()), None);
    }

    #[test]
    fn staged_drains_both_slots() {
        let mut form = SampleForm {
            image: Some(StoredFile {
                kind: FileKind::Image,
                filename: "1.jpeg".to_string(),
            }),
            sound: None,
            ..Default::default()
        };
        let staged = form.staged();
        assert_eq!(staged.len(), 1);
        assert!(form.image.is_none());
        assert!(form.staged().is_empty());
    }
}
