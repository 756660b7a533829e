//! Disk storage for sample media
//!
//! Uploaded files are routed by MIME type: images under `img/`, audio under
//! `samples/`. Filenames derive from the upload timestamp. Removal is
//! best-effort: failures are logged and never surfaced to the client.

use chrono::Utc;
use samplebin_common::db::samples;
use sqlx::SqlitePool;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

/// Media category, determining the storage directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Image,
    Audio,
}

impl FileKind {
    fn dir_name(self) -> &'static str {
        match self {
            FileKind::Image => "img",
            FileKind::Audio => "samples",
        }
    }
}

/// Storage errors surfaced to upload handlers
#[derive(Debug, Error)]
pub enum StoreError {
    /// Declared or actual content type is not an accepted image format
    #[error("Image file must be .jpeg or .gif")]
    UnsupportedImage,

    /// Declared or actual content type is not an accepted audio format
    #[error("Audio file must be .mp3 or .wav")]
    UnsupportedAudio,

    /// Disk write failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A file written to disk, identified by kind and stored filename
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub kind: FileKind,
    pub filename: String,
}

/// An upload mid-write: validated, on disk, not yet complete
///
/// Must end in [`finish`](PendingFile::finish) or
/// [`abort`](PendingFile::abort); an aborted upload takes its partial file
/// with it.
pub struct PendingFile {
    stored: StoredFile,
    path: PathBuf,
    file: tokio::fs::File,
}

impl PendingFile {
    pub async fn write_chunk(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        self.file.write_all(bytes).await
    }

    pub async fn finish(mut self) -> std::io::Result<StoredFile> {
        self.file.flush().await?;
        Ok(self.stored)
    }

    /// Remove the partial file after a failed transfer
    pub async fn abort(self) {
        drop(self.file);
        if let Err(e) = tokio::fs::remove_file(&self.path).await {
            warn!("Could not delete {}: {}", self.path.display(), e);
        }
    }
}

/// Disambiguates files stored within the same millisecond
static NEXT_SEQ: AtomicU32 = AtomicU32::new(0);

/// Media storage rooted at the configured data directory
#[derive(Clone)]
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the media subdirectories if missing
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.dir(FileKind::Image))?;
        std::fs::create_dir_all(self.dir(FileKind::Audio))?;
        Ok(())
    }

    pub fn dir(&self, kind: FileKind) -> PathBuf {
        self.root.join(kind.dir_name())
    }

    pub fn path_for(&self, kind: FileKind, filename: &str) -> PathBuf {
        self.dir(kind).join(filename)
    }

    /// Validate an uploaded file's first chunk and open its destination
    ///
    /// The declared content type picks the extension; the magic bytes at the
    /// start of the first chunk must agree. On success the chunk is on disk
    /// and the remaining chunks go through [`PendingFile::write_chunk`], so
    /// a large upload is never held in memory whole.
    pub async fn begin_store(
        &self,
        kind: FileKind,
        declared_mime: Option<&str>,
        first_chunk: &[u8],
    ) -> Result<PendingFile, StoreError> {
        let ext = declared_mime
            .and_then(|mime| declared_ext(kind, mime))
            .filter(|ext| magic_matches(ext, first_chunk))
            .ok_or(match kind {
                FileKind::Image => StoreError::UnsupportedImage,
                FileKind::Audio => StoreError::UnsupportedAudio,
            })?;

        let seq = NEXT_SEQ.fetch_add(1, Ordering::Relaxed) % 10_000;
        let filename = format!("{}-{:04}.{}", Utc::now().timestamp_millis(), seq, ext);
        let path = self.path_for(kind, &filename);

        let mut file = tokio::fs::File::create(&path).await?;
        file.write_all(first_chunk).await?;

        Ok(PendingFile {
            stored: StoredFile { kind, filename },
            path,
            file,
        })
    }

    /// Best-effort file removal; logs failures instead of propagating them
    pub async fn remove(&self, kind: FileKind, filename: &str) {
        let path = self.path_for(kind, filename);
        if let Err(e) = tokio::fs::remove_file(&path).await {
            warn!("Could not delete {}: {}", path.display(), e);
        }
    }

    pub async fn remove_stored(&self, file: &StoredFile) {
        self.remove(file.kind, &file.filename).await;
    }

    /// Remove every staged file in the given set
    ///
    /// Used when a partially-uploaded request fails validation: whatever was
    /// already written must not outlive the rejected request.
    pub async fn discard(&self, files: impl IntoIterator<Item = StoredFile>) {
        for file in files {
            self.remove_stored(&file).await;
        }
    }

    /// Delete media files not referenced by any persisted sample
    ///
    /// Run at startup: a crash between "file written" and "row persisted"
    /// leaves an orphaned file, and this sweep reclaims it. Returns the
    /// number of files removed.
    pub async fn reconcile(&self, pool: &SqlitePool) -> samplebin_common::Result<u64> {
        let mut referenced: HashSet<String> = HashSet::new();
        for sample in samples::list_all(pool).await? {
            referenced.extend(sample.imageid);
            referenced.extend(sample.soundid);
        }

        let mut removed = 0;
        for kind in [FileKind::Image, FileKind::Audio] {
            removed += sweep_dir(&self.dir(kind), &referenced)?;
        }

        if removed > 0 {
            info!("Reconciliation removed {} orphaned file(s)", removed);
        }

        Ok(removed)
    }
}

fn sweep_dir(dir: &Path, referenced: &HashSet<String>) -> std::io::Result<u64> {
    let mut removed = 0;
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if !referenced.contains(&name) {
            match std::fs::remove_file(entry.path()) {
                Ok(()) => {
                    info!("Removed orphaned file {}", entry.path().display());
                    removed += 1;
                }
                Err(e) => warn!("Could not delete {}: {}", entry.path().display(), e),
            }
        }
    }
    Ok(removed)
}

/// Map an accepted declared MIME type to the stored extension
fn declared_ext(kind: FileKind, mime: &str) -> Option<&'static str> {
    match kind {
        FileKind::Image => match mime {
            "image/jpeg" => Some("jpeg"),
            "image/gif" => Some("gif"),
            _ => None,
        },
        FileKind::Audio => match mime {
            "audio/mp3" | "audio/mpeg" => Some("mp3"),
            "audio/wav" | "audio/x-wav" | "audio/wave" => Some("wav"),
            _ => None,
        },
    }
}

/// Verify the file's magic bytes agree with the declared type
fn magic_matches(ext: &str, bytes: &[u8]) -> bool {
    match infer::get(bytes) {
        Some(t) => matches!(
            (ext, t.extension()),
            ("jpeg", "jpg") | ("gif", "gif") | ("mp3", "mp3") | ("wav", "wav")
        ),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use samplebin_common::db::init_database;

    pub const JPEG_BYTES: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46];
    pub const GIF_BYTES: &[u8] = b"GIF89a\x01\x00\x01\x00";
    pub const WAV_BYTES: &[u8] = b"RIFF\x24\x00\x00\x00WAVEfmt ";
    pub const MP3_BYTES: &[u8] = b"ID3\x03\x00\x00\x00\x00\x00\x00";

    fn storage() -> (tempfile::TempDir, Storage) {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path());
        storage.ensure_dirs().unwrap();
        (dir, storage)
    }

    async fn store(
        storage: &Storage,
        kind: FileKind,
        mime: &str,
        bytes: &[u8],
    ) -> Result<StoredFile, StoreError> {
        let pending = storage.begin_store(kind, Some(mime), bytes).await?;
        Ok(pending.finish().await?)
    }

    #[tokio::test]
    async fn stores_by_kind_and_extension() {
        let (_dir, storage) = storage();

        let image = store(&storage, FileKind::Image, "image/jpeg", JPEG_BYTES)
            .await
            .unwrap();
        assert!(image.filename.ends_with(".jpeg"));
        assert!(storage.path_for(FileKind::Image, &image.filename).exists());

        let sound = store(&storage, FileKind::Audio, "audio/wav", WAV_BYTES)
            .await
            .unwrap();
        assert!(sound.filename.ends_with(".wav"));
        assert!(storage.path_for(FileKind::Audio, &sound.filename).exists());
    }

    #[tokio::test]
    async fn streams_chunks_to_disk() {
        let (_dir, storage) = storage();

        let mut pending = storage
            .begin_store(FileKind::Audio, Some("audio/wav"), WAV_BYTES)
            .await
            .unwrap();
        pending.write_chunk(b"more audio data").await.unwrap();
        pending.write_chunk(b" and the tail").await.unwrap();
        let stored = pending.finish().await.unwrap();

        let written = std::fs::read(storage.path_for(FileKind::Audio, &stored.filename)).unwrap();
        let mut expected = WAV_BYTES.to_vec();
        expected.extend_from_slice(b"more audio data and the tail");
        assert_eq!(written, expected);
    }

    #[tokio::test]
    async fn abort_removes_partial_file() {
        let (_dir, storage) = storage();

        let mut pending = storage
            .begin_store(FileKind::Image, Some("image/gif"), GIF_BYTES)
            .await
            .unwrap();
        pending.write_chunk(b"half an image").await.unwrap();
        pending.abort().await;

        assert_eq!(
            std::fs::read_dir(storage.dir(FileKind::Image)).unwrap().count(),
            0
        );
    }

    #[tokio::test]
    async fn rejects_unsupported_declared_type() {
        let (_dir, storage) = storage();

        let err = store(&storage, FileKind::Image, "image/png", JPEG_BYTES)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UnsupportedImage));

        let err = store(&storage, FileKind::Audio, "audio/flac", WAV_BYTES)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UnsupportedAudio));

        // Nothing may be written for a rejected file
        assert_eq!(std::fs::read_dir(storage.dir(FileKind::Image)).unwrap().count(), 0);
        assert_eq!(std::fs::read_dir(storage.dir(FileKind::Audio)).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn rejects_mismatched_magic_bytes() {
        let (_dir, storage) = storage();

        // Declared JPEG, actually GIF content
        let err = store(&storage, FileKind::Image, "image/jpeg", GIF_BYTES)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UnsupportedImage));

        // Declared WAV, actually MP3 content
        let err = store(&storage, FileKind::Audio, "audio/wav", MP3_BYTES)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UnsupportedAudio));
    }

    #[tokio::test]
    async fn remove_missing_file_is_non_fatal() {
        let (_dir, storage) = storage();
        storage.remove(FileKind::Image, "never-existed.jpeg").await;
    }

    #[tokio::test]
    async fn reconcile_removes_only_orphans() {
        let (_dir, storage) = storage();
        let db_dir = tempfile::tempdir().unwrap();
        let pool = init_database(&db_dir.path().join("test.db")).await.unwrap();

        let kept_image = store(&storage, FileKind::Image, "image/gif", GIF_BYTES)
            .await
            .unwrap();
        let kept_sound = store(&storage, FileKind::Audio, "audio/mpeg", MP3_BYTES)
            .await
            .unwrap();
        let orphan = store(&storage, FileKind::Audio, "audio/wav", WAV_BYTES)
            .await
            .unwrap();

        let sample = samplebin_common::db::Sample {
            guid: uuid::Uuid::new_v4().to_string(),
            user: "alice1".to_string(),
            name: "Kick1".to_string(),
            instruments: "drums".to_string(),
            description: None,
            imageid: Some(kept_image.filename.clone()),
            soundid: Some(kept_sound.filename.clone()),
            date_uploaded: chrono::Utc::now(),
            numdownloads: 0,
        };
        samples::insert_sample(&pool, &sample).await.unwrap();

        let removed = storage.reconcile(&pool).await.unwrap();
        assert_eq!(removed, 1);
        assert!(storage.path_for(FileKind::Image, &kept_image.filename).exists());
        assert!(storage.path_for(FileKind::Audio, &kept_sound.filename).exists());
        assert!(!storage.path_for(FileKind::Audio, &orphan.filename).exists());
    }
}
