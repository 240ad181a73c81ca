//! Filesystem storage backend — one JSON file per record.
//!
//! Layout:
//!
//! ```text
//! {root}/
//! └── {bs58(type)}/
//!     └── {bs58(id)}.json
//! ```
//!
//! Type tags and ids are base58-encoded so any string is a safe file name.
//!
//! File format:
//! ```json
//! {
//!     "version": 1,
//!     "id": "test-id",
//!     "value": "<base64 value blob>",
//!     "tags": { "myTag": "foobar" }
//! }
//! ```
//!
//! Every write goes to a uniquely named temp file first. `add_record` then
//! hard-links it into place, which fails if the target exists, so two
//! concurrent adds of the same id cannot both succeed. `update_record`
//! renames over the existing file. Readers never observe partial writes.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{
    matches_query, BackendError, BackendErrorKind, BackendResult, StorageBackend, StoredRecord,
};
use crate::record::TagMap;

// ── File format constants ─────────────────────────────────────────────────────

const RECORD_FILE_VERSION: u32 = 1;
const RECORD_EXTENSION: &str = "json";
const TEMP_EXTENSION: &str = "tmp";

// ── On-disk structure ─────────────────────────────────────────────────────────

/// Wrapper written to disk for each record.
#[derive(Debug, Serialize, Deserialize)]
struct RecordFile {
    /// Format version number.
    version: u32,
    /// Record id, stored in clear so the file is self-describing.
    id: String,
    /// Base64-encoded value blob.
    value: String,
    /// Tag map.
    tags: TagMap,
}

// ── FileBackend ───────────────────────────────────────────────────────────────

/// Filesystem-backed [`StorageBackend`].
#[derive(Debug, Clone)]
pub struct FileBackend {
    root: PathBuf,
}

impl FileBackend {
    /// Create a new `FileBackend` rooted at `root`.
    ///
    /// The directory and any missing parents are created if they do not exist.
    pub async fn open(root: impl Into<PathBuf>) -> std::io::Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    /// The root directory of this backend.
    pub fn root(&self) -> &Path {
        &self.root
    }

    // ── Internal helpers ──────────────────────────────────────────────────────

    fn type_dir(&self, record_type: &str) -> PathBuf {
        self.root.join(bs58::encode(record_type).into_string())
    }

    fn record_path(&self, record_type: &str, id: &str) -> PathBuf {
        self.type_dir(record_type).join(format!(
            "{}.{RECORD_EXTENSION}",
            bs58::encode(id).into_string()
        ))
    }

    /// Serialize a record into a fresh temp file next to its final location.
    async fn write_temp(
        &self,
        record_type: &str,
        id: &str,
        value: &[u8],
        tags: &TagMap,
    ) -> BackendResult<PathBuf> {
        let file = RecordFile {
            version: RECORD_FILE_VERSION,
            id: id.to_string(),
            value: base64::Engine::encode(&base64::engine::general_purpose::STANDARD, value),
            tags: tags.clone(),
        };
        let json = serde_json::to_vec_pretty(&file).map_err(|e| {
            BackendError::with_source(BackendErrorKind::Other, "record serialization", e)
        })?;

        let dir = self.type_dir(record_type);
        tokio::fs::create_dir_all(&dir).await?;
        let tmp_path = dir.join(format!("{}.{TEMP_EXTENSION}", uuid::Uuid::new_v4()));
        tokio::fs::write(&tmp_path, json).await?;
        Ok(tmp_path)
    }
}

/// A missing file is reported as `ItemNotFound`.
async fn read_record_file(path: &Path) -> BackendResult<StoredRecord> {
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            BackendError::not_found(path.display().to_string())
        } else {
            BackendError::io(e)
        }
    })?;
    let file: RecordFile = serde_json::from_slice(&bytes).map_err(|e| {
        BackendError::with_source(
            BackendErrorKind::InvalidData,
            format!("failed to parse record file {}", path.display()),
            e,
        )
    })?;

    if file.version != RECORD_FILE_VERSION {
        return Err(BackendError::new(
            BackendErrorKind::InvalidData,
            format!(
                "unsupported record file version {} in {}",
                file.version,
                path.display()
            ),
        ));
    }

    let value = base64::Engine::decode(&base64::engine::general_purpose::STANDARD, &file.value)
        .map_err(|e| {
            BackendError::with_source(
                BackendErrorKind::InvalidData,
                format!("invalid value base64 in {}", path.display()),
                e,
            )
        })?;

    Ok(StoredRecord {
        id: file.id,
        value,
        tags: file.tags,
    })
}

fn not_found_or_io(err: std::io::Error, record_type: &str, id: &str) -> BackendError {
    if err.kind() == ErrorKind::NotFound {
        BackendError::not_found(format!("{record_type}/{id}"))
    } else {
        BackendError::io(err)
    }
}

#[async_trait]
impl StorageBackend for FileBackend {
    async fn add_record(
        &self,
        record_type: &str,
        id: &str,
        value: &[u8],
        tags: &TagMap,
    ) -> BackendResult<()> {
        let tmp_path = self.write_temp(record_type, id, value, tags).await?;
        let path = self.record_path(record_type, id);

        let linked = tokio::fs::hard_link(&tmp_path, &path).await;
        // The temp file is garbage whether or not the link succeeded.
        let _ = tokio::fs::remove_file(&tmp_path).await;

        match linked {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(BackendError::already_exists(
                format!("{record_type}/{id}"),
            )),
            Err(e) => Err(BackendError::io(e)),
        }
    }

    async fn update_record(
        &self,
        record_type: &str,
        id: &str,
        value: &[u8],
        tags: &TagMap,
    ) -> BackendResult<()> {
        let path = self.record_path(record_type, id);
        if !tokio::fs::try_exists(&path).await? {
            return Err(BackendError::not_found(format!("{record_type}/{id}")));
        }

        let tmp_path = self.write_temp(record_type, id, value, tags).await?;
        if let Err(e) = tokio::fs::rename(&tmp_path, &path).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(BackendError::io(e));
        }
        Ok(())
    }

    async fn delete_record(&self, record_type: &str, id: &str) -> BackendResult<()> {
        tokio::fs::remove_file(self.record_path(record_type, id))
            .await
            .map_err(|e| not_found_or_io(e, record_type, id))
    }

    async fn get_record(&self, record_type: &str, id: &str) -> BackendResult<StoredRecord> {
        let path = self.record_path(record_type, id);
        match read_record_file(&path).await {
            Err(e) if e.kind() == BackendErrorKind::ItemNotFound => {
                Err(BackendError::not_found(format!("{record_type}/{id}")))
            }
            other => other,
        }
    }

    async fn find_records(
        &self,
        record_type: &str,
        query: &TagMap,
    ) -> BackendResult<Vec<StoredRecord>> {
        let dir = self.type_dir(record_type);
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(BackendError::io(e)),
        };

        let mut found = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }

            let record = match read_record_file(&path).await {
                Ok(record) => record,
                // Deleted between listing and reading.
                Err(e) if e.kind() == BackendErrorKind::ItemNotFound => continue,
                Err(e) => return Err(e),
            };

            if matches_query(&record.tags, query) {
                found.push(record);
            }
        }

        Ok(found)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
