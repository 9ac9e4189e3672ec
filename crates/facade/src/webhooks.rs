//! Append-only storage of inbound gateway callbacks.
//!
//! Each callback body is written once, unmodified, to its own file:
//!
//! ```text
//! {dir}/
//!   {YYYYmmdd_HHMMSS}_{8 hex}_{kind}.json
//! ```
//!
//! Writes go to a hidden `.tmp` file first and are renamed into place, so a
//! concurrent listing never sees a half-written record. The random component
//! keeps two callbacks arriving in the same second apart.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use async_trait::async_trait;
use chrono::Utc;
use paygate_core::WebhookKind;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tokio::fs;
use tracing::{debug, warn};

/// Number of records `GET /api/webhooks` returns.
pub const DEFAULT_LIST_LIMIT: usize = 20;

const RECORD_EXTENSION: &str = "json";

/// Errors from the webhook store. Never surfaced to the gateway.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("webhook storage I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PersistenceError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// A stored callback as returned by the listing endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebhookRecord {
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<WebhookKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    /// Parsed body, when it is valid JSON.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
    /// Why the record could not be read or parsed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Durable store for webhook bodies with list-by-recency.
#[async_trait]
pub trait WebhookStore: Send + Sync {
    /// Persist a callback body. Returns the record identifier.
    async fn record(&self, kind: WebhookKind, body: &[u8]) -> Result<String, PersistenceError>;

    /// Most recently written records first, at most `limit` of them.
    async fn list_recent(&self, limit: usize) -> Result<Vec<WebhookRecord>, PersistenceError>;
}

/// Webhook store backed by a directory of JSON files.
#[derive(Debug, Clone)]
pub struct FilesystemWebhookStore {
    dir: PathBuf,
}

impl FilesystemWebhookStore {
    /// Create a store rooted at `dir`. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory records are written to.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Build a record filename: `{timestamp}_{random}_{kind}.json`.
fn record_filename(kind: WebhookKind) -> String {
    format!(
        "{}_{:08x}_{kind}.{RECORD_EXTENSION}",
        Utc::now().format("%Y%m%d_%H%M%S"),
        rand::random::<u32>()
    )
}

/// Recover the kind from a record filename.
fn kind_from_filename(filename: &str) -> Option<WebhookKind> {
    filename
        .strip_suffix(".json")?
        .rsplit('_')
        .next()?
        .parse()
        .ok()
}

async fn read_record(path: &Path, filename: String) -> WebhookRecord {
    let kind = kind_from_filename(&filename);
    match fs::read(path).await {
        Ok(bytes) => {
            let raw = String::from_utf8_lossy(&bytes).into_owned();
            let (content, error) = match serde_json::from_str::<Value>(&raw) {
                Ok(value) => (Some(value), None),
                Err(e) => (None, Some(e.to_string())),
            };
            WebhookRecord {
                filename,
                kind,
                raw: Some(raw),
                content,
                error,
            }
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read webhook record");
            WebhookRecord {
                filename,
                kind,
                raw: None,
                content: None,
                error: Some(e.to_string()),
            }
        }
    }
}

#[async_trait]
impl WebhookStore for FilesystemWebhookStore {
    async fn record(&self, kind: WebhookKind, body: &[u8]) -> Result<String, PersistenceError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| PersistenceError::io(&self.dir, e))?;

        let filename = record_filename(kind);
        let path = self.dir.join(&filename);

        // Write atomically using temp file + rename
        let temp_path = self.dir.join(format!(".{filename}.tmp"));
        fs::write(&temp_path, body)
            .await
            .map_err(|e| PersistenceError::io(&temp_path, e))?;
        if let Err(e) = fs::rename(&temp_path, &path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(PersistenceError::io(&path, e));
        }

        debug!(filename = %filename, kind = %kind, size = body.len(), "Stored webhook");
        Ok(filename)
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<WebhookRecord>, PersistenceError> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(PersistenceError::io(&self.dir, e)),
        };

        let mut candidates: Vec<(SystemTime, String, PathBuf)> = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| PersistenceError::io(&self.dir, e))?
        {
            let path = entry.path();
            if path.extension().is_none_or(|ext| ext != RECORD_EXTENSION) {
                continue;
            }
            let Ok(metadata) = entry.metadata().await else {
                continue;
            };
            if !metadata.is_file() {
                continue;
            }
            let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            let filename = entry.file_name().to_string_lossy().into_owned();
            candidates.push((modified, filename, path));
        }

        // Newest first; filenames start with the timestamp, so they break ties
        candidates.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| b.1.cmp(&a.1)));
        candidates.truncate(limit);

        let mut records = Vec::with_capacity(candidates.len());
        for (_, filename, path) in candidates {
            records.push(read_record(&path, filename).await);
        }
        Ok(records)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::time::Duration;

    use tempfile::TempDir;

    use super::*;

    fn store_in(temp: &TempDir) -> FilesystemWebhookStore {
        FilesystemWebhookStore::new(temp.path().join("webhooks"))
    }

    #[test]
    fn test_record_filename_shape() {
        let filename = record_filename(WebhookKind::Refund);
        assert!(filename.ends_with("_refund.json"));
        let parts: Vec<&str> = filename.trim_end_matches(".json").split('_').collect();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts.first().map(|p| p.len()), Some(8));
        assert_eq!(parts.get(1).map(|p| p.len()), Some(6));
        assert_eq!(parts.get(2).map(|p| p.len()), Some(8));
        assert_eq!(kind_from_filename(&filename), Some(WebhookKind::Refund));
    }

    #[tokio::test]
    async fn test_list_on_missing_dir_is_empty() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);
        assert!(store.list_recent(DEFAULT_LIST_LIMIT).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_record_writes_body_unmodified() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);
        let body = br#"{"reference_id":"ord-1","status":"PAID"}"#;

        let filename = store.record(WebhookKind::Callback, body).await.unwrap();

        let written = std::fs::read(store.dir().join(&filename)).unwrap();
        assert_eq!(written, body);
        // No temp files left behind
        let names: Vec<String> = std::fs::read_dir(store.dir())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec![filename]);
    }

    #[tokio::test]
    async fn test_list_is_most_recent_first() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);

        store.record(WebhookKind::Callback, br#"{"n":1}"#).await.unwrap();
        tokio::time::sleep(Duration::from_millis(1100)).await;
        store.record(WebhookKind::Fail, br#"{"n":2}"#).await.unwrap();

        let records = store.list_recent(DEFAULT_LIST_LIMIT).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].content, Some(serde_json::json!({ "n": 2 })));
        assert_eq!(records[0].kind, Some(WebhookKind::Fail));
        assert_eq!(records[1].content, Some(serde_json::json!({ "n": 1 })));
    }

    #[tokio::test]
    async fn test_list_respects_limit() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);
        for n in 0..5 {
            store
                .record(WebhookKind::Callback, format!("{{\"n\":{n}}}").as_bytes())
                .await
                .unwrap();
        }
        assert_eq!(store.list_recent(3).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_unparsable_body_reports_error_per_item() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);
        store.record(WebhookKind::Callback, b"status=PAID&ref=1").await.unwrap();

        let records = store.list_recent(DEFAULT_LIST_LIMIT).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].raw.as_deref(), Some("status=PAID&ref=1"));
        assert!(records[0].content.is_none());
        assert!(records[0].error.is_some());
    }

    #[tokio::test]
    async fn test_non_record_files_are_ignored() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);
        std::fs::create_dir_all(store.dir()).unwrap();
        std::fs::write(store.dir().join("notes.txt"), "hello").unwrap();
        std::fs::write(store.dir().join(".half.json.tmp"), "{").unwrap();

        assert!(store.list_recent(DEFAULT_LIST_LIMIT).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_record_fails_when_dir_cannot_be_created() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();
        let store = FilesystemWebhookStore::new(blocker.join("webhooks"));

        let result = store.record(WebhookKind::Callback, b"{}").await;
        assert!(matches!(result, Err(PersistenceError::Io { .. })));
    }
}
