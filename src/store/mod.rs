//! Filesystem document store
//!
//! Each collection is a plain directory of pretty-printed JSON files. There
//! is no index: every listing re-reads the directory, so documents added or
//! removed out-of-band are picked up immediately.

mod collection;
mod document;
mod error;
mod summary;

pub use collection::Collection;
pub use document::{effective_run_id, normalize_payload};
pub use error::StoreError;
pub use summary::ResultSummary;

use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::logger;
use document::{base_name, compose_file_name, is_document_name};
use error::StoreResult;

/// Document store backed by two directories
#[derive(Debug, Clone)]
pub struct DocumentStore {
    raw_dir: PathBuf,
    parsed_dir: PathBuf,
}

impl DocumentStore {
    pub const fn new(raw_dir: PathBuf, parsed_dir: PathBuf) -> Self {
        Self {
            raw_dir,
            parsed_dir,
        }
    }

    pub fn dir(&self, collection: Collection) -> &Path {
        match collection {
            Collection::Raw => &self.raw_dir,
            Collection::Standardized => &self.parsed_dir,
        }
    }

    /// Create both collection directories. Safe to call repeatedly.
    pub async fn ensure_dirs(&self) -> StoreResult<()> {
        for collection in Collection::ALL {
            let dir = self.dir(collection);
            fs::create_dir_all(dir)
                .await
                .map_err(|e| StoreError::io(dir, e))?;
        }
        Ok(())
    }

    /// Persist `value` as `<benchmark>-<run_id>.json`, replacing any existing
    /// document of that name. Returns the file name used.
    ///
    /// The document is written to a temporary sibling and renamed into place,
    /// so concurrent readers see either the old or the new content.
    pub async fn save(
        &self,
        collection: Collection,
        benchmark_name: &str,
        run_id: &str,
        value: &Value,
    ) -> StoreResult<String> {
        let file_name = compose_file_name(benchmark_name, run_id);
        let dir = self.dir(collection);
        let target = dir.join(&file_name);
        // fixed-length name so any valid target name can be staged
        let tmp = dir.join(format!(".{}.tmp", uuid::Uuid::new_v4().simple()));

        let mut content = serde_json::to_vec_pretty(value).map_err(StoreError::Serialize)?;
        content.push(b'\n');

        if let Err(e) = fs::write(&tmp, &content).await {
            return Err(StoreError::io(tmp, e));
        }
        if let Err(e) = fs::rename(&tmp, &target).await {
            // best effort: don't leave the temp file behind
            let _ = fs::remove_file(&tmp).await;
            return Err(StoreError::io(target, e));
        }

        logger::log_debug(&format!(
            "[STORE] Saved {collection} document {file_name} ({} bytes)",
            content.len()
        ));
        Ok(file_name)
    }

    /// Sorted names of every `.json` file in the collection
    pub async fn list(&self, collection: Collection) -> StoreResult<Vec<String>> {
        let dir = self.dir(collection);
        let mut entries = fs::read_dir(dir)
            .await
            .map_err(|e| StoreError::io(dir, e))?;

        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::io(dir, e))?
        {
            match entry.file_name().into_string() {
                Ok(name) if is_document_name(&name) => names.push(name),
                Ok(_) => {}
                Err(raw) => logger::log_warning(&format!(
                    "[STORE] Ignoring non UTF-8 file name in {}: {}",
                    dir.display(),
                    raw.to_string_lossy()
                )),
            }
        }

        names.sort();
        Ok(names)
    }

    /// Load one document by file name.
    ///
    /// The name is reduced to its base name first, so the lookup never leaves
    /// the collection directory. Returns the sanitized name with the content.
    pub async fn load(&self, collection: Collection, file_name: &str) -> StoreResult<(String, Value)> {
        let name = base_name(file_name);
        if name.is_empty() || name == "." || name == ".." {
            return Err(StoreError::NotFound(name.to_string()));
        }

        let path = self.dir(collection).join(name);
        match fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => return Err(StoreError::NotFound(name.to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(name.to_string()));
            }
            Err(e) => return Err(StoreError::io(path, e)),
        }

        let value = read_document(&path, name).await?;
        Ok((name.to_string(), value))
    }

    /// Summaries of every standardized document.
    ///
    /// Unreadable or malformed files are logged and skipped. A directory that
    /// cannot be listed is logged and yields an empty list.
    pub async fn summaries(&self) -> Vec<ResultSummary> {
        let names = match self.list(Collection::Standardized).await {
            Ok(names) => names,
            Err(e) => {
                logger::log_error(&format!("Error reading results directory: {e}"));
                return Vec::new();
            }
        };

        let dir = self.dir(Collection::Standardized);
        let mut results = Vec::with_capacity(names.len());
        for name in names {
            let entry = match read_document(&dir.join(&name), &name).await {
                Ok(doc) => ResultSummary::from_document(&name, &doc),
                Err(e) => Err(e),
            };
            match entry {
                Ok(entry) => results.push(entry),
                Err(e) => logger::log_error(&format!("Error processing file {name}: {e}")),
            }
        }
        results
    }
}

async fn read_document(path: &Path, file_name: &str) -> StoreResult<Value> {
    let bytes = fs::read(path).await.map_err(|e| StoreError::io(path, e))?;
    serde_json::from_slice(&bytes).map_err(|source| StoreError::MalformedDocument {
        file_name: file_name.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    async fn test_store() -> (TempDir, DocumentStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::new(
            dir.path().join("public/results/model-results"),
            dir.path().join("public/results/parsed"),
        );
        store.ensure_dirs().await.unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_ensure_dirs_is_idempotent() {
        let (_dir, store) = test_store().await;
        store.ensure_dirs().await.unwrap();
        assert!(store.dir(Collection::Raw).is_dir());
        assert!(store.dir(Collection::Standardized).is_dir());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let (_dir, store) = test_store().await;
        let data = json!({"accuracy": 0.91, "label": "déjà vu"});

        let name = store.save(Collection::Raw, "mmlu", "r1", &data).await.unwrap();
        assert_eq!(name, "mmlu-r1.json");

        let (loaded_name, loaded) = store.load(Collection::Raw, &name).await.unwrap();
        assert_eq!(loaded_name, "mmlu-r1.json");
        assert_eq!(loaded, data);

        // pretty-printed, non-ASCII kept verbatim
        let text = std::fs::read_to_string(store.dir(Collection::Raw).join(&name)).unwrap();
        assert!(text.contains("\n  \"accuracy\""));
        assert!(text.contains("déjà vu"));
    }

    #[tokio::test]
    async fn test_save_overwrites() {
        let (_dir, store) = test_store().await;
        store.save(Collection::Raw, "b", "r", &json!({"v": 1})).await.unwrap();
        store.save(Collection::Raw, "b", "r", &json!([2])).await.unwrap();

        let (_, loaded) = store.load(Collection::Raw, "b-r.json").await.unwrap();
        assert_eq!(loaded, json!([2]));
        assert_eq!(store.list(Collection::Raw).await.unwrap(), vec!["b-r.json"]);
    }

    #[tokio::test]
    async fn test_save_long_file_name() {
        let (_dir, store) = test_store().await;
        let bench = "b".repeat(230);
        let name = store.save(Collection::Raw, &bench, "r", &json!({"ok": true})).await.unwrap();
        assert_eq!(name.len(), 237);

        let (_, loaded) = store.load(Collection::Raw, &name).await.unwrap();
        assert_eq!(loaded, json!({"ok": true}));
        // no staging file left behind
        let entries = std::fs::read_dir(store.dir(Collection::Raw)).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[tokio::test]
    async fn test_collections_are_independent() {
        let (_dir, store) = test_store().await;
        store.save(Collection::Raw, "b", "r", &json!("raw")).await.unwrap();
        store
            .save(Collection::Standardized, "b", "r", &json!("parsed"))
            .await
            .unwrap();

        let (_, raw) = store.load(Collection::Raw, "b-r.json").await.unwrap();
        let (_, parsed) = store.load(Collection::Standardized, "b-r.json").await.unwrap();
        assert_eq!(raw, json!("raw"));
        assert_eq!(parsed, json!("parsed"));
    }

    #[tokio::test]
    async fn test_list_sorted_json_only() {
        let (_dir, store) = test_store().await;
        for bench in ["zeta", "alpha", "Mid"] {
            store.save(Collection::Raw, bench, "1", &json!({})).await.unwrap();
        }
        let dir = store.dir(Collection::Raw);
        std::fs::write(dir.join("notes.txt"), "x").unwrap();
        std::fs::write(dir.join(".0f3a9c.tmp"), "{").unwrap();

        let names = store.list(Collection::Raw).await.unwrap();
        assert_eq!(names, vec!["Mid-1.json", "alpha-1.json", "zeta-1.json"]);
        assert!(store.list(Collection::Standardized).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_missing_directory_is_error() {
        let store = DocumentStore::new(
            PathBuf::from("/nonexistent/eval-store/raw"),
            PathBuf::from("/nonexistent/eval-store/parsed"),
        );
        assert!(matches!(
            store.list(Collection::Raw).await,
            Err(StoreError::Io { .. })
        ));
    }

    #[tokio::test]
    async fn test_load_missing_is_not_found() {
        let (_dir, store) = test_store().await;
        let err = store.load(Collection::Raw, "does-not-exist.json").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));

        let err = store.load(Collection::Raw, "..").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_load_strips_traversal() {
        let (dir, store) = test_store().await;
        // a file outside the collection must stay unreachable
        std::fs::write(dir.path().join("public/results/secret.json"), "{\"leak\":true}").unwrap();
        let err = store.load(Collection::Raw, "../secret.json").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(name) if name == "secret.json"));

        std::fs::write(store.dir(Collection::Raw).join("secret.json"), "{\"ok\":1}").unwrap();
        let (name, value) = store.load(Collection::Raw, "../secret.json").await.unwrap();
        assert_eq!(name, "secret.json");
        assert_eq!(value, json!({"ok": 1}));
    }

    #[tokio::test]
    async fn test_load_malformed() {
        let (_dir, store) = test_store().await;
        std::fs::write(store.dir(Collection::Raw).join("broken.json"), "{not json").unwrap();
        let err = store.load(Collection::Raw, "broken.json").await.unwrap_err();
        assert!(matches!(err, StoreError::MalformedDocument { .. }));
    }

    #[tokio::test]
    async fn test_summaries_skip_bad_files() {
        let (_dir, store) = test_store().await;
        let doc = json!({
            "meta": {
                "timestamp": "T",
                "benchmark_name": "bn",
                "run_id": "r1",
                "model": {"id": "m1", "source": "s1", "tokenizer_id": "tk1"}
            }
        });
        store.save(Collection::Standardized, "bn", "r1", &doc).await.unwrap();
        std::fs::write(store.dir(Collection::Standardized).join("aaa-broken.json"), "{").unwrap();

        let results = store.summaries().await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].pk, "T-bn-r1");
        assert_eq!(results[0].file_name, "bn-r1.json");
    }

    #[tokio::test]
    async fn test_summaries_follow_listing_order() {
        let (_dir, store) = test_store().await;
        store.save(Collection::Standardized, "b", "2", &json!({})).await.unwrap();
        store.save(Collection::Standardized, "a", "1", &json!({})).await.unwrap();

        let pks: Vec<_> = store.summaries().await.into_iter().map(|s| s.pk).collect();
        assert_eq!(pks, vec!["unknown-a-1", "unknown-b-2"]);
    }

    #[tokio::test]
    async fn test_summaries_missing_directory_is_empty() {
        let store = DocumentStore::new(
            PathBuf::from("/nonexistent/eval-store/raw"),
            PathBuf::from("/nonexistent/eval-store/parsed"),
        );
        assert!(store.summaries().await.is_empty());
    }
}
