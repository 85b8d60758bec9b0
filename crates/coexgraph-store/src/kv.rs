//! Key-value storage backends.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use coexgraph_common::error::{CoexError, Result};
use serde_json::Value;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    async fn set(&self, key: &str, value: Value) -> Result<()>;

    /// Keys starting with `prefix`, sorted.
    async fn list(&self, prefix: &str) -> Result<Vec<String>>;

    /// Returns whether the key existed.
    async fn remove(&self, key: &str) -> Result<bool>;
}

// ── Memory ──────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .entries
            .read()
            .await
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        Ok(self.entries.write().await.remove(key).is_some())
    }
}

// ── JSON file ───────────────────────────────────────────────────────────────

/// Whole store in one JSON object on disk. Writes go to a sibling temp file
/// and are renamed into place.
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), lock: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<BTreeMap<String, Value>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) if content.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(content) => serde_json::from_str(&content)
                .map_err(|e| CoexError::Store(format!("{}: {e}", self.path.display()))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_all(&self, entries: &BTreeMap<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, serde_json::to_vec_pretty(entries)?).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!(path = %self.path.display(), entries = entries.len(), "Store written");
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let _guard = self.lock.lock().await;
        Ok(self.read_all().await?.remove(key))
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read_all().await?;
        entries.insert(key.to_string(), value);
        self.write_all(&entries).await
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let _guard = self.lock.lock().await;
        Ok(self
            .read_all()
            .await?
            .into_keys()
            .filter(|k| k.starts_with(prefix))
            .collect())
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read_all().await?;
        let existed = entries.remove(key).is_some();
        if existed {
            self.write_all(&entries).await?;
        }
        Ok(existed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn exercise(store: &dyn KeyValueStore) {
        store.set("a/1", json!({"x": 1})).await.unwrap();
        store.set("a/2", json!(2)).await.unwrap();
        store.set("b/1", json!(3)).await.unwrap();
        assert_eq!(store.get("a/1").await.unwrap(), Some(json!({"x": 1})));
        assert_eq!(store.list("a/").await.unwrap(), vec!["a/1", "a/2"]);
        assert!(store.remove("a/1").await.unwrap());
        assert!(!store.remove("a/1").await.unwrap());
        assert_eq!(store.get("a/1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_store() {
        exercise(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn test_json_file_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("sets.json");
        exercise(&JsonFileStore::new(&path)).await;

        let reopened = JsonFileStore::new(&path);
        assert_eq!(reopened.list("").await.unwrap(), vec!["a/2", "b/1"]);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("none.json"));
        let keys = tokio_test::block_on(store.list("")).unwrap();
        assert!(keys.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_store_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "not json").unwrap();
        let err = JsonFileStore::new(&path).get("k").await.unwrap_err();
        assert!(matches!(err, CoexError::Store(_)));
    }
}
