use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::NamedTempFile;

use super::{RegistryStore, StoreError};
use crate::registry::Registry;

/// One JSON document at a fixed path. Saves write a tempfile next to the
/// target and rename it into place, so a crash mid-write can never leave a
/// torn registry behind.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parent(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

#[async_trait]
impl RegistryStore for JsonFileStore {
    async fn load(&self) -> Result<Option<Registry>, StoreError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    async fn save(&self, registry: &Registry) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(registry)?;
        let parent = self.parent();
        std::fs::create_dir_all(&parent)?;
        let mut tmp = NamedTempFile::new_in(&parent)?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|err| StoreError::Io(err.error))?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::bucket::BucketKind;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_load_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("registry.json"));
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("registry.json"));

        let mut registry = Registry::new();
        registry.create("vpn", BucketKind::MullvadCodes);
        registry.create("swag", BucketKind::Generic);

        store.save(&registry).await.unwrap();
        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded, registry);
    }

    #[tokio::test]
    async fn test_save_replaces_previous_snapshot() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("registry.json"));

        let mut first = Registry::new();
        first.create("vpn", BucketKind::MullvadCodes);
        store.save(&first).await.unwrap();

        let second = Registry::new();
        store.save(&second).await.unwrap();

        let loaded = store.load().await.unwrap().unwrap();
        assert!(loaded.is_empty());
    }

    #[tokio::test]
    async fn test_save_creates_missing_directories() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested/deeper/registry.json"));
        store.save(&Registry::new()).await.unwrap();
        assert!(store.path().exists());
    }

    #[tokio::test]
    async fn test_on_disk_format_is_json() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("registry.json"));

        let mut registry = Registry::new();
        registry.create("vpn", BucketKind::MullvadCodes);
        store.save(&registry).await.unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(value["buckets"]["vpn"].is_object());
    }
}
