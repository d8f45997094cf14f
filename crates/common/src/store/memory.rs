use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::{RegistryStore, StoreError};
use crate::registry::Registry;

/// In-memory store. Save serializes and load re-deserializes, so tests
/// exercise the same serde path the file store does.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Option<serde_json::Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RegistryStore for MemoryStore {
    async fn load(&self) -> Result<Option<Registry>, StoreError> {
        let inner = self.inner.read();
        match inner.as_ref() {
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
            None => Ok(None),
        }
    }

    async fn save(&self, registry: &Registry) -> Result<(), StoreError> {
        let value = serde_json::to_value(registry)?;
        *self.inner.write() = Some(value);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::bucket::BucketKind;

    #[tokio::test]
    async fn test_load_before_save_is_none() {
        let store = MemoryStore::new();
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_then_load_round_trips() {
        let store = MemoryStore::new();
        let mut registry = Registry::new();
        registry.create("vpn", BucketKind::MullvadCodes);

        store.save(&registry).await.unwrap();
        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded, registry);
    }

    #[tokio::test]
    async fn test_save_replaces_wholesale() {
        let store = MemoryStore::new();
        let mut first = Registry::new();
        first.create("vpn", BucketKind::MullvadCodes);
        store.save(&first).await.unwrap();

        let mut second = Registry::new();
        second.create("swag", BucketKind::Generic);
        store.save(&second).await.unwrap();

        let loaded = store.load().await.unwrap().unwrap();
        assert!(!loaded.exists("vpn"));
        assert!(loaded.exists("swag"));
    }
}
