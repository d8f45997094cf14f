mod file;
mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;

use crate::registry::Registry;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("backend error: {0}")]
    Backend(String),
}

/// Persistence boundary for the registry. Implementations move the whole
/// registry as one snapshot; there are no incremental writes.
#[async_trait]
pub trait RegistryStore: Send + Sync + 'static {
    /// None when nothing has ever been saved.
    async fn load(&self) -> Result<Option<Registry>, StoreError>;

    async fn save(&self, registry: &Registry) -> Result<(), StoreError>;
}
