use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use termlist_core::partition::json::JsonPartitionReader;
use termlist_core::partition::{PartitionReader, TERMS_FILE};

pub type SharedPartition = Arc<dyn PartitionReader + Send + Sync>;

/// Откуда брокер берёт партиции по их id.
#[async_trait]
pub trait PartitionStore: Send + Sync {
    async fn open(&self, partition: &str) -> Result<SharedPartition>;
}

/// Партиции: каталоги с `terms.json` на локальном диске.
#[derive(Debug, Clone, Default)]
pub struct FsPartitionStore {
    pub root: Option<PathBuf>,
}

impl FsPartitionStore {
    pub fn new(root: Option<PathBuf>) -> Self {
        Self { root }
    }

    /// С root принимаются только относительные id без `..`.
    fn resolve(&self, partition: &str) -> Result<PathBuf> {
        let Some(root) = &self.root else {
            return Ok(PathBuf::from(partition));
        };
        let escapes = Path::new(partition)
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            anyhow::bail!("partition {partition} is outside of {}", root.display());
        }
        Ok(root.join(partition))
    }
}

#[async_trait]
impl PartitionStore for FsPartitionStore {
    async fn open(&self, partition: &str) -> Result<SharedPartition> {
        let path = self.resolve(partition)?.join(TERMS_FILE);
        let data = tokio::fs::read(&path).await?;
        // id партиции: как прислал клиент, без root
        let reader = JsonPartitionReader::from_bytes(partition, &data)?;
        Ok(Arc::new(reader))
    }
}

/// Готовые партиции в памяти (тесты, встраивание).
#[derive(Default, Clone)]
pub struct MemoryPartitionStore {
    parts: HashMap<String, SharedPartition>,
}

impl MemoryPartitionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, part: SharedPartition) {
        self.parts.insert(id.into(), part);
    }
}

#[async_trait]
impl PartitionStore for MemoryPartitionStore {
    async fn open(&self, partition: &str) -> Result<SharedPartition> {
        self.parts
            .get(partition)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("partition {partition} not found"))
    }
}
