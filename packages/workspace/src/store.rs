//! # Block Stores
//!
//! The load/save collaborator: a mapping from document id to its ordered
//! block sequence. `persist_blocks` replaces the whole sequence, assigning
//! ids to blocks that arrive without one, and returns what was stored.

use crate::errors::{StoreError, StoreResult};
use async_trait::async_trait;
use courseweave_model::{sort_blocks, Block, IdGenerator};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

#[async_trait]
pub trait BlockStore: Send + Sync {
    async fn fetch_blocks(&self, doc_id: &str) -> StoreResult<Vec<Block>>;

    async fn persist_blocks(&self, doc_id: &str, blocks: Vec<Block>) -> StoreResult<Vec<Block>>;
}

/// Give every unsaved block an id, never reusing one already issued
fn assign_ids(doc_id: &str, previous: &[Block], mut blocks: Vec<Block>) -> Vec<Block> {
    let mut ids = IdGenerator::resume(
        doc_id,
        previous.iter().chain(blocks.iter()).map(|block| block.id.as_str()),
    );

    let mut seen = HashSet::new();
    for block in &mut blocks {
        if block.is_unsaved() || !seen.insert(block.id.clone()) {
            block.id = ids.new_id();
            seen.insert(block.id.clone());
        }
    }

    sort_blocks(&mut blocks);
    blocks
}

/// In-process store, also used as a test double
#[derive(Default)]
pub struct MemoryBlockStore {
    documents: RwLock<HashMap<String, Vec<Block>>>,
    denied: RwLock<HashSet<String>>,
    write_delay: RwLock<Option<Duration>>,
    writes: AtomicUsize,
}

impl MemoryBlockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, doc_id: impl Into<String>, blocks: Vec<Block>) {
        self.documents.write().await.insert(doc_id.into(), blocks);
    }

    /// Reject every further access to `doc_id`
    pub async fn deny(&self, doc_id: impl Into<String>) {
        self.denied.write().await.insert(doc_id.into());
    }

    /// Hold each write for `delay` before storing it
    pub async fn set_write_delay(&self, delay: Duration) {
        *self.write_delay.write().await = Some(delay);
    }

    /// Number of completed `persist_blocks` calls
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub async fn snapshot(&self, doc_id: &str) -> Option<Vec<Block>> {
        self.documents.read().await.get(doc_id).cloned()
    }

    async fn check_access(&self, doc_id: &str) -> StoreResult<()> {
        if self.denied.read().await.contains(doc_id) {
            return Err(StoreError::AccessDenied(doc_id.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl BlockStore for MemoryBlockStore {
    async fn fetch_blocks(&self, doc_id: &str) -> StoreResult<Vec<Block>> {
        self.check_access(doc_id).await?;
        self.documents
            .read()
            .await
            .get(doc_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(doc_id.to_string()))
    }

    async fn persist_blocks(&self, doc_id: &str, blocks: Vec<Block>) -> StoreResult<Vec<Block>> {
        self.check_access(doc_id).await?;

        let delay = *self.write_delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut documents = self.documents.write().await;
        let previous = documents.get(doc_id).map(Vec::as_slice).unwrap_or_default();
        let stored = assign_ids(doc_id, previous, blocks);
        documents.insert(doc_id.to_string(), stored.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);

        debug!(doc_id, blocks = stored.len(), "Stored blocks in memory");
        Ok(stored)
    }
}

/// One pretty-printed JSON array per document under `root`
pub struct FileBlockStore {
    root: PathBuf,
}

impl FileBlockStore {
    pub const EXTENSION: &'static str = "blocks.json";

    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File backing `doc_id`. Ids that could escape the root are refused.
    pub fn document_path(&self, doc_id: &str) -> StoreResult<PathBuf> {
        let valid = !doc_id.is_empty()
            && !doc_id.starts_with('.')
            && doc_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !valid {
            return Err(StoreError::AccessDenied(doc_id.to_string()));
        }
        Ok(self.root.join(format!("{}.{}", doc_id, Self::EXTENSION)))
    }

    async fn read(&self, path: &Path, doc_id: &str) -> StoreResult<Option<Vec<Block>>> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(err) => match err.kind() {
                std::io::ErrorKind::NotFound => Ok(None),
                std::io::ErrorKind::PermissionDenied => Err(StoreError::AccessDenied(doc_id.to_string())),
                _ => Err(err.into()),
            },
        }
    }
}

#[async_trait]
impl BlockStore for FileBlockStore {
    async fn fetch_blocks(&self, doc_id: &str) -> StoreResult<Vec<Block>> {
        let path = self.document_path(doc_id)?;
        let mut blocks = self
            .read(&path, doc_id)
            .await?
            .ok_or_else(|| StoreError::NotFound(doc_id.to_string()))?;
        sort_blocks(&mut blocks);
        Ok(blocks)
    }

    async fn persist_blocks(&self, doc_id: &str, blocks: Vec<Block>) -> StoreResult<Vec<Block>> {
        let path = self.document_path(doc_id)?;
        let previous = self.read(&path, doc_id).await?.unwrap_or_default();
        let stored = assign_ids(doc_id, &previous, blocks);

        tokio::fs::create_dir_all(&self.root).await?;
        let temp = self.root.join(format!(".{}.{}.tmp", doc_id, Self::EXTENSION));
        tokio::fs::write(&temp, serde_json::to_vec_pretty(&stored)?).await?;
        tokio::fs::rename(&temp, &path).await?;

        debug!(doc_id, path = %path.display(), blocks = stored.len(), "Wrote blocks file");
        Ok(stored)
    }
}
