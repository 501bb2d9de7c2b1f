//! # Save Coordinator
//!
//! Serializes writes per document. Each document gets its own lane: a
//! `tokio::sync::Mutex` holding the highest generation written so far.
//! A ticket older than that is never written, so a slow save cannot land on
//! top of a newer one.

use crate::errors::StoreResult;
use crate::store::BlockStore;
use courseweave_editor::SaveTicket;
use courseweave_model::Block;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub enum WriteOutcome {
    /// Persisted; the store's view of the sequence
    Written(Vec<Block>),

    /// A newer generation was already written
    Superseded,

    /// Nothing differs from the last-known blocks
    Unchanged,
}

#[derive(Debug, Default)]
struct Lane {
    last_written: u64,
}

pub struct SaveCoordinator<S> {
    store: Arc<S>,
    lanes: Mutex<HashMap<String, Arc<Mutex<Lane>>>>,
}

impl<S: BlockStore> SaveCoordinator<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            lanes: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    async fn lane(&self, doc_id: &str) -> Arc<Mutex<Lane>> {
        let mut lanes = self.lanes.lock().await;
        lanes
            .entry(doc_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(Lane::default())))
            .clone()
    }

    /// Drop the generation history of a document, for a fresh session
    pub async fn reset(&self, doc_id: &str) {
        self.lanes.lock().await.remove(doc_id);
    }

    pub async fn write(&self, doc_id: &str, ticket: &SaveTicket) -> StoreResult<WriteOutcome> {
        let lane = self.lane(doc_id).await;
        let mut lane = lane.lock().await;

        if ticket.generation <= lane.last_written {
            debug!(doc_id, generation = ticket.generation, last = lane.last_written, "Skipping superseded save");
            return Ok(WriteOutcome::Superseded);
        }

        let sync = &ticket.sync;
        if !sync.changed && sync.created == 0 && sync.deleted.is_empty() {
            lane.last_written = ticket.generation;
            return Ok(WriteOutcome::Unchanged);
        }

        let stored = self.store.persist_blocks(doc_id, sync.blocks.clone()).await?;
        lane.last_written = ticket.generation;

        info!(
            doc_id,
            generation = ticket.generation,
            blocks = stored.len(),
            created = sync.created,
            deleted = sync.deleted.len(),
            "Saved document"
        );
        Ok(WriteOutcome::Written(stored))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryBlockStore;
    use courseweave_editor::{Document, EditSession, Mutation};
    use courseweave_model::BlockType;
    use courseweave_sync::Registry;
    use serde_json::json;

    fn session() -> EditSession {
        let blocks = vec![Block::new("b1", BlockType::Paragraph, 0, json!({ "text": "Hello" }))];
        EditSession::new("author", Document::load("doc", Arc::new(Registry::standard()), blocks))
    }

    fn edit(session: &mut EditSession, text: &str) {
        session
            .apply(Mutation::UpdateText {
                path: vec![0],
                text: text.into(),
            })
            .unwrap();
    }

    #[tokio::test]
    async fn test_older_ticket_is_superseded() {
        let store = Arc::new(MemoryBlockStore::new());
        let coordinator = SaveCoordinator::new(store.clone());
        let mut session = session();

        edit(&mut session, "one");
        let older = session.begin_save();
        edit(&mut session, "two");
        let newer = session.begin_save();

        assert!(matches!(
            coordinator.write("doc", &newer).await.unwrap(),
            WriteOutcome::Written(_)
        ));
        assert_eq!(
            coordinator.write("doc", &older).await.unwrap(),
            WriteOutcome::Superseded
        );

        let stored = store.snapshot("doc").await.unwrap();
        assert_eq!(stored[0].content, json!({ "text": "two" }));
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn test_unchanged_skips_store() {
        let store = Arc::new(MemoryBlockStore::new());
        let coordinator = SaveCoordinator::new(store.clone());
        let mut session = session();

        let ticket = session.begin_save();
        assert_eq!(
            coordinator.write("doc", &ticket).await.unwrap(),
            WriteOutcome::Unchanged
        );
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_reset_forgets_generations() {
        let store = Arc::new(MemoryBlockStore::new());
        let coordinator = SaveCoordinator::new(store.clone());

        let mut first = session();
        edit(&mut first, "a");
        let ticket = first.begin_save();
        coordinator.write("doc", &ticket).await.unwrap();

        coordinator.reset("doc").await;

        let mut second = session();
        edit(&mut second, "b");
        let ticket = second.begin_save();
        assert!(matches!(
            coordinator.write("doc", &ticket).await.unwrap(),
            WriteOutcome::Written(_)
        ));
    }
}
