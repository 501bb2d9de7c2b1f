//! Open documents: one `EditSession` per document id, saved through the
//! shared coordinator.

use crate::assets::{resolve_assets, AssetReport, AssetResolver};
use crate::autosave::Autosave;
use crate::config::WorkspaceConfig;
use crate::coordinator::{SaveCoordinator, WriteOutcome};
use crate::errors::{SessionError, StoreResult};
use crate::store::BlockStore;
use courseweave_editor::{Document, EditSession, Mutation, MutationResult, SaveOutcome};
use courseweave_sync::{Extent, Registry, UnmappedNode};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard, RwLock};
use tracing::{error, info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    /// Blocks were persisted and the session adopted them
    Written,

    /// Tree matched the last-known blocks; nothing was written
    Unchanged,

    /// A newer save was written first; this snapshot was dropped
    Superseded,

    /// Persisted, but a newer save had already completed in the session
    Stale,
}

#[derive(Debug, Clone)]
pub struct SaveReport {
    pub generation: u64,
    pub status: SaveStatus,

    /// Nodes left out of this save
    pub unmapped: Vec<UnmappedNode>,
    pub deleted: Vec<String>,
}

pub struct DocumentSession<S> {
    doc_id: String,
    session: Arc<Mutex<EditSession>>,
    coordinator: Arc<SaveCoordinator<S>>,
}

impl<S: BlockStore> DocumentSession<S> {
    /// Fetch the document's blocks and build its tree
    #[instrument(skip(coordinator, registry))]
    pub async fn open(
        coordinator: Arc<SaveCoordinator<S>>,
        registry: Arc<Registry>,
        doc_id: &str,
    ) -> Result<Self, SessionError> {
        let blocks = coordinator.store().fetch_blocks(doc_id).await?;
        let document = Document::load(doc_id, registry, blocks);
        info!(blocks = document.last_known().len(), "Opened document");

        coordinator.reset(doc_id).await;

        Ok(Self {
            doc_id: doc_id.to_string(),
            session: Arc::new(Mutex::new(EditSession::new(doc_id, document))),
            coordinator,
        })
    }

    pub fn doc_id(&self) -> &str {
        &self.doc_id
    }

    /// Direct access to the edit session; do not hold across a save
    pub async fn lock(&self) -> MutexGuard<'_, EditSession> {
        self.session.lock().await
    }

    pub async fn apply(&self, mutation: Mutation) -> Result<MutationResult, SessionError> {
        Ok(self.session.lock().await.apply(mutation)?)
    }

    pub async fn has_unsaved_changes(&self) -> bool {
        self.session.lock().await.has_unsaved_changes()
    }

    pub async fn extent(&self) -> Extent {
        self.session.lock().await.document.extent()
    }

    pub async fn resolve_assets<R: AssetResolver + ?Sized>(&self, resolver: &R) -> StoreResult<AssetReport> {
        let tree = self.session.lock().await.document.tree().clone();
        resolve_assets(resolver, &tree).await
    }

    /// Snapshot, persist through the coordinator, then settle the session.
    /// The session lock is released while the store works, so editing
    /// continues during the write.
    #[instrument(skip(self), fields(doc_id = %self.doc_id))]
    pub async fn save(&self) -> Result<SaveReport, SessionError> {
        let ticket = self.session.lock().await.begin_save();
        let generation = ticket.generation;

        if !ticket.sync.unmapped.is_empty() {
            warn!(
                generation,
                unmapped = ticket.sync.unmapped.len(),
                "Saving without nodes that have no block mapping"
            );
        }

        let written = self.coordinator.write(&self.doc_id, &ticket).await;
        let mut session = self.session.lock().await;

        let status = match written {
            Err(err) => {
                error!(generation, %err, "Save failed");
                session.fail_save(generation);
                return Err(err.into());
            }
            Ok(WriteOutcome::Superseded) => {
                session.discard_save(generation);
                SaveStatus::Superseded
            }
            Ok(WriteOutcome::Unchanged) => {
                session.complete_save(generation, ticket.sync.blocks.clone())?;
                SaveStatus::Unchanged
            }
            Ok(WriteOutcome::Written(stored)) => match session.complete_save(generation, stored)? {
                SaveOutcome::Applied => SaveStatus::Written,
                SaveOutcome::Stale => SaveStatus::Stale,
            },
        };

        Ok(SaveReport {
            generation,
            status,
            unmapped: ticket.sync.unmapped,
            deleted: ticket.sync.deleted,
        })
    }
}

/// Open documents by id. One session owns a document at a time.
pub struct SessionManager<S> {
    coordinator: Arc<SaveCoordinator<S>>,
    registry: Arc<Registry>,
    config: WorkspaceConfig,
    sessions: RwLock<HashMap<String, Arc<Autosave<S>>>>,
}

impl<S: BlockStore + 'static> SessionManager<S> {
    pub fn new(store: Arc<S>, registry: Arc<Registry>, config: WorkspaceConfig) -> Self {
        Self {
            coordinator: Arc::new(SaveCoordinator::new(store)),
            registry,
            config,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    /// Get the open session for `doc_id`, loading it on first use
    pub async fn open(&self, doc_id: &str) -> Result<Arc<Autosave<S>>, SessionError> {
        {
            let sessions = self.sessions.read().await;
            if let Some(session) = sessions.get(doc_id) {
                return Ok(session.clone());
            }
        }

        let mut sessions = self.sessions.write().await;

        // Double-check (another task may have opened it)
        if let Some(session) = sessions.get(doc_id) {
            return Ok(session.clone());
        }

        let document = DocumentSession::open(self.coordinator.clone(), self.registry.clone(), doc_id).await?;
        let session = Arc::new(Autosave::new(Arc::new(document), self.config.autosave_delay));
        sessions.insert(doc_id.to_string(), session.clone());
        Ok(session)
    }

    pub async fn get(&self, doc_id: &str) -> Option<Arc<Autosave<S>>> {
        self.sessions.read().await.get(doc_id).cloned()
    }

    pub async fn open_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Navigate away: flush any pending save, then release the document
    pub async fn close(&self, doc_id: &str) -> Result<Option<SaveReport>, SessionError> {
        let session = self.sessions.write().await.remove(doc_id);
        match session {
            Some(session) => session.close().await,
            None => Ok(None),
        }
    }

    /// Release the document without saving. True when edits were dropped.
    pub async fn discard(&self, doc_id: &str) -> bool {
        let session = self.sessions.write().await.remove(doc_id);
        match session {
            Some(session) => {
                let pending = session.discard().await;
                pending || session.session().has_unsaved_changes().await
            }
            None => false,
        }
    }
}
