//! # Edit Session Management
//!
//! Tracks one user's editing state for a document and sequences its saves.
//!
//! Saves are asynchronous, so several may be in flight at once. Each
//! `begin_save` hands out a generation number; a completion is only applied
//! when no newer generation has completed before it, so an old response can
//! never overwrite the identity bookkeeping of a newer one.

use crate::{Document, EditorError, Mutation, MutationResult};
use chrono::{DateTime, Utc};
use courseweave_model::Block;
use courseweave_sync::SyncResult;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Mutation not yet covered by a completed save
#[derive(Debug, Clone)]
pub struct PendingMutation {
    /// Document version the mutation produced
    pub version: u64,

    pub mutation: Mutation,

    pub timestamp: DateTime<Utc>,
}

/// Snapshot handed to the persistence layer
#[derive(Debug, Clone)]
pub struct SaveTicket {
    pub generation: u64,

    /// Document version the snapshot was taken at
    pub version: u64,

    pub sync: SyncResult,
}

impl SaveTicket {
    pub fn blocks(&self) -> &[Block] {
        &self.sync.blocks
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Applied,

    /// A newer generation completed first; the result was discarded
    Stale,
}

/// Single edit session over one document
pub struct EditSession {
    pub id: String,

    pub document: Document,

    pub pending_mutations: Vec<PendingMutation>,

    next_generation: u64,
    last_completed: u64,
    saved_version: u64,

    /// generation -> document version, for saves still in flight
    in_flight: BTreeMap<u64, u64>,
}

impl EditSession {
    pub fn new(id: impl Into<String>, document: Document) -> Self {
        let saved_version = document.version;
        Self {
            id: id.into(),
            document,
            pending_mutations: Vec::new(),
            next_generation: 1,
            last_completed: 0,
            saved_version,
            in_flight: BTreeMap::new(),
        }
    }

    pub fn apply(&mut self, mutation: Mutation) -> Result<MutationResult, EditorError> {
        let result = self.document.apply(mutation.clone())?;
        self.pending_mutations.push(PendingMutation {
            version: result.version,
            mutation,
            timestamp: Utc::now(),
        });
        Ok(result)
    }

    /// Take a snapshot of the current tree for persisting
    pub fn begin_save(&mut self) -> SaveTicket {
        let generation = self.next_generation;
        self.next_generation += 1;

        let version = self.document.version;
        let sync = self.document.prepare_save();
        self.in_flight.insert(generation, version);

        debug!(session = %self.id, generation, version, changed = sync.changed, "Save started");

        SaveTicket {
            generation,
            version,
            sync,
        }
    }

    /// Apply the store's response for `generation`
    pub fn complete_save(&mut self, generation: u64, persisted: Vec<Block>) -> Result<SaveOutcome, EditorError> {
        let version = self
            .in_flight
            .remove(&generation)
            .ok_or(EditorError::UnknownGeneration(generation))?;

        if generation <= self.last_completed {
            debug!(session = %self.id, generation, last = self.last_completed, "Discarding stale save");
            return Ok(SaveOutcome::Stale);
        }

        self.last_completed = generation;
        self.saved_version = self.saved_version.max(version);
        self.pending_mutations.retain(|pending| pending.version > version);
        self.document.commit_save(persisted);

        Ok(SaveOutcome::Applied)
    }

    /// The save for `generation` failed; the tree is untouched and stays dirty
    pub fn fail_save(&mut self, generation: u64) {
        if self.discard_save(generation) {
            warn!(session = %self.id, generation, "Save failed, changes kept for retry");
        }
    }

    /// Forget a save that was never written because a newer one superseded it
    pub fn discard_save(&mut self, generation: u64) -> bool {
        self.in_flight.remove(&generation).is_some()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.document.version > self.saved_version
    }

    pub fn saves_in_flight(&self) -> usize {
        self.in_flight.len()
    }

    pub fn pending_count(&self) -> usize {
        self.pending_mutations.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courseweave_model::BlockType;
    use courseweave_sync::Registry;
    use serde_json::json;
    use std::sync::Arc;

    fn session() -> EditSession {
        let blocks = vec![Block::new("b1", BlockType::Paragraph, 0, json!({ "text": "Hello" }))];
        let doc = Document::load("lesson-1", Arc::new(Registry::standard()), blocks);
        EditSession::new("author-1", doc)
    }

    fn edit(session: &mut EditSession, text: &str) {
        session
            .apply(Mutation::UpdateText {
                path: vec![0],
                text: text.into(),
            })
            .unwrap();
    }

    #[test]
    fn test_session_creation() {
        let session = session();
        assert_eq!(session.id, "author-1");
        assert_eq!(session.pending_count(), 0);
        assert!(!session.has_unsaved_changes());
    }

    #[test]
    fn test_completed_save_clears_dirty() {
        let mut session = session();
        edit(&mut session, "Hello there");
        assert!(session.has_unsaved_changes());

        let ticket = session.begin_save();
        assert!(ticket.sync.changed);

        let outcome = session.complete_save(ticket.generation, ticket.sync.blocks.clone()).unwrap();
        assert_eq!(outcome, SaveOutcome::Applied);
        assert!(!session.has_unsaved_changes());
        assert_eq!(session.pending_count(), 0);
    }

    #[test]
    fn test_edit_during_save_stays_dirty() {
        let mut session = session();
        edit(&mut session, "one");
        let ticket = session.begin_save();
        edit(&mut session, "two");

        session.complete_save(ticket.generation, ticket.sync.blocks).unwrap();
        assert!(session.has_unsaved_changes());
        assert_eq!(session.pending_count(), 1);
    }

    #[test]
    fn test_older_completion_is_stale() {
        let mut session = session();
        edit(&mut session, "first");
        let older = session.begin_save();
        edit(&mut session, "second");
        let newer = session.begin_save();

        assert_eq!(
            session.complete_save(newer.generation, newer.sync.blocks.clone()).unwrap(),
            SaveOutcome::Applied
        );
        assert_eq!(session.saves_in_flight(), 1);
        assert_eq!(
            session.complete_save(older.generation, older.sync.blocks.clone()).unwrap(),
            SaveOutcome::Stale
        );
        assert_eq!(session.saves_in_flight(), 0);
        assert_eq!(session.document.last_known(), newer.blocks());
        assert!(!session.has_unsaved_changes());
    }

    #[test]
    fn test_unknown_generation() {
        let mut session = session();
        assert!(matches!(
            session.complete_save(42, Vec::new()),
            Err(EditorError::UnknownGeneration(42))
        ));
    }

    #[test]
    fn test_failed_save_keeps_changes() {
        let mut session = session();
        edit(&mut session, "unsaved");
        let ticket = session.begin_save();

        session.fail_save(ticket.generation);
        assert!(session.has_unsaved_changes());
        assert_eq!(session.document.tree().root[0].text_content(), "unsaved");
        assert_eq!(session.saves_in_flight(), 0);
    }
}
