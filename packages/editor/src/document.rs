//! # Document Handle
//!
//! One open document: the editable tree plus the block sequence it was last
//! synchronized with.
//!
//! ## Lifecycle
//!
//! ```text
//! Load → Build tree → Edit → Extract → Persist → Commit
//!   ↓        ↓          ↓       ↓         ↓         ↓
//! Blocks   Tree    Mutations  SyncResult Store  Last-known blocks
//! ```

use crate::{EditorError, Mutation, MutationResult};
use courseweave_model::{Block, BlockType, DocumentTree, Node, NodeKind};
use courseweave_sync::passthrough::passthrough_content;
use courseweave_sync::{build_tree, extent, extract_blocks, Extent, Registry, SyncResult};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Editable course document
#[derive(Debug)]
pub struct Document {
    pub id: String,

    /// Increments on each applied mutation
    pub version: u64,

    registry: Arc<Registry>,
    tree: DocumentTree,

    /// Blocks as the store last returned them, sorted by order
    last_known: Vec<Block>,
}

impl Document {
    /// Open a document from its persisted blocks
    pub fn load(id: impl Into<String>, registry: Arc<Registry>, mut blocks: Vec<Block>) -> Self {
        courseweave_model::sort_blocks(&mut blocks);
        let tree = build_tree(&registry, &blocks);

        Self {
            id: id.into(),
            version: 0,
            registry,
            tree,
            last_known: blocks,
        }
    }

    pub fn tree(&self) -> &DocumentTree {
        &self.tree
    }

    pub fn last_known(&self) -> &[Block] {
        &self.last_known
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Build a fresh node for a block type, ready for `Mutation::InsertNode`
    pub fn new_node(&self, block_type: &BlockType, content: &serde_json::Value) -> Result<Node, EditorError> {
        match self.registry.build(block_type, content) {
            Some(result) => Ok(result?),
            None => Err(EditorError::UnregisteredType(block_type.clone())),
        }
    }

    pub fn apply(&mut self, mutation: Mutation) -> Result<MutationResult, EditorError> {
        mutation.apply(&mut self.tree)?;
        self.version += 1;

        Ok(MutationResult {
            version: self.version,
        })
    }

    /// Reverse-transform the current tree against the last-known blocks
    pub fn prepare_save(&self) -> SyncResult {
        extract_blocks(&self.registry, &self.tree, &self.last_known)
    }

    /// Adopt the persisted sequence as the new last-known state and tag
    /// newly created nodes with the ids the store assigned, so the next
    /// sync matches them by identity.
    pub fn commit_save(&mut self, mut persisted: Vec<Block>) {
        courseweave_model::sort_blocks(&mut persisted);

        let stored: HashSet<&str> = persisted
            .iter()
            .filter(|block| !block.is_unsaved())
            .map(|block| block.id.as_str())
            .collect();

        // Nodes whose id the store no longer holds need a new one: no id, a
        // foreign id, an id from an overlapping save the store replaced, or a
        // copy of an id already claimed earlier in the tree
        let mut claimed: HashSet<&str> = HashSet::new();
        let mut candidates: Vec<usize> = Vec::new();
        for (position, node) in self.tree.root.iter().enumerate() {
            match node.id.as_deref() {
                Some(id) if stored.contains(id) && claimed.insert(id) => {}
                _ => candidates.push(position),
            }
        }

        // Ids minted by this save. Blocks that were already known but lost
        // their node while the save was in flight stay unassigned.
        let previous: HashSet<&str> = self.last_known.iter().map(|block| block.id.as_str()).collect();
        let mut fresh: Vec<&Block> = persisted
            .iter()
            .filter(|block| !block.is_unsaved())
            .filter(|block| !claimed.contains(block.id.as_str()) && !previous.contains(block.id.as_str()))
            .collect();

        let mut assignments: Vec<(usize, String)> = Vec::new();

        // Exact matches first
        candidates.retain(|&position| {
            let extracted = extract_for_match(&self.registry, &self.tree.root[position]);
            let found = extracted.and_then(|(block_type, content)| {
                fresh
                    .iter()
                    .position(|block| block.block_type == block_type && block.content == content)
            });
            match found {
                Some(index) => {
                    assignments.push((position, fresh.remove(index).id.clone()));
                    false
                }
                None => true,
            }
        });

        // Nodes edited while the save was in flight: pair by type in order
        for position in candidates {
            let block_type = extract_for_match(&self.registry, &self.tree.root[position])
                .map(|(block_type, _)| block_type);
            let found = block_type.and_then(|block_type| {
                fresh.iter().position(|block| block.block_type == block_type)
            });
            if let Some(index) = found {
                assignments.push((position, fresh.remove(index).id.clone()));
            }
        }

        debug!(
            document = %self.id,
            tagged = assignments.len(),
            untagged = fresh.len(),
            "Committed save"
        );

        for (position, id) in assignments {
            self.tree.root[position].id = Some(id);
        }
        self.last_known = persisted;
    }

    pub fn extent(&self) -> Extent {
        extent(&self.tree)
    }

    pub fn word_count(&self) -> usize {
        self.extent().words
    }
}

fn extract_for_match(registry: &Registry, node: &Node) -> Option<(BlockType, serde_json::Value)> {
    let extracted = if node.kind == NodeKind::Unrecognized {
        passthrough_content(node)
    } else {
        registry.extract(node)
    };
    extracted.ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn lesson() -> Vec<Block> {
        vec![
            Block::new("b2", BlockType::Paragraph, 1, json!({ "text": "Hello" })),
            Block::new("b1", BlockType::Heading, 0, json!({ "level": 1, "text": "Intro" })),
        ]
    }

    fn open() -> Document {
        Document::load("lesson-1", Arc::new(Registry::standard()), lesson())
    }

    #[test]
    fn test_load_sorts_and_builds() {
        let doc = open();
        assert_eq!(doc.version, 0);
        assert_eq!(doc.tree().len(), 2);
        assert_eq!(doc.tree().root[0].kind, NodeKind::Heading);
        assert_eq!(doc.last_known()[0].id, "b1");
        assert_eq!(doc.word_count(), 2);
    }

    #[test]
    fn test_failed_mutation_keeps_version() {
        let mut doc = open();
        assert!(doc.apply(Mutation::RemoveNode { index: 5 }).is_err());
        assert_eq!(doc.version, 0);

        let result = doc.apply(Mutation::RemoveNode { index: 0 }).unwrap();
        assert_eq!(result.version, 1);
    }

    #[test]
    fn test_commit_tags_new_nodes() {
        let mut doc = open();
        let node = doc
            .new_node(&BlockType::Quote, &json!({ "text": "Stay curious" }))
            .unwrap();
        doc.apply(Mutation::InsertNode { index: 2, node }).unwrap();

        let sync = doc.prepare_save();
        assert_eq!(sync.created, 1);

        let mut persisted = sync.blocks;
        persisted[2].id = "b3".into();
        doc.commit_save(persisted);

        assert_eq!(doc.tree().root[2].id.as_deref(), Some("b3"));
        assert!(!doc.prepare_save().changed);
    }

    #[test]
    fn test_commit_tags_node_edited_during_save() {
        let mut doc = open();
        let node = doc.new_node(&BlockType::Paragraph, &json!({ "text": "draft" })).unwrap();
        doc.apply(Mutation::InsertNode { index: 2, node }).unwrap();

        let sync = doc.prepare_save();
        doc.apply(Mutation::UpdateText {
            path: vec![2],
            text: "draft, revised".into(),
        })
        .unwrap();

        let mut persisted = sync.blocks;
        persisted[2].id = "b3".into();
        doc.commit_save(persisted);

        assert_eq!(doc.tree().root[2].id.as_deref(), Some("b3"));
        let next = doc.prepare_save();
        assert_eq!(next.created, 0);
        assert!(next.changed);
    }

    #[test]
    fn test_commit_retags_node_replaced_by_later_save() {
        let mut doc = open();
        let node = doc.new_node(&BlockType::Quote, &json!({ "text": "Stay curious" })).unwrap();
        doc.apply(Mutation::InsertNode { index: 2, node }).unwrap();

        let first = doc.prepare_save();
        let second = doc.prepare_save();

        let mut first_persisted = first.blocks;
        first_persisted[2].id = "b3".into();
        doc.commit_save(first_persisted);
        assert_eq!(doc.tree().root[2].id.as_deref(), Some("b3"));

        // the store replaced the whole sequence and minted its own id
        let mut second_persisted = second.blocks;
        second_persisted[2].id = "b4".into();
        doc.commit_save(second_persisted);
        assert_eq!(doc.tree().root[2].id.as_deref(), Some("b4"));

        let next = doc.prepare_save();
        assert!(!next.changed);
        assert_eq!(next.created, 0);
        assert!(next.deleted.is_empty());
    }

    #[test]
    fn test_commit_does_not_reuse_removed_block_id() {
        let mut doc = open();
        let sync = doc.prepare_save();
        doc.apply(Mutation::RemoveNode { index: 1 }).unwrap();
        let node = doc.new_node(&BlockType::Paragraph, &json!({ "text": "Hello" })).unwrap();
        doc.apply(Mutation::InsertNode { index: 1, node }).unwrap();

        doc.commit_save(sync.blocks);
        assert_eq!(doc.tree().root[1].id, None);
    }

    #[test]
    fn test_unregistered_node_type() {
        let doc = open();
        assert!(matches!(
            doc.new_node(&BlockType::Other("poll".into()), &json!({})),
            Err(EditorError::UnregisteredType(_))
        ));
    }
}
