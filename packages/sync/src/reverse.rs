//! # Reverse Transform (Tree -> Store)
//!
//! Recovers the ordered block sequence from an edited tree.
//!
//! 1. Each root child yields one candidate block, in order.
//! 2. A node keeps its id when that id belongs to a last-known block not
//!    already claimed by an earlier node; otherwise the block is new and its
//!    id is left empty for the store to assign.
//! 3. `order` is reassigned densely from walk position.
//! 4. Content is re-derived through the registry.
//! 5. Last-known blocks with no node are deleted.
//! 6. Nodes that cannot be extracted are reported in `unmapped` and left
//!    out; every other node is still saved.

use crate::passthrough::passthrough_content;
use crate::registry::Registry;
use courseweave_model::{Block, DocumentTree, Node, NodeKind};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, instrument, warn};

/// A root child that could not be mapped back to a block
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnmappedNode {
    /// Position among the root's children
    pub position: usize,
    pub kind: NodeKind,
    pub id: Option<String>,
    /// Best-effort plain text, so the caller can show what was not saved
    pub text: String,
    pub reason: String,
}

/// Outcome of one reverse transform pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncResult {
    /// New block sequence, `order` = 0..n
    pub blocks: Vec<Block>,

    /// False only when type, content and order all match the last-known
    /// sequence position by position
    pub changed: bool,

    pub unmapped: Vec<UnmappedNode>,

    /// Blocks without an identity match (empty `id`)
    pub created: usize,

    /// Ids of last-known blocks that no node refers to any more
    pub deleted: Vec<String>,
}

impl SyncResult {
    /// Every node of the tree made it into `blocks`
    pub fn is_lossless(&self) -> bool {
        self.unmapped.is_empty()
    }
}

fn extract_node(registry: &Registry, node: &Node) -> Result<Block, String> {
    let extracted = if node.kind == NodeKind::Unrecognized {
        passthrough_content(node)
    } else {
        registry.extract(node)
    };

    extracted
        .map(|(block_type, content)| Block::unsaved(block_type, 0, content))
        .map_err(|err| err.to_string())
}

#[instrument(skip_all, fields(nodes = tree.len(), last_known = last_known.len()))]
pub fn extract_blocks(registry: &Registry, tree: &DocumentTree, last_known: &[Block]) -> SyncResult {
    let known_ids: HashSet<&str> = last_known
        .iter()
        .filter(|block| !block.is_unsaved())
        .map(|block| block.id.as_str())
        .collect();

    let mut claimed: HashSet<String> = HashSet::new();
    let mut blocks = Vec::with_capacity(tree.len());
    let mut unmapped = Vec::new();
    let mut created = 0;

    for (position, node) in tree.root.iter().enumerate() {
        let mut block = match extract_node(registry, node) {
            Ok(block) => block,
            Err(reason) => {
                warn!(position, kind = %node.kind, %reason, "Node not saved");
                unmapped.push(UnmappedNode {
                    position,
                    kind: node.kind.clone(),
                    id: node.id.clone(),
                    text: node.text_content(),
                    reason,
                });
                continue;
            }
        };

        let matched = match &node.id {
            Some(id) if known_ids.contains(id.as_str()) => claimed.insert(id.clone()),
            _ => false,
        };
        if matched {
            block.id = node.id.clone().unwrap_or_default();
        } else {
            created += 1;
        }

        block.order = blocks.len() as i64;
        blocks.push(block);
    }

    let mut previous: Vec<&Block> = last_known.iter().collect();
    previous.sort_by_key(|block| block.order);

    let unmapped_ids: HashSet<&str> = unmapped.iter().filter_map(|node| node.id.as_deref()).collect();
    let deleted: Vec<String> = previous
        .iter()
        .filter(|block| !block.is_unsaved())
        .filter(|block| !claimed.contains(&block.id) && !unmapped_ids.contains(block.id.as_str()))
        .map(|block| block.id.clone())
        .collect();

    let changed = blocks.len() != previous.len()
        || blocks
            .iter()
            .zip(previous.iter())
            .any(|(next, prev)| !next.same_as(prev));

    debug!(
        changed,
        created,
        deleted = deleted.len(),
        unmapped = unmapped.len(),
        "Extracted blocks"
    );

    SyncResult {
        blocks,
        changed,
        unmapped,
        created,
        deleted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forward::build_tree;
    use courseweave_model::BlockType;
    use serde_json::json;

    fn lesson() -> Vec<Block> {
        vec![
            Block::new("b1", BlockType::Heading, 0, json!({ "level": 1, "text": "Intro" })),
            Block::new("b2", BlockType::Paragraph, 1, json!({ "text": "Hello" })),
        ]
    }

    #[test]
    fn test_unedited_tree_is_unchanged() {
        let registry = Registry::standard();
        let blocks = lesson();
        let tree = build_tree(&registry, &blocks);

        let result = extract_blocks(&registry, &tree, &blocks);
        assert!(!result.changed);
        assert_eq!(result.blocks, blocks);
        assert_eq!(result.created, 0);
        assert!(result.deleted.is_empty());
    }

    #[test]
    fn test_duplicated_id_only_claimed_once() {
        let registry = Registry::standard();
        let blocks = lesson();
        let mut tree = build_tree(&registry, &blocks);
        let copy = tree.root[1].clone();
        tree.root.push(copy);

        let result = extract_blocks(&registry, &tree, &blocks);
        assert_eq!(result.blocks[1].id, "b2");
        assert!(result.blocks[2].is_unsaved());
        assert_eq!(result.created, 1);
        assert!(result.changed);
    }

    #[test]
    fn test_foreign_id_treated_as_new() {
        let registry = Registry::standard();
        let tree = DocumentTree::from_nodes(vec![
            Node::new(NodeKind::Paragraph).with_id("from-other-doc").with_text("pasted"),
        ]);

        let result = extract_blocks(&registry, &tree, &[]);
        assert!(result.blocks[0].is_unsaved());
        assert_eq!(result.created, 1);
    }

    #[test]
    fn test_unmapped_known_block_not_reported_deleted() {
        let registry = Registry::standard();
        let blocks = lesson();
        let mut tree = build_tree(&registry, &blocks);
        tree.root[1].kind = NodeKind::Custom("poll".into());

        let result = extract_blocks(&registry, &tree, &blocks);
        assert_eq!(result.unmapped.len(), 1);
        assert_eq!(result.unmapped[0].id.as_deref(), Some("b2"));
        assert!(result.deleted.is_empty());
        assert!(!result.is_lossless());
    }

    #[test]
    fn test_sparse_prior_order_reports_changed() {
        let registry = Registry::standard();
        let blocks = vec![
            Block::new("a", BlockType::Paragraph, 0, json!({ "text": "a" })),
            Block::new("b", BlockType::Paragraph, 7, json!({ "text": "b" })),
        ];
        let tree = build_tree(&registry, &blocks);

        let result = extract_blocks(&registry, &tree, &blocks);
        assert!(result.changed);
        assert_eq!(result.blocks[1].order, 1);
    }
}
