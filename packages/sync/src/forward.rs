//! # Forward Transform (Store -> Tree)
//!
//! Deterministic construction of a document tree from blocks. Loading never
//! fails: a block the registry cannot interpret becomes an opaque
//! passthrough node carrying its raw content.

use crate::passthrough::passthrough_node;
use crate::registry::Registry;
use courseweave_model::{Block, DocumentTree, Node};
use tracing::{debug, instrument, warn};

/// Build the editor tree. Blocks are put in `order` first (stable, so ties
/// keep input order); an empty slice yields an empty root.
#[instrument(skip_all, fields(blocks = blocks.len()))]
pub fn build_tree(registry: &Registry, blocks: &[Block]) -> DocumentTree {
    let mut ordered: Vec<&Block> = blocks.iter().collect();
    ordered.sort_by_key(|block| block.order);

    let root: Vec<Node> = ordered
        .into_iter()
        .map(|block| build_node(registry, block))
        .collect();

    debug!(nodes = root.len(), "built document tree");
    DocumentTree::from_nodes(root)
}

/// Tree node for a single block, tagged with the block's id
pub fn build_node(registry: &Registry, block: &Block) -> Node {
    let mut node = match registry.build(&block.block_type, &block.content) {
        Some(Ok(node)) => node,
        Some(Err(err)) => {
            warn!(
                block_id = %block.id,
                block_type = %block.block_type,
                error = %err,
                "Malformed block content, loading as passthrough"
            );
            passthrough_node(block)
        }
        None => {
            warn!(
                block_id = %block.id,
                block_type = %block.block_type,
                "Unregistered block type, loading as passthrough"
            );
            passthrough_node(block)
        }
    };

    if !block.id.is_empty() {
        node.id = Some(block.id.clone());
    }
    node
}
