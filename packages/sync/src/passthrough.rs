//! Opaque passthrough for blocks the registry cannot interpret.
//!
//! The node shows the raw JSON to the author as plain text and remembers the
//! original type, so saving it back restores the block verbatim.

use crate::errors::{ConvertError, ConvertResult};
use courseweave_model::{Block, BlockType, Node, NodeKind};
use serde_json::{json, Value};

pub const ORIGINAL_TYPE_ATTR: &str = "original_type";

pub fn passthrough_node(block: &Block) -> Node {
    Node::new(NodeKind::Unrecognized)
        .with_attr(ORIGINAL_TYPE_ATTR, block.block_type.as_str())
        .with_text(block.content.to_string())
}

/// Recover type and content from a passthrough node. Text the author edited
/// into invalid JSON is kept as `{"text": ...}` rather than dropped.
pub fn passthrough_content(node: &Node) -> ConvertResult<(BlockType, Value)> {
    let original = node
        .attr_str(ORIGINAL_TYPE_ATTR)
        .ok_or_else(|| ConvertError::invalid_field(ORIGINAL_TYPE_ATTR, "missing on passthrough node"))?;

    let raw = node.text_content();
    let content = serde_json::from_str(&raw).unwrap_or_else(|_| json!({ "text": raw }));

    Ok((BlockType::from(original), content))
}
