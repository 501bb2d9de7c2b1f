//! Storage representation: a flat, ordered sequence of typed blocks.

use crate::tree::Mark;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Declared kind of a block.
///
/// The built-in kinds are a closed set. `Other` carries any type string the
/// store hands us that is not built in: either a custom kind registered by
/// the host application, or content written by a newer version that this
/// build cannot interpret.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BlockType {
    Paragraph,
    Heading,
    BulletedList,
    OrderedList,
    Quote,
    ContentScreen,
    ObjectivesImport,
    Other(String),
}

impl BlockType {
    pub fn as_str(&self) -> &str {
        match self {
            BlockType::Paragraph => "paragraph",
            BlockType::Heading => "heading",
            BlockType::BulletedList => "bulleted_list",
            BlockType::OrderedList => "ordered_list",
            BlockType::Quote => "quote",
            BlockType::ContentScreen => "content_screen",
            BlockType::ObjectivesImport => "objectives_import",
            BlockType::Other(name) => name,
        }
    }

    /// Built-in (non-`Other`) types
    pub fn builtin() -> [BlockType; 7] {
        [
            BlockType::Paragraph,
            BlockType::Heading,
            BlockType::BulletedList,
            BlockType::OrderedList,
            BlockType::Quote,
            BlockType::ContentScreen,
            BlockType::ObjectivesImport,
        ]
    }
}

impl From<&str> for BlockType {
    fn from(name: &str) -> Self {
        match name {
            "paragraph" => BlockType::Paragraph,
            "heading" => BlockType::Heading,
            "bulleted_list" => BlockType::BulletedList,
            "ordered_list" => BlockType::OrderedList,
            "quote" => BlockType::Quote,
            "content_screen" => BlockType::ContentScreen,
            "objectives_import" => BlockType::ObjectivesImport,
            other => BlockType::Other(other.to_string()),
        }
    }
}

impl From<String> for BlockType {
    fn from(name: String) -> Self {
        BlockType::from(name.as_str())
    }
}

impl From<BlockType> for String {
    fn from(block_type: BlockType) -> Self {
        block_type.as_str().to_string()
    }
}

impl Serialize for BlockType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for BlockType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(BlockType::from(name))
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One persisted unit of document content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Stable identifier. Empty for blocks the store has not yet assigned one.
    #[serde(default)]
    pub id: String,

    #[serde(rename = "type")]
    pub block_type: BlockType,

    /// Document position. Only relative order matters on input.
    #[serde(default)]
    pub order: i64,

    /// Type-specific payload, kept as raw JSON so fields this build does not
    /// know about survive a load/save cycle.
    #[serde(default)]
    pub content: Value,
}

impl Block {
    pub fn new(id: impl Into<String>, block_type: BlockType, order: i64, content: Value) -> Self {
        Self {
            id: id.into(),
            block_type,
            order,
            content,
        }
    }

    /// Block produced by the editor that has no identifier yet
    pub fn unsaved(block_type: BlockType, order: i64, content: Value) -> Self {
        Self::new(String::new(), block_type, order, content)
    }

    pub fn is_unsaved(&self) -> bool {
        self.id.is_empty()
    }

    /// Type, content and position equality. Identifiers are ignored.
    pub fn same_as(&self, other: &Block) -> bool {
        self.block_type == other.block_type
            && self.order == other.order
            && self.content == other.content
    }
}

/// Sort into canonical reading order. Stable, so duplicate `order` values
/// keep their input order.
pub fn sort_blocks(blocks: &mut [Block]) {
    blocks.sort_by_key(|block| block.order);
}

/// Inline formatting over a char range of a text field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkRange {
    pub start: usize,
    pub end: usize,
    pub mark: Mark,
}

impl MarkRange {
    pub fn new(start: usize, end: usize, mark: Mark) -> Self {
        Self { start, end, mark }
    }
}
