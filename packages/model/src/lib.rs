//! # Courseweave Model
//!
//! Data definitions shared by every layer of the synchronization engine:
//!
//! - [`Block`]: one unit of persisted content (flat, ordered by `order`)
//! - [`DocumentTree`]: the nested structure handed to the interactive editor
//!
//! Neither type knows how to become the other; that lives in
//! `courseweave-sync`.

pub mod block;
pub mod id_generator;
pub mod tree;

pub use block::{sort_blocks, Block, BlockType, MarkRange};
pub use id_generator::{get_document_seed, IdGenerator};
pub use tree::{is_presentation_attr, Child, DocumentTree, Mark, Node, NodeKind, TextRun};
