//! Error types for the sync engine

use courseweave_model::{BlockType, NodeKind};
use thiserror::Error;

pub type ConvertResult<T> = Result<T, ConvertError>;

/// A single block or node could not be converted. Never fatal for a whole
/// document: the transforms degrade or report instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConvertError {
    #[error("Content for {block_type} must be a JSON object")]
    NotAnObject { block_type: BlockType },

    #[error("Invalid field `{field}`: {message}")]
    InvalidField { field: String, message: String },

    #[error("Unexpected child in {kind}: {message}")]
    UnexpectedChild { kind: NodeKind, message: String },

    #[error("No mapping registered for node kind {0}")]
    Unmapped(NodeKind),
}

impl ConvertError {
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn unexpected_child(kind: NodeKind, message: impl Into<String>) -> Self {
        Self::UnexpectedChild {
            kind,
            message: message.into(),
        }
    }
}

/// Registry construction failure. Indicates a programming defect, so
/// callers treat it as fatal at startup.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("Block type {block_type} has a builder but node kind {kind} has no extractor")]
    MissingExtractor { block_type: BlockType, kind: NodeKind },

    #[error("Node kind {kind} has an extractor but no builder produces it")]
    MissingBuilder { kind: NodeKind },

    #[error("Block type {0} registered more than once")]
    DuplicateType(BlockType),

    #[error("Node kind {0} registered more than once")]
    DuplicateKind(NodeKind),

    #[error("Node kind {0} is reserved")]
    ReservedKind(NodeKind),
}
