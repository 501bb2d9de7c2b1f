//! Error types for the editor

use crate::mutations::MutationError;
use courseweave_model::BlockType;
use courseweave_sync::ConvertError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Mutation error: {0}")]
    Mutation(#[from] MutationError),

    #[error("Conversion error: {0}")]
    Convert(#[from] ConvertError),

    #[error("No node kind registered for block type `{0}`")]
    UnregisteredType(BlockType),

    #[error("Save generation {0} was never started or already settled")]
    UnknownGeneration(u64),
}
