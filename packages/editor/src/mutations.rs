//! # Tree Mutations
//!
//! Structural edits the editor surface performs on a document tree.
//!
//! Root-level operations (`InsertNode`, `RemoveNode`, `MoveNode`) address
//! blocks by position. Inline edits address any node by a path: the first
//! index selects a root child, each further index selects a child node of
//! the previous one.
//!
//! Every mutation is validated before it touches the tree, so a rejected
//! mutation leaves the tree exactly as it was.

use courseweave_model::{Child, DocumentTree, Node, TextRun};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Mutation {
    /// Insert a block-level node before `index` (`index == len` appends)
    InsertNode { index: usize, node: Node },

    RemoveNode { index: usize },

    /// Relocate a block-level node; `to` is its position after the move
    MoveNode { from: usize, to: usize },

    /// Replace all inline content of a node with a single plain run
    UpdateText { path: Vec<usize>, text: String },

    /// Replace all inline content of a node with formatted runs
    ReplaceRuns { path: Vec<usize>, runs: Vec<TextRun> },

    SetAttribute {
        path: Vec<usize>,
        name: String,
        value: Value,
    },

    RemoveAttribute { path: Vec<usize>, name: String },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Index {index} out of range for {len} blocks")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("No node at path {0}")]
    PathNotFound(String),

    #[error("Empty node path")]
    EmptyPath,

    #[error("Node at {0} holds child nodes, not inline text")]
    NotInline(String),

    #[error("Attribute `{0}` cannot be empty")]
    InvalidAttribute(String),
}

fn format_path(path: &[usize]) -> String {
    path.iter()
        .map(|index| index.to_string())
        .collect::<Vec<_>>()
        .join("/")
}

fn check_index(index: usize, len: usize) -> Result<(), MutationError> {
    if index < len {
        Ok(())
    } else {
        Err(MutationError::IndexOutOfRange { index, len })
    }
}

/// Resolve `path` against the tree
pub fn node_at<'a>(tree: &'a DocumentTree, path: &[usize]) -> Result<&'a Node, MutationError> {
    let (first, rest) = path.split_first().ok_or(MutationError::EmptyPath)?;
    let mut node = tree
        .root
        .get(*first)
        .ok_or_else(|| MutationError::PathNotFound(format_path(path)))?;

    for index in rest {
        node = node
            .children
            .get(*index)
            .and_then(Child::as_node)
            .ok_or_else(|| MutationError::PathNotFound(format_path(path)))?;
    }
    Ok(node)
}

fn node_at_mut<'a>(tree: &'a mut DocumentTree, path: &[usize]) -> Result<&'a mut Node, MutationError> {
    let (first, rest) = path.split_first().ok_or(MutationError::EmptyPath)?;
    let mut node = tree
        .root
        .get_mut(*first)
        .ok_or_else(|| MutationError::PathNotFound(format_path(path)))?;

    for index in rest {
        node = node
            .children
            .get_mut(*index)
            .and_then(Child::as_node_mut)
            .ok_or_else(|| MutationError::PathNotFound(format_path(path)))?;
    }
    Ok(node)
}

fn inline_target<'a>(tree: &'a DocumentTree, path: &[usize]) -> Result<&'a Node, MutationError> {
    let node = node_at(tree, path)?;
    if node.child_nodes().next().is_some() {
        return Err(MutationError::NotInline(format_path(path)));
    }
    Ok(node)
}

impl Mutation {
    /// Check the mutation against the tree without applying it
    pub fn validate(&self, tree: &DocumentTree) -> Result<(), MutationError> {
        match self {
            Mutation::InsertNode { index, .. } => {
                if *index > tree.len() {
                    return Err(MutationError::IndexOutOfRange {
                        index: *index,
                        len: tree.len(),
                    });
                }
                Ok(())
            }
            Mutation::RemoveNode { index } => check_index(*index, tree.len()),
            Mutation::MoveNode { from, to } => {
                check_index(*from, tree.len())?;
                check_index(*to, tree.len())
            }
            Mutation::UpdateText { path, .. } | Mutation::ReplaceRuns { path, .. } => {
                inline_target(tree, path).map(|_| ())
            }
            Mutation::SetAttribute { path, name, .. } | Mutation::RemoveAttribute { path, name } => {
                if name.is_empty() {
                    return Err(MutationError::InvalidAttribute(name.clone()));
                }
                node_at(tree, path).map(|_| ())
            }
        }
    }

    /// Apply the mutation, validating first
    pub fn apply(&self, tree: &mut DocumentTree) -> Result<(), MutationError> {
        self.validate(tree)?;

        match self {
            Mutation::InsertNode { index, node } => {
                tree.root.insert(*index, node.clone());
            }
            Mutation::RemoveNode { index } => {
                tree.root.remove(*index);
            }
            Mutation::MoveNode { from, to } => {
                let node = tree.root.remove(*from);
                tree.root.insert(*to, node);
            }
            Mutation::UpdateText { path, text } => {
                let node = node_at_mut(tree, path)?;
                node.children = vec![Child::text(text.clone())];
            }
            Mutation::ReplaceRuns { path, runs } => {
                let node = node_at_mut(tree, path)?;
                node.children = runs.iter().cloned().map(Child::Text).collect();
            }
            Mutation::SetAttribute { path, name, value } => {
                let node = node_at_mut(tree, path)?;
                node.attrs.insert(name.clone(), value.clone());
            }
            Mutation::RemoveAttribute { path, name } => {
                let node = node_at_mut(tree, path)?;
                node.attrs.remove(name);
            }
        }

        Ok(())
    }
}

/// Result of applying a mutation
#[derive(Debug, Clone, PartialEq)]
pub struct MutationResult {
    /// Document version after the mutation
    pub version: u64,
}
