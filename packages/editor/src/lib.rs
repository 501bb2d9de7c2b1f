//! # Courseweave Editor
//!
//! Document editing state between the block store and the editor surface.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ store: ordered blocks                       │
//! └─────────────────────────────────────────────┘
//!                     ↓ build_tree
//! ┌─────────────────────────────────────────────┐
//! │ editor: Document lifecycle + mutations      │
//! │  - Load blocks into a tree                  │
//! │  - Apply mutations with validation          │
//! │  - Extract blocks for saving                │
//! │  - Sequence concurrent saves by generation  │
//! └─────────────────────────────────────────────┘
//!                     ↓ extract_blocks
//! ┌─────────────────────────────────────────────┐
//! │ store: persist, assign ids                  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use courseweave_editor::{Document, EditSession, Mutation};
//!
//! let doc = Document::load("lesson-1", registry, blocks);
//! let mut session = EditSession::new("author-1", doc);
//!
//! session.apply(Mutation::UpdateText { path: vec![0], text: "Welcome".into() })?;
//!
//! let ticket = session.begin_save();
//! let persisted = store.persist_blocks("lesson-1", ticket.blocks()).await?;
//! session.complete_save(ticket.generation, persisted)?;
//! ```

mod document;
mod errors;
mod mutations;
mod session;

pub use document::Document;
pub use errors::EditorError;
pub use mutations::{node_at, Mutation, MutationError, MutationResult};
pub use session::{EditSession, PendingMutation, SaveOutcome, SaveTicket};
