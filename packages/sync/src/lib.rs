//! # Courseweave Sync
//!
//! Bidirectional transform between the persisted block sequence and the
//! editor's document tree.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ store: [Block] ordered by `order`            │
//! └──────────────────────────────────────────────┘
//!        │ build_tree              ▲ extract_blocks
//!        ▼                         │ (+ SyncResult)
//! ┌──────────────────────────────────────────────┐
//! │ editor: DocumentTree { root: [Node] }        │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! Both directions dispatch through one [`Registry`]; root children are the
//! join point and map 1:1 onto blocks.
//!
//! ## Core Principles
//!
//! 1. **Pure**: no I/O, same input gives the same output
//! 2. **Loads never fail**: unknown block types load as passthrough nodes
//! 3. **Saves never silently drop**: unmappable nodes are reported
//! 4. **Order is recomputed**: always dense `0..n`, never diffed
//!
//! ## Usage
//!
//! ```rust,ignore
//! use courseweave_sync::{build_tree, extract_blocks, word_count, Registry};
//!
//! let registry = Registry::standard();
//! let tree = build_tree(&registry, &blocks);
//! // ... editor mutates tree ...
//! let result = extract_blocks(&registry, &tree, &blocks);
//! if result.changed {
//!     store.persist_blocks(doc_id, result.blocks).await?;
//! }
//! ```

mod errors;
pub mod extent;
pub mod forward;
pub mod inline;
pub mod kinds;
pub mod normalize;
pub mod passthrough;
pub mod registry;
pub mod reverse;

pub use errors::{ConvertError, ConvertResult, RegistryError};
pub use extent::{extent, word_count, Extent};
pub use forward::{build_node, build_tree};
pub use normalize::{equivalent, normalized};
pub use passthrough::ORIGINAL_TYPE_ATTR;
pub use registry::{BuildFn, ExtractFn, Registry, RegistryBuilder};
pub use reverse::{extract_blocks, SyncResult, UnmappedNode};
