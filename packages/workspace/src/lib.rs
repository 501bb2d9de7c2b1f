//! # Courseweave Workspace
//!
//! Runtime around open documents: the block store and asset collaborators,
//! per-document save serialization, debounced autosave and the registry of
//! open sessions.

pub mod assets;
pub mod autosave;
pub mod config;
pub mod coordinator;
mod errors;
pub mod session;
pub mod store;

pub use assets::{collect_asset_refs, resolve_assets, AssetMetadata, AssetReport, AssetResolver, MemoryAssetResolver};
pub use autosave::Autosave;
pub use config::WorkspaceConfig;
pub use coordinator::{SaveCoordinator, WriteOutcome};
pub use errors::{SessionError, StoreError, StoreResult};
pub use session::{DocumentSession, SaveReport, SaveStatus, SessionManager};
pub use store::{BlockStore, FileBlockStore, MemoryBlockStore};
