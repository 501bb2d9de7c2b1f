use super::{load_tree, resolve};
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use courseweave_editor::Mutation;
use courseweave_model::DocumentTree;
use courseweave_sync::Registry;
use courseweave_workspace::{
    BlockStore, FileBlockStore, SaveReport, SaveStatus, SessionManager, StoreError, WorkspaceConfig,
};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Args)]
pub struct SaveArgs {
    /// Document id in the block store
    pub doc_id: String,

    /// Edited document tree JSON
    pub tree: String,

    /// Start an empty document when the id is not in the store yet
    #[arg(long)]
    pub create: bool,
}

/// Open `doc_id`, replace its tree with `tree` and save through the session
pub async fn save_tree<S: BlockStore + 'static>(
    store: Arc<S>,
    config: WorkspaceConfig,
    doc_id: &str,
    tree: DocumentTree,
    create: bool,
) -> Result<Option<SaveReport>> {
    if create {
        match store.fetch_blocks(doc_id).await {
            Err(StoreError::NotFound(_)) => {
                info!(doc_id, "Creating empty document");
                store.persist_blocks(doc_id, Vec::new()).await?;
            }
            Err(err) => return Err(err.into()),
            Ok(_) => {}
        }
    }

    let manager = SessionManager::new(store, Arc::new(Registry::standard()), config);
    let document = manager.open(doc_id).await?;
    let session = document.session();

    let existing = session.lock().await.document.tree().len();
    for _ in 0..existing {
        session.apply(Mutation::RemoveNode { index: 0 }).await?;
    }
    for (index, node) in tree.root.into_iter().enumerate() {
        session.apply(Mutation::InsertNode { index, node }).await?;
    }

    Ok(manager.close(doc_id).await?)
}

pub fn save(args: SaveArgs, config: &Config, cwd: &str) -> Result<()> {
    let tree = load_tree(&resolve(cwd, &args.tree))?;
    let store = Arc::new(FileBlockStore::new(config.get_store_dir(cwd)));

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let report = runtime.block_on(save_tree(
        store,
        config.workspace_config(),
        &args.doc_id,
        tree,
        args.create,
    ))?;

    let Some(report) = report else {
        println!("{} Nothing to save", "✓".green());
        return Ok(());
    };

    for node in &report.unmapped {
        println!(
            "  {} node {} ({}) was not saved: {}",
            "⚠️".yellow(),
            node.position,
            node.kind,
            node.reason
        );
    }
    if !report.deleted.is_empty() {
        println!("  Removed {} blocks", report.deleted.len());
    }

    match report.status {
        SaveStatus::Written => println!("{} Saved {}", "✅".green(), args.doc_id.bright_white()),
        SaveStatus::Unchanged => println!("{} {} is up to date", "✓".green(), args.doc_id),
        SaveStatus::Superseded | SaveStatus::Stale => {
            println!("{} A newer save of {} won", "⚠️".yellow(), args.doc_id)
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use courseweave_model::{Block, BlockType, Node, NodeKind};
    use courseweave_workspace::MemoryBlockStore;
    use serde_json::json;

    #[tokio::test]
    async fn test_save_tree_replaces_content() {
        let store = Arc::new(MemoryBlockStore::new());
        store
            .insert(
                "lesson",
                vec![Block::new("b1", BlockType::Paragraph, 0, json!({ "text": "old" }))],
            )
            .await;

        let tree = DocumentTree::from_nodes(vec![
            Node::new(NodeKind::Heading).with_attr("level", 2).with_text("New"),
            Node::new(NodeKind::Paragraph).with_id("b1").with_text("kept"),
        ]);
        let report = save_tree(store.clone(), WorkspaceConfig::default(), "lesson", tree, false)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(report.status, SaveStatus::Written);
        let stored = store.snapshot("lesson").await.unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[1].id, "b1");
        assert_eq!(stored[1].content, json!({ "text": "kept" }));
    }

    #[test]
    fn test_save_uses_given_config() {
        let dir = tempfile::tempdir().unwrap();
        let cwd = dir.path().display().to_string();
        std::fs::write(
            dir.path().join("tree.json"),
            r#"{ "root": [{ "kind": "paragraph", "children": [{ "text": "Hi" }] }] }"#,
        )
        .unwrap();

        let config = Config {
            store_dir: "course-blocks".to_string(),
            ..Config::default()
        };
        let args = SaveArgs {
            doc_id: "intro".to_string(),
            tree: "tree.json".to_string(),
            create: true,
        };
        save(args, &config, &cwd).unwrap();

        assert!(dir.path().join("course-blocks/intro.blocks.json").exists());
        assert!(!dir.path().join("blocks").exists());
    }

    #[tokio::test]
    async fn test_save_tree_create() {
        let store = Arc::new(MemoryBlockStore::new());
        let tree = DocumentTree::from_nodes(vec![Node::new(NodeKind::Quote).with_text("First")]);

        assert!(save_tree(store.clone(), WorkspaceConfig::default(), "fresh", tree.clone(), false)
            .await
            .is_err());

        save_tree(store.clone(), WorkspaceConfig::default(), "fresh", tree, true)
            .await
            .unwrap();
        let stored = store.snapshot("fresh").await.unwrap();
        assert_eq!(stored[0].block_type, BlockType::Quote);
    }
}
