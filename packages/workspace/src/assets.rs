//! Asset lookups for blocks that embed attachments.
//!
//! Content screens reference uploaded media by id, either on the screen
//! itself (`asset: { "id": .. }`) or on an element (`assetId`). The resolver
//! returns what the editor needs to render a reference, never the binary.

use crate::errors::{StoreError, StoreResult};
use async_trait::async_trait;
use courseweave_common::Visitor;
use courseweave_model::{DocumentTree, Node};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetMetadata {
    pub id: String,
    pub file_name: String,
    pub mime_type: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

#[async_trait]
pub trait AssetResolver: Send + Sync {
    async fn resolve(&self, asset_id: &str) -> StoreResult<AssetMetadata>;
}

#[derive(Debug, Default)]
pub struct MemoryAssetResolver {
    assets: HashMap<String, AssetMetadata>,
}

impl MemoryAssetResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_asset(mut self, asset: AssetMetadata) -> Self {
        self.assets.insert(asset.id.clone(), asset);
        self
    }
}

#[async_trait]
impl AssetResolver for MemoryAssetResolver {
    async fn resolve(&self, asset_id: &str) -> StoreResult<AssetMetadata> {
        self.assets
            .get(asset_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(asset_id.to_string()))
    }
}

#[derive(Default)]
struct AssetRefCollector {
    ids: Vec<String>,
}

impl AssetRefCollector {
    fn push(&mut self, id: &str) {
        if !id.is_empty() && !self.ids.iter().any(|known| known == id) {
            self.ids.push(id.to_string());
        }
    }
}

impl Visitor for AssetRefCollector {
    fn visit_attr(&mut self, _node: &Node, name: &str, value: &Value) {
        match (name, value) {
            ("asset", Value::String(id)) | ("assetId", Value::String(id)) => self.push(id),
            ("asset", Value::Object(asset)) => {
                if let Some(id) = asset.get("id").and_then(Value::as_str) {
                    self.push(id);
                }
            }
            _ => {}
        }
    }
}

/// Asset ids referenced anywhere in the tree, first occurrence order
pub fn collect_asset_refs(tree: &DocumentTree) -> Vec<String> {
    let mut collector = AssetRefCollector::default();
    collector.visit_tree(tree);
    collector.ids
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct AssetReport {
    pub resolved: Vec<AssetMetadata>,

    /// Referenced ids the resolver does not know
    pub missing: Vec<String>,
}

/// Resolve every reference in the tree. Unknown assets are reported, not
/// fatal; any other resolver failure is.
pub async fn resolve_assets<R: AssetResolver + ?Sized>(resolver: &R, tree: &DocumentTree) -> StoreResult<AssetReport> {
    let mut report = AssetReport::default();

    for id in collect_asset_refs(tree) {
        match resolver.resolve(&id).await {
            Ok(asset) => report.resolved.push(asset),
            Err(StoreError::NotFound(_)) => {
                warn!(asset = %id, "Referenced asset not found");
                report.missing.push(id);
            }
            Err(err) => return Err(err),
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use courseweave_model::{Block, BlockType};
    use courseweave_sync::{build_tree, Registry};
    use serde_json::json;

    fn image(id: &str) -> AssetMetadata {
        AssetMetadata {
            id: id.to_string(),
            file_name: format!("{}.png", id),
            mime_type: "image/png".to_string(),
            url: format!("https://cdn.example/{}.png", id),
            width: Some(640),
            height: None,
        }
    }

    fn screen_tree() -> DocumentTree {
        let blocks = vec![Block::new(
            "s1",
            BlockType::ContentScreen,
            0,
            json!({
                "title": "Lab",
                "asset": { "id": "a1" },
                "elements": [
                    { "type": "image", "assetId": "a2", "alt": "Goggles" },
                    { "type": "image", "assetId": "a1" }
                ]
            }),
        )];
        build_tree(&Registry::standard(), &blocks)
    }

    #[test]
    fn test_collects_screen_and_element_refs() {
        assert_eq!(collect_asset_refs(&screen_tree()), vec!["a1", "a2"]);
    }

    #[tokio::test]
    async fn test_missing_asset_reported() {
        let resolver = MemoryAssetResolver::new().with_asset(image("a1"));
        let report = resolve_assets(&resolver, &screen_tree()).await.unwrap();

        assert_eq!(report.resolved, vec![image("a1")]);
        assert_eq!(report.missing, vec!["a2".to_string()]);
    }

    #[test]
    fn test_metadata_json_is_camel_case() {
        let value = serde_json::to_value(image("a1")).unwrap();
        assert_eq!(value["mimeType"], json!("image/png"));
        assert!(value.get("height").is_none());
    }
}
