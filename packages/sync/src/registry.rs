//! # Node Type Registry
//!
//! Bidirectional mapping between a block's declared type and the node shape
//! it occupies in the document tree.
//!
//! Each registered type pairs a builder (`content -> node`) with an
//! extractor (`node -> content`). A one-directional mapping guarantees
//! silent data loss, so [`RegistryBuilder::build`] refuses to produce a
//! registry unless every builder has a matching extractor and vice versa.
//!
//! ```rust,ignore
//! let registry = RegistryBuilder::standard()
//!     .register(
//!         BlockType::Other("callout".into()),
//!         NodeKind::Custom("callout".into()),
//!         build_callout,
//!         extract_callout,
//!     )
//!     .build()?;
//! ```

use crate::errors::{ConvertError, ConvertResult, RegistryError};
use crate::kinds;
use crate::normalize::equivalent;
use courseweave_model::{BlockType, Node, NodeKind};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub type BuildFn = Arc<dyn Fn(&Value) -> ConvertResult<Node> + Send + Sync>;
pub type ExtractFn = Arc<dyn Fn(&Node) -> ConvertResult<Value> + Send + Sync>;

struct Mapping {
    kind: NodeKind,
    build: BuildFn,
    extract: ExtractFn,
}

/// Validated, immutable set of block kind mappings
pub struct Registry {
    mappings: HashMap<BlockType, Mapping>,
    types_by_kind: HashMap<NodeKind, BlockType>,
    registration_order: Vec<BlockType>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Registry with every built-in block kind
    pub fn standard() -> Self {
        RegistryBuilder::standard()
            .build()
            .expect("built-in block kinds register both directions")
    }

    pub fn is_registered(&self, block_type: &BlockType) -> bool {
        self.mappings.contains_key(block_type)
    }

    pub fn kind_for(&self, block_type: &BlockType) -> Option<&NodeKind> {
        self.mappings.get(block_type).map(|mapping| &mapping.kind)
    }

    pub fn block_type_for(&self, kind: &NodeKind) -> Option<&BlockType> {
        self.types_by_kind.get(kind)
    }

    /// Registered block types in registration order
    pub fn block_types(&self) -> impl Iterator<Item = &BlockType> {
        self.registration_order.iter()
    }

    /// Run the builder for `block_type`. `None` when the type is not registered.
    pub fn build(&self, block_type: &BlockType, content: &Value) -> Option<ConvertResult<Node>> {
        self.mappings
            .get(block_type)
            .map(|mapping| (mapping.build)(content))
    }

    /// Run the extractor for the node's kind
    pub fn extract(&self, node: &Node) -> ConvertResult<(BlockType, Value)> {
        let block_type = self
            .types_by_kind
            .get(&node.kind)
            .ok_or_else(|| ConvertError::Unmapped(node.kind.clone()))?;
        let mapping = &self.mappings[block_type];

        (mapping.extract)(node).map(|content| (block_type.clone(), content))
    }

    /// `extract(build(content)) == content`
    pub fn content_round_trips(&self, block_type: &BlockType, content: &Value) -> ConvertResult<bool> {
        let node = match self.build(block_type, content) {
            Some(result) => result?,
            None => return Ok(false),
        };
        let (_, back) = self.extract(&node)?;
        Ok(&back == content)
    }

    /// `build(extract(node))` is equivalent to `node`, ignoring presentation
    /// attributes and run splitting
    pub fn node_round_trips(&self, node: &Node) -> ConvertResult<bool> {
        let (block_type, content) = self.extract(node)?;
        let rebuilt = match self.build(&block_type, &content) {
            Some(result) => result?,
            None => return Ok(false),
        };
        Ok(equivalent(&rebuilt, node))
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.registration_order
                    .iter()
                    .map(|block_type| (block_type.as_str(), self.mappings[block_type].kind.as_str())),
            )
            .finish()
    }
}

/// Collects mappings and validates them as a whole
#[derive(Default)]
pub struct RegistryBuilder {
    builders: Vec<(BlockType, NodeKind, BuildFn)>,
    extractors: Vec<(NodeKind, ExtractFn)>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder preloaded with the built-in kinds
    pub fn standard() -> Self {
        Self::new()
            .register(
                BlockType::Paragraph,
                NodeKind::Paragraph,
                |content| kinds::build_text(NodeKind::Paragraph, &BlockType::Paragraph, content),
                kinds::extract_text,
            )
            .register(
                BlockType::Heading,
                NodeKind::Heading,
                kinds::build_heading,
                kinds::extract_heading,
            )
            .register(
                BlockType::Quote,
                NodeKind::Quote,
                |content| kinds::build_text(NodeKind::Quote, &BlockType::Quote, content),
                kinds::extract_text,
            )
            .register(
                BlockType::BulletedList,
                NodeKind::BulletList,
                |content| kinds::build_list(NodeKind::BulletList, &BlockType::BulletedList, content),
                kinds::extract_list,
            )
            .register(
                BlockType::OrderedList,
                NodeKind::OrderedList,
                |content| kinds::build_list(NodeKind::OrderedList, &BlockType::OrderedList, content),
                kinds::extract_list,
            )
            .register(
                BlockType::ContentScreen,
                NodeKind::ContentScreen,
                |content| {
                    kinds::build_container(
                        NodeKind::ContentScreen,
                        &BlockType::ContentScreen,
                        "elements",
                        NodeKind::ScreenElement,
                        content,
                    )
                },
                |node| kinds::extract_container(node, "elements", &NodeKind::ScreenElement),
            )
            .register(
                BlockType::ObjectivesImport,
                NodeKind::ObjectivesImport,
                |content| {
                    kinds::build_container(
                        NodeKind::ObjectivesImport,
                        &BlockType::ObjectivesImport,
                        "objectives",
                        NodeKind::Objective,
                        content,
                    )
                },
                |node| kinds::extract_container(node, "objectives", &NodeKind::Objective),
            )
    }

    pub fn register_builder<B>(mut self, block_type: BlockType, kind: NodeKind, build: B) -> Self
    where
        B: Fn(&Value) -> ConvertResult<Node> + Send + Sync + 'static,
    {
        self.builders.push((block_type, kind, Arc::new(build)));
        self
    }

    pub fn register_extractor<E>(mut self, kind: NodeKind, extract: E) -> Self
    where
        E: Fn(&Node) -> ConvertResult<Value> + Send + Sync + 'static,
    {
        self.extractors.push((kind, Arc::new(extract)));
        self
    }

    /// Register both directions at once
    pub fn register<B, E>(self, block_type: BlockType, kind: NodeKind, build: B, extract: E) -> Self
    where
        B: Fn(&Value) -> ConvertResult<Node> + Send + Sync + 'static,
        E: Fn(&Node) -> ConvertResult<Value> + Send + Sync + 'static,
    {
        self.register_builder(block_type, kind.clone(), build)
            .register_extractor(kind, extract)
    }

    pub fn build(self) -> Result<Registry, RegistryError> {
        let mut extractors: HashMap<NodeKind, ExtractFn> = HashMap::new();
        for (kind, extract) in self.extractors {
            if kind == NodeKind::Unrecognized {
                return Err(RegistryError::ReservedKind(kind));
            }
            if extractors.insert(kind.clone(), extract).is_some() {
                return Err(RegistryError::DuplicateKind(kind));
            }
        }

        let mut mappings = HashMap::new();
        let mut types_by_kind = HashMap::new();
        let mut registration_order = Vec::new();

        for (block_type, kind, build) in self.builders {
            if kind == NodeKind::Unrecognized {
                return Err(RegistryError::ReservedKind(kind));
            }
            if mappings.contains_key(&block_type) {
                return Err(RegistryError::DuplicateType(block_type));
            }
            if types_by_kind.contains_key(&kind) {
                return Err(RegistryError::DuplicateKind(kind));
            }

            let extract = extractors
                .remove(&kind)
                .ok_or_else(|| RegistryError::MissingExtractor {
                    block_type: block_type.clone(),
                    kind: kind.clone(),
                })?;

            types_by_kind.insert(kind.clone(), block_type.clone());
            registration_order.push(block_type.clone());
            mappings.insert(block_type, Mapping { kind, build, extract });
        }

        // Whatever is left has no builder producing its kind
        if let Some(kind) = extractors.into_keys().next() {
            return Err(RegistryError::MissingBuilder { kind });
        }

        Ok(Registry {
            mappings,
            types_by_kind,
            registration_order,
        })
    }
}
