//! Editing representation: the nested node tree consumed by the editor.
//!
//! ```text
//! DocumentTree
//!   root: [Node, Node, ...]      one per block, same order
//!     Node { kind, attrs, children: [Node | TextRun] }
//! ```
//!
//! Nesting below a root child belongs to that child's block alone.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Attribute prefix reserved for editor-injected presentation data
/// (generated DOM ids, collapse state, ...). Never persisted.
pub const PRESENTATION_PREFIX: &str = "data-";

pub fn is_presentation_attr(name: &str) -> bool {
    name.starts_with(PRESENTATION_PREFIX)
}

/// Shape tag of a node
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Paragraph,
    Heading,
    BulletList,
    OrderedList,
    ListItem,
    Quote,
    ContentScreen,
    ScreenElement,
    ObjectivesImport,
    Objective,
    /// Opaque stand-in for a block whose type could not be interpreted
    Unrecognized,
    /// Any other shape, e.g. an editor extension node
    Custom(String),
}

impl NodeKind {
    pub fn as_str(&self) -> &str {
        match self {
            NodeKind::Paragraph => "paragraph",
            NodeKind::Heading => "heading",
            NodeKind::BulletList => "bullet_list",
            NodeKind::OrderedList => "ordered_list",
            NodeKind::ListItem => "list_item",
            NodeKind::Quote => "quote",
            NodeKind::ContentScreen => "content_screen",
            NodeKind::ScreenElement => "screen_element",
            NodeKind::ObjectivesImport => "objectives_import",
            NodeKind::Objective => "objective",
            NodeKind::Unrecognized => "unrecognized",
            NodeKind::Custom(name) => name,
        }
    }
}

impl From<&str> for NodeKind {
    fn from(name: &str) -> Self {
        match name {
            "paragraph" => NodeKind::Paragraph,
            "heading" => NodeKind::Heading,
            "bullet_list" => NodeKind::BulletList,
            "ordered_list" => NodeKind::OrderedList,
            "list_item" => NodeKind::ListItem,
            "quote" => NodeKind::Quote,
            "content_screen" => NodeKind::ContentScreen,
            "screen_element" => NodeKind::ScreenElement,
            "objectives_import" => NodeKind::ObjectivesImport,
            "objective" => NodeKind::Objective,
            "unrecognized" => NodeKind::Unrecognized,
            other => NodeKind::Custom(other.to_string()),
        }
    }
}

impl Serialize for NodeKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NodeKind {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(NodeKind::from(name.as_str()))
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inline formatting mark attached to a text run
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Mark {
    Bold,
    Italic,
    Underline,
    Strike,
    Code,
    Link { href: String },
}

/// A span of text sharing one set of marks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TextRun {
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub marks: Vec<Mark>,
}

impl TextRun {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            marks: Vec::new(),
        }
    }

    pub fn marked(text: impl Into<String>, marks: Vec<Mark>) -> Self {
        Self {
            text: text.into(),
            marks,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Child {
    Text(TextRun),
    Node(Node),
}

impl Child {
    pub fn text(text: impl Into<String>) -> Self {
        Child::Text(TextRun::plain(text))
    }

    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Child::Node(node) => Some(node),
            Child::Text(_) => None,
        }
    }

    pub fn as_node_mut(&mut self) -> Option<&mut Node> {
        match self {
            Child::Node(node) => Some(node),
            Child::Text(_) => None,
        }
    }
}

impl From<Node> for Child {
    fn from(node: Node) -> Self {
        Child::Node(node)
    }
}

impl From<TextRun> for Child {
    fn from(run: TextRun) -> Self {
        Child::Text(run)
    }
}

/// Document tree node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Identifier of the block this node was built from. `None` for nodes
    /// the editor created since the last load.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub kind: NodeKind,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Child>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            id: None,
            kind,
            attrs: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: impl Into<Child>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_child(TextRun::plain(text))
    }

    pub fn attr(&self, name: &str) -> Option<&Value> {
        self.attrs.get(name)
    }

    pub fn attr_str(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).and_then(Value::as_str)
    }

    /// Attributes that belong to the content, i.e. not editor presentation
    pub fn content_attrs(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.attrs
            .iter()
            .filter(|(name, _)| !is_presentation_attr(name))
    }

    pub fn child_nodes(&self) -> impl Iterator<Item = &Node> {
        self.children.iter().filter_map(Child::as_node)
    }

    pub fn text_runs(&self) -> impl Iterator<Item = &TextRun> {
        self.children.iter().filter_map(|child| match child {
            Child::Text(run) => Some(run),
            Child::Node(_) => None,
        })
    }

    /// Plain text of this node and all descendants, nested nodes separated
    /// by a newline
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }
}

fn collect_text(node: &Node, out: &mut String) {
    for child in &node.children {
        match child {
            Child::Text(run) => out.push_str(&run.text),
            Child::Node(inner) => {
                if !out.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }
                collect_text(inner, out);
            }
        }
    }
}

/// Root container handed to the editor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentTree {
    #[serde(default)]
    pub root: Vec<Node>,
}

impl DocumentTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_nodes(root: Vec<Node>) -> Self {
        Self { root }
    }

    pub fn len(&self) -> usize {
        self.root.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.root.iter()
    }
}
