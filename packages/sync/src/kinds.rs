//! Builders and extractors for the built-in block kinds.
//!
//! Every content field that is not structural (`text`, `marks`, the child
//! array of a container) travels as a node attribute, so fields added by
//! other versions of the product survive a load/save cycle untouched.
//!
//! | block type          | node kind           | children                |
//! |---------------------|---------------------|-------------------------|
//! | `paragraph`         | `paragraph`         | text runs               |
//! | `heading`           | `heading`           | text runs, `level` attr |
//! | `quote`             | `quote`             | text runs               |
//! | `bulleted_list`     | `bullet_list`       | `list_item` nodes       |
//! | `ordered_list`      | `ordered_list`      | `list_item` nodes       |
//! | `content_screen`    | `content_screen`    | `screen_element` nodes  |
//! | `objectives_import` | `objectives_import` | `objective` nodes       |

use crate::errors::{ConvertError, ConvertResult};
use crate::inline::{mark_ranges_value, parse_mark_ranges, runs_from_text, text_from_runs};
use courseweave_model::{BlockType, Child, Node, NodeKind, TextRun};
use serde_json::{Map, Value};

type Object = Map<String, Value>;

pub const MAX_HEADING_LEVEL: u64 = 6;

/// Set on list items stored as objects, so they are written back as objects
/// even when they carry nothing but text
pub const LIST_ITEM_FORM_ATTR: &str = "data-item-form";

fn content_object(block_type: &BlockType, content: &Value) -> ConvertResult<Object> {
    match content {
        Value::Object(map) => Ok(map.clone()),
        Value::Null => Ok(Object::new()),
        _ => Err(ConvertError::NotAnObject {
            block_type: block_type.clone(),
        }),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn expect_string_field(map: &Object, field: &str) -> ConvertResult<()> {
    match map.get(field) {
        None | Some(Value::String(_)) => Ok(()),
        Some(other) => Err(ConvertError::invalid_field(
            field,
            format!("expected string, found {}", json_type_name(other)),
        )),
    }
}

/// Remove `text`/`marks` from `map` and turn them into runs.
/// `None` when the object carries no text at all.
fn take_inline(map: &mut Object) -> ConvertResult<Option<Vec<TextRun>>> {
    let text = match map.remove("text") {
        None => None,
        Some(Value::String(text)) => Some(text),
        Some(other) => {
            return Err(ConvertError::invalid_field(
                "text",
                format!("expected string, found {}", json_type_name(&other)),
            ))
        }
    };
    let marks = match map.remove("marks") {
        Some(value) => parse_mark_ranges(value)?,
        None => Vec::new(),
    };

    match text {
        Some(text) => runs_from_text(&text, &marks).map(Some),
        None if marks.is_empty() => Ok(None),
        None => Err(ConvertError::invalid_field("marks", "marks without text")),
    }
}

fn put_inline<'a>(map: &mut Object, runs: impl IntoIterator<Item = &'a TextRun>) {
    let (text, marks) = text_from_runs(runs);
    map.insert("text".to_string(), Value::String(text));
    if !marks.is_empty() {
        map.insert("marks".to_string(), mark_ranges_value(&marks));
    }
}

fn node_with_attrs(kind: NodeKind, attrs: Object) -> Node {
    let mut node = Node::new(kind);
    node.attrs.extend(attrs);
    node
}

fn attrs_object(node: &Node) -> Object {
    node.content_attrs()
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

/// Runs of a node that may only hold inline content
fn inline_runs(node: &Node) -> ConvertResult<Vec<&TextRun>> {
    node.children
        .iter()
        .map(|child| match child {
            Child::Text(run) => Ok(run),
            Child::Node(inner) => Err(ConvertError::unexpected_child(
                node.kind.clone(),
                format!("nested {} node", inner.kind),
            )),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Text blocks: paragraph, quote, heading
// ---------------------------------------------------------------------------

pub fn build_text(kind: NodeKind, block_type: &BlockType, content: &Value) -> ConvertResult<Node> {
    let mut map = content_object(block_type, content)?;
    let runs = take_inline(&mut map)?.unwrap_or_default();

    let mut node = node_with_attrs(kind, map);
    node.children = runs.into_iter().map(Child::Text).collect();
    Ok(node)
}

pub fn extract_text(node: &Node) -> ConvertResult<Value> {
    let runs = inline_runs(node)?;
    let mut map = attrs_object(node);
    put_inline(&mut map, runs);
    Ok(Value::Object(map))
}

fn check_heading_level(value: Option<&Value>) -> ConvertResult<()> {
    match value.and_then(Value::as_u64) {
        Some(level) if (1..=MAX_HEADING_LEVEL).contains(&level) => Ok(()),
        _ => Err(ConvertError::invalid_field(
            "level",
            format!("heading level must be an integer 1..={}", MAX_HEADING_LEVEL),
        )),
    }
}

pub fn build_heading(content: &Value) -> ConvertResult<Node> {
    let node = build_text(NodeKind::Heading, &BlockType::Heading, content)?;
    check_heading_level(node.attr("level"))?;
    Ok(node)
}

pub fn extract_heading(node: &Node) -> ConvertResult<Value> {
    check_heading_level(node.attr("level"))?;
    extract_text(node)
}

// ---------------------------------------------------------------------------
// Lists
// ---------------------------------------------------------------------------

fn build_list_item(item: Value) -> ConvertResult<Node> {
    match item {
        Value::String(text) => Ok(Node::new(NodeKind::ListItem).with_text(text)),
        Value::Object(map) => Ok(build_record(NodeKind::ListItem, "items", Value::Object(map))?
            .with_attr(LIST_ITEM_FORM_ATTR, "object")),
        other => Err(ConvertError::invalid_field(
            "items",
            format!("list item must be a string or object, found {}", json_type_name(&other)),
        )),
    }
}

fn extract_list_item(node: &Node) -> ConvertResult<Value> {
    if node.attr_str(LIST_ITEM_FORM_ATTR) == Some("object") {
        return extract_record(node);
    }

    let runs = inline_runs(node)?;
    let plain = node.content_attrs().next().is_none() && runs.iter().all(|run| run.marks.is_empty());

    if plain {
        Ok(Value::String(runs.iter().map(|run| run.text.as_str()).collect()))
    } else {
        let mut map = attrs_object(node);
        put_inline(&mut map, runs);
        Ok(Value::Object(map))
    }
}

pub fn build_list(kind: NodeKind, block_type: &BlockType, content: &Value) -> ConvertResult<Node> {
    let mut map = content_object(block_type, content)?;
    let items = match map.remove("items") {
        None => Vec::new(),
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(ConvertError::invalid_field(
                "items",
                format!("expected array, found {}", json_type_name(&other)),
            ))
        }
    };

    let mut node = node_with_attrs(kind, map);
    for item in items {
        node.children.push(Child::Node(build_list_item(item)?));
    }
    Ok(node)
}

pub fn extract_list(node: &Node) -> ConvertResult<Value> {
    let mut items = Vec::with_capacity(node.children.len());
    for child in &node.children {
        match child {
            Child::Node(item) if item.kind == NodeKind::ListItem => items.push(extract_list_item(item)?),
            Child::Node(other) => {
                return Err(ConvertError::unexpected_child(
                    node.kind.clone(),
                    format!("{} node where a list item was expected", other.kind),
                ))
            }
            Child::Text(_) => {
                return Err(ConvertError::unexpected_child(
                    node.kind.clone(),
                    "bare text outside a list item",
                ))
            }
        }
    }

    let mut map = attrs_object(node);
    map.insert("items".to_string(), Value::Array(items));
    Ok(Value::Object(map))
}

// ---------------------------------------------------------------------------
// Containers: content screen, objectives import
// ---------------------------------------------------------------------------

/// Structured record (screen element, objective): every field but the inline
/// text becomes an attribute
fn build_record(kind: NodeKind, field: &str, value: Value) -> ConvertResult<Node> {
    let mut map = match value {
        Value::Object(map) => map,
        other => {
            return Err(ConvertError::invalid_field(
                field,
                format!("entries must be objects, found {}", json_type_name(&other)),
            ))
        }
    };

    let runs = take_inline(&mut map)?;
    let mut node = node_with_attrs(kind, map);
    match runs {
        // keep an empty run so `"text": ""` is distinguishable from no text
        Some(runs) if runs.is_empty() => node.children.push(Child::text("")),
        Some(runs) => node.children.extend(runs.into_iter().map(Child::Text)),
        None => {}
    }
    Ok(node)
}

fn extract_record(node: &Node) -> ConvertResult<Value> {
    let runs = inline_runs(node)?;
    let mut map = attrs_object(node);
    if !runs.is_empty() {
        put_inline(&mut map, runs);
    }
    Ok(Value::Object(map))
}

pub fn build_container(
    kind: NodeKind,
    block_type: &BlockType,
    field: &str,
    entry_kind: NodeKind,
    content: &Value,
) -> ConvertResult<Node> {
    let mut map = content_object(block_type, content)?;
    expect_string_field(&map, "title")?;

    let entries = match map.remove(field) {
        None => Vec::new(),
        Some(Value::Array(entries)) => entries,
        Some(other) => {
            return Err(ConvertError::invalid_field(
                field,
                format!("expected array, found {}", json_type_name(&other)),
            ))
        }
    };

    let mut node = node_with_attrs(kind, map);
    for entry in entries {
        node.children.push(Child::Node(build_record(entry_kind.clone(), field, entry)?));
    }
    Ok(node)
}

pub fn extract_container(node: &Node, field: &str, entry_kind: &NodeKind) -> ConvertResult<Value> {
    let mut entries = Vec::with_capacity(node.children.len());
    for child in &node.children {
        match child {
            Child::Node(entry) if &entry.kind == entry_kind => entries.push(extract_record(entry)?),
            Child::Node(other) => {
                return Err(ConvertError::unexpected_child(
                    node.kind.clone(),
                    format!("{} node where {} was expected", other.kind, entry_kind),
                ))
            }
            Child::Text(_) => {
                return Err(ConvertError::unexpected_child(
                    node.kind.clone(),
                    format!("bare text outside {}", entry_kind),
                ))
            }
        }
    }

    let mut map = attrs_object(node);
    map.insert(field.to_string(), Value::Array(entries));
    Ok(Value::Object(map))
}
