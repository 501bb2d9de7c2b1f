//! # Word/Extent Accounting
//!
//! Read-only counts over the current tree for the editor chrome. Best
//! effort: any tree shape, including one mid-edit, produces a number.

use courseweave_common::{walk_node, Visitor};
use courseweave_model::{DocumentTree, Node, NodeKind, TextRun};
use serde::Serialize;
use serde_json::Value;

/// Attributes holding author prose rather than metadata
const TEXT_ATTRS: [&str; 3] = ["title", "caption", "alt"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Extent {
    pub words: usize,
    pub characters: usize,
    pub blocks: usize,
}

#[derive(Default)]
struct ExtentCounter {
    extent: Extent,
    in_word: bool,
}

impl ExtentCounter {
    fn count(&mut self, text: &str) {
        for ch in text.chars() {
            self.extent.characters += 1;
            if ch.is_whitespace() {
                self.in_word = false;
            } else if !self.in_word {
                self.extent.words += 1;
                self.in_word = true;
            }
        }
    }
}

impl Visitor for ExtentCounter {
    fn visit_node(&mut self, node: &Node) {
        // raw JSON of an unrecognized block is not prose
        if node.kind == NodeKind::Unrecognized {
            return;
        }
        self.in_word = false;
        walk_node(self, node);
        self.in_word = false;
    }

    fn visit_attr(&mut self, _node: &Node, name: &str, value: &Value) {
        if let (true, Some(text)) = (TEXT_ATTRS.contains(&name), value.as_str()) {
            self.in_word = false;
            self.count(text);
            self.in_word = false;
        }
    }

    // Runs continue each other: "Hel" + bold "lo" is one word
    fn visit_text(&mut self, run: &TextRun) {
        self.count(&run.text);
    }
}

pub fn extent(tree: &DocumentTree) -> Extent {
    let mut counter = ExtentCounter::default();
    counter.visit_tree(tree);
    counter.extent.blocks = tree.len();
    counter.extent
}

pub fn word_count(tree: &DocumentTree) -> usize {
    extent(tree).words
}
