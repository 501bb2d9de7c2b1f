//! Structural comparison of nodes, ignoring what the editor is free to vary:
//! presentation attributes, node ids and how text is split into runs.

use courseweave_common::{walk_node_mut, VisitorMut};
use courseweave_model::{is_presentation_attr, Child, Node};

struct Normalizer;

impl VisitorMut for Normalizer {
    fn visit_node_mut(&mut self, node: &mut Node) {
        node.id = None;
        node.attrs.retain(|name, _| !is_presentation_attr(name));
        merge_runs(&mut node.children);
        walk_node_mut(self, node);
    }
}

/// Join adjacent runs with identical marks and drop empty ones
fn merge_runs(children: &mut Vec<Child>) {
    let mut merged: Vec<Child> = Vec::with_capacity(children.len());

    for child in children.drain(..) {
        match child {
            Child::Text(run) if run.text.is_empty() => {}
            Child::Text(run) => {
                if let Some(Child::Text(prev)) = merged.last_mut() {
                    if prev.marks == run.marks {
                        prev.text.push_str(&run.text);
                        continue;
                    }
                }
                merged.push(Child::Text(run));
            }
            node => merged.push(node),
        }
    }

    *children = merged;
}

/// Canonical copy of `node` for comparison
pub fn normalized(node: &Node) -> Node {
    let mut copy = node.clone();
    Normalizer.visit_node_mut(&mut copy);
    copy
}

pub fn equivalent(a: &Node, b: &Node) -> bool {
    normalized(a) == normalized(b)
}
