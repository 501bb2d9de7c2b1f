use courseweave_model::{Child, DocumentTree, Node, TextRun};
use serde_json::Value;

/// Visitor pattern for traversing document trees immutably
///
/// Default implementations walk the entire tree. Override specific visit_*
/// methods to act on nodes; call the matching `walk_*` to keep descending.
pub trait Visitor: Sized {
    fn visit_tree(&mut self, tree: &DocumentTree) {
        walk_tree(self, tree);
    }

    fn visit_node(&mut self, node: &Node) {
        walk_node(self, node);
    }

    fn visit_attr(&mut self, _node: &Node, _name: &str, _value: &Value) {
        // Leaf, nothing to walk
    }

    fn visit_text(&mut self, _run: &TextRun) {
        // Leaf, nothing to walk
    }
}

/// Mutable visitor pattern for transforming document trees
pub trait VisitorMut: Sized {
    fn visit_tree_mut(&mut self, tree: &mut DocumentTree) {
        walk_tree_mut(self, tree);
    }

    fn visit_node_mut(&mut self, node: &mut Node) {
        walk_node_mut(self, node);
    }

    fn visit_text_mut(&mut self, _run: &mut TextRun) {
        // Leaf, nothing to walk
    }
}

pub fn walk_tree<V: Visitor>(visitor: &mut V, tree: &DocumentTree) {
    for node in &tree.root {
        visitor.visit_node(node);
    }
}

pub fn walk_node<V: Visitor>(visitor: &mut V, node: &Node) {
    for (name, value) in node.content_attrs() {
        visitor.visit_attr(node, name, value);
    }
    for child in &node.children {
        match child {
            Child::Text(run) => visitor.visit_text(run),
            Child::Node(inner) => visitor.visit_node(inner),
        }
    }
}

pub fn walk_tree_mut<V: VisitorMut>(visitor: &mut V, tree: &mut DocumentTree) {
    for node in &mut tree.root {
        visitor.visit_node_mut(node);
    }
}

pub fn walk_node_mut<V: VisitorMut>(visitor: &mut V, node: &mut Node) {
    for child in &mut node.children {
        match child {
            Child::Text(run) => visitor.visit_text_mut(run),
            Child::Node(inner) => visitor.visit_node_mut(inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courseweave_model::NodeKind;

    struct NodeCounter {
        nodes: usize,
        runs: usize,
    }

    impl Visitor for NodeCounter {
        fn visit_node(&mut self, node: &Node) {
            self.nodes += 1;
            walk_node(self, node);
        }

        fn visit_text(&mut self, _run: &TextRun) {
            self.runs += 1;
        }
    }

    struct Shouter;

    impl VisitorMut for Shouter {
        fn visit_text_mut(&mut self, run: &mut TextRun) {
            run.text = run.text.to_uppercase();
        }
    }

    fn sample() -> DocumentTree {
        DocumentTree::from_nodes(vec![
            Node::new(NodeKind::Paragraph).with_text("hello"),
            Node::new(NodeKind::BulletList)
                .with_child(Node::new(NodeKind::ListItem).with_text("a"))
                .with_child(Node::new(NodeKind::ListItem).with_text("b")),
        ])
    }

    #[test]
    fn test_visitor_reaches_nested_nodes() {
        let mut counter = NodeCounter { nodes: 0, runs: 0 };
        counter.visit_tree(&sample());

        assert_eq!(counter.nodes, 4);
        assert_eq!(counter.runs, 3);
    }

    #[test]
    fn test_visitor_mut_rewrites_runs() {
        let mut tree = sample();
        Shouter.visit_tree_mut(&mut tree);

        assert_eq!(tree.root[0].text_content(), "HELLO");
        assert_eq!(tree.root[1].text_content(), "A\nB");
    }
}
