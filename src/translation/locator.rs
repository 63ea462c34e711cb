/*!
 * Text-node location.
 *
 * Walks a subtree depth-first in document order and yields every text leaf.
 * Leaves are terminal by construction, so the walk never looks inside one.
 */

use crate::document::{Element, Node, TextLeaf};

/// Text leaves below `element`, in document order.
pub fn locate(element: &Element) -> Vec<&TextLeaf> {
    let mut leaves = Vec::new();
    collect(&element.children, &mut leaves);
    leaves
}

/// Mutable text leaves below `element`, in the same order as [`locate`].
pub fn locate_mut(element: &mut Element) -> Vec<&mut TextLeaf> {
    let mut leaves = Vec::new();
    collect_mut(&mut element.children, &mut leaves);
    leaves
}

/// Concatenated text of every leaf below `element`.
pub fn extract_text(element: &Element) -> String {
    locate(element).into_iter().map(TextLeaf::text).collect()
}

fn collect<'a>(nodes: &'a [Node], out: &mut Vec<&'a TextLeaf>) {
    for node in nodes {
        match node {
            Node::Text(leaf) => out.push(leaf),
            Node::Element(element) => collect(&element.children, out),
            Node::CharData(_) | Node::Raw(_) => {}
        }
    }
}

fn collect_mut<'a>(nodes: &'a mut [Node], out: &mut Vec<&'a mut TextLeaf>) {
    for node in nodes.iter_mut() {
        match node {
            Node::Text(leaf) => out.push(leaf),
            Node::Element(element) => collect_mut(&mut element.children, out),
            Node::CharData(_) | Node::Raw(_) => {}
        }
    }
}
