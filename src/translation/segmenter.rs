/*!
 * Paragraph segmentation.
 *
 * Finds paragraph-boundary elements below a starting element. A captured
 * paragraph is recorded as a whole and its children are not searched again,
 * so paragraphs nested inside it (text boxes, for instance) travel with their
 * outer paragraph.
 */

use crate::document::{DocumentTree, Element, Node, NodePath};

/// Paths of the paragraph elements below `start`, in document order.
///
/// `start` itself is captured if it is a paragraph. A tree without paragraphs
/// yields an empty list.
pub fn segment(tree: &DocumentTree, start: &NodePath) -> Vec<NodePath> {
    let mut paragraphs = Vec::new();
    if let Some(element) = tree.element(start) {
        visit(element, start.clone(), &mut paragraphs);
    }
    paragraphs
}

/// Paths of the paragraphs in the translatable content of a document.
pub fn segment_document(tree: &DocumentTree) -> Vec<NodePath> {
    segment(tree, &tree.content_path())
}

fn visit(element: &Element, path: NodePath, out: &mut Vec<NodePath>) {
    if element.is_paragraph() {
        out.push(path);
        return;
    }
    for (index, child) in element.children.iter().enumerate() {
        if let Node::Element(child) = child {
            visit(child, path.child(index), out);
        }
    }
}
