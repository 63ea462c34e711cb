/*!
 * Document container and tree model.
 *
 * - `model`: typed tree of elements, text leaves and pass-through markup
 * - `xml`: XML codec between part bytes and the tree
 * - `package`: DOCX archive handling
 */

pub mod model;
pub mod package;
pub mod xml;

pub use self::model::{
    Attributes, DocumentTree, Element, ElementKind, Node, NodePath, RawMarkup, TextLeaf,
    TextPayload,
};
pub use self::package::DocxPackage;
pub use self::xml::{parse_document, write_document};
