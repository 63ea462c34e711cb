/*!
 * Typed document tree.
 *
 * The word-processing XML is parsed once into a closed set of node kinds:
 * paragraphs and other containers are `Element`s, text-bearing `w:t` leaves are
 * `TextLeaf`s, and everything else (character data between elements, comments,
 * declarations) is carried along untouched so the tree can be written back
 * byte-for-byte apart from the text payloads the pipeline rewrites.
 */

use std::fmt;

/// Tag that marks one paragraph.
pub const PARAGRAPH_TAG: &str = "w:p";

/// Tag of a leaf that holds literal run text.
pub const TEXT_TAG: &str = "w:t";

/// Root element of the main document part.
pub const DOCUMENT_TAG: &str = "w:document";

/// Container of the block-level content.
pub const BODY_TAG: &str = "w:body";

/// Attribute that tells consumers to keep leading and trailing whitespace.
pub const SPACE_ATTR: &str = "xml:space";

/// Raw attribute list, values kept in their escaped XML form.
pub type Attributes = Vec<(String, String)>;

/// Text payload of a leaf.
///
/// Leaves without attributes carry a bare string; leaves with attributes
/// (typically `xml:space="preserve"`) carry the value together with them.
/// Both forms share the same read/write surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextPayload {
    /// `<w:t>text</w:t>`
    Plain(String),
    /// `<w:t xml:space="preserve"> text </w:t>`
    Attributed {
        /// The text content
        value: String,
        /// Attributes of the leaf element
        attrs: Attributes,
    },
}

impl TextPayload {
    /// Build a payload from a parsed leaf, choosing the variant from the attribute set.
    pub fn from_parts(value: String, attrs: Attributes) -> Self {
        if attrs.is_empty() {
            Self::Plain(value)
        } else {
            Self::Attributed { value, attrs }
        }
    }

    /// The text content.
    pub fn text(&self) -> &str {
        match self {
            Self::Plain(value) => value,
            Self::Attributed { value, .. } => value,
        }
    }

    /// Attributes carried by the leaf (empty for plain payloads).
    pub fn attrs(&self) -> &[(String, String)] {
        match self {
            Self::Plain(_) => &[],
            Self::Attributed { attrs, .. } => attrs,
        }
    }

    /// Copy of this payload with the same attributes and a new text value.
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        match self {
            Self::Plain(_) => Self::Plain(text.into()),
            Self::Attributed { attrs, .. } => Self::Attributed {
                value: text.into(),
                attrs: attrs.clone(),
            },
        }
    }

    /// Whether the leaf asks consumers to keep surrounding whitespace.
    pub fn preserves_space(&self) -> bool {
        self.attrs()
            .iter()
            .any(|(key, value)| key == SPACE_ATTR && value == "preserve")
    }

    /// Make sure leading or trailing whitespace in the value survives a round trip.
    ///
    /// Plain payloads are promoted to attributed ones carrying `xml:space="preserve"`.
    pub fn ensure_space_preserved(&mut self) {
        let text = self.text();
        let needs_preserve = text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace);
        if !needs_preserve || self.preserves_space() {
            return;
        }

        match self {
            Self::Plain(value) => {
                *self = Self::Attributed {
                    value: std::mem::take(value),
                    attrs: vec![(SPACE_ATTR.to_string(), "preserve".to_string())],
                };
            }
            Self::Attributed { attrs, .. } => {
                attrs.retain(|(key, _)| key != SPACE_ATTR);
                attrs.push((SPACE_ATTR.to_string(), "preserve".to_string()));
            }
        }
    }
}

/// A text-bearing leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLeaf {
    /// Qualified element name (normally `w:t`)
    pub name: String,
    /// The text payload
    pub payload: TextPayload,
}

impl TextLeaf {
    /// Create a `w:t` leaf with a plain payload.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            name: TEXT_TAG.to_string(),
            payload: TextPayload::Plain(text.into()),
        }
    }

    /// Create a `w:t` leaf that preserves whitespace.
    pub fn preserved(text: impl Into<String>) -> Self {
        Self {
            name: TEXT_TAG.to_string(),
            payload: TextPayload::Attributed {
                value: text.into(),
                attrs: vec![(SPACE_ATTR.to_string(), "preserve".to_string())],
            },
        }
    }

    /// The text content.
    pub fn text(&self) -> &str {
        self.payload.text()
    }

    /// Replace the text, keeping the attributes and preserving edge whitespace.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.payload = self.payload.with_text(text);
        self.payload.ensure_space_preserved();
    }
}

/// Structural role of an element, decided once when the tree is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// A paragraph boundary
    Paragraph,
    /// Any other element
    Container,
}

impl ElementKind {
    /// Classify an element by its qualified name.
    pub fn for_name(name: &str) -> Self {
        if name == PARAGRAPH_TAG {
            Self::Paragraph
        } else {
            Self::Container
        }
    }
}

/// Markup that is carried through unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawMarkup {
    /// `<?xml ...?>`
    Decl {
        version: String,
        encoding: Option<String>,
        standalone: Option<String>,
    },
    /// `<!-- ... -->`
    Comment(String),
    /// `<![CDATA[ ... ]]>`
    CData(String),
    /// `<? ... ?>`
    ProcessingInstruction(String),
    /// `<!DOCTYPE ...>`
    DocType(String),
}

/// A node of the document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A structural element with children
    Element(Element),
    /// A text-bearing leaf
    Text(TextLeaf),
    /// Character data outside any text leaf
    CharData(String),
    /// Markup carried through unchanged
    Raw(RawMarkup),
}

impl Node {
    /// The element inside this node, if it is one.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Mutable access to the element inside this node, if it is one.
    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Self::Element(element) => Some(element),
            _ => None,
        }
    }
}

/// A structural element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Qualified element name
    pub name: String,
    /// Raw attributes
    pub attrs: Attributes,
    /// Structural role
    pub kind: ElementKind,
    /// Child nodes in document order
    pub children: Vec<Node>,
}

impl Element {
    /// Create an element, classifying it by name.
    pub fn new(name: impl Into<String>, attrs: Attributes) -> Self {
        let name = name.into();
        Self {
            kind: ElementKind::for_name(&name),
            name,
            attrs,
            children: Vec::new(),
        }
    }

    /// Append a child node (builder style).
    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Append a child element (builder style).
    pub fn with_element(self, child: Element) -> Self {
        self.with_child(Node::Element(child))
    }

    /// Append a text leaf (builder style).
    pub fn with_text(self, leaf: TextLeaf) -> Self {
        self.with_child(Node::Text(leaf))
    }

    /// Whether this element marks a paragraph.
    pub fn is_paragraph(&self) -> bool {
        self.kind == ElementKind::Paragraph
    }

    /// Position and reference of the first child element with the given name.
    pub fn find_child(&self, name: &str) -> Option<(usize, &Element)> {
        self.children.iter().enumerate().find_map(|(index, child)| match child {
            Node::Element(element) if element.name == name => Some((index, element)),
            _ => None,
        })
    }
}

/// Location of an element as the child indices walked from the root.
///
/// Paths are what the pipeline keeps between reading and rewriting the tree;
/// they stay valid as long as no node is inserted or removed, which the
/// pipeline never does.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    /// Path of the root element.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Path of the `index`-th child of this node.
    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    /// The child indices, outermost first.
    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    /// Number of steps below the root.
    pub fn depth(&self) -> usize {
        self.0.len()
    }
}

impl From<Vec<usize>> for NodePath {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/")?;
        let parts: Vec<String> = self.0.iter().map(|i| i.to_string()).collect();
        write!(f, "{}", parts.join("/"))
    }
}

/// A parsed document part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentTree {
    /// Markup before the root element
    pub prolog: Vec<Node>,
    /// The root element
    pub root: Element,
    /// Markup after the root element
    pub epilog: Vec<Node>,
}

impl DocumentTree {
    /// Wrap a root element without prolog or epilog.
    pub fn new(root: Element) -> Self {
        Self {
            prolog: Vec::new(),
            root,
            epilog: Vec::new(),
        }
    }

    /// Resolve a path to an element.
    pub fn element(&self, path: &NodePath) -> Option<&Element> {
        let mut current = &self.root;
        for &index in path.indices() {
            current = current.children.get(index)?.as_element()?;
        }
        Some(current)
    }

    /// Resolve a path to a mutable element.
    pub fn element_mut(&mut self, path: &NodePath) -> Option<&mut Element> {
        let mut current = &mut self.root;
        for &index in path.indices() {
            current = current.children.get_mut(index)?.as_element_mut()?;
        }
        Some(current)
    }

    /// Path of the element that holds the translatable content.
    ///
    /// For a `w:document` root this is its `w:body`; any other tree is
    /// translated from the root.
    pub fn content_path(&self) -> NodePath {
        if self.root.name == DOCUMENT_TAG {
            if let Some((index, _)) = self.root.find_child(BODY_TAG) {
                return NodePath::root().child(index);
            }
        }
        NodePath::root()
    }
}
