/*!
 * XML codec for document parts.
 *
 * Parsing builds a [`DocumentTree`] in a single pass over quick-xml events;
 * writing walks the tree and emits the same markup back. Attribute values are
 * kept in their raw escaped form so they survive the round trip unchanged.
 */

use log::trace;
use quick_xml::Reader;
use quick_xml::events::{BytesDecl, BytesStart, Event};

use crate::document::model::{
    Attributes, DocumentTree, Element, Node, RawMarkup, TEXT_TAG, TextLeaf, TextPayload,
};
use crate::errors::DocumentError;

/// A `w:t` element whose closing tag has not been seen yet.
struct OpenLeaf {
    name: String,
    attrs: Attributes,
    text: String,
}

impl OpenLeaf {
    fn finish(self) -> TextLeaf {
        TextLeaf {
            name: self.name,
            payload: TextPayload::from_parts(self.text, self.attrs),
        }
    }
}

/// Accumulates nodes while events are read.
#[derive(Default)]
struct TreeBuilder {
    stack: Vec<Element>,
    prolog: Vec<Node>,
    root: Option<Element>,
    epilog: Vec<Node>,
}

impl TreeBuilder {
    fn attach(&mut self, node: Node) -> Result<(), DocumentError> {
        if let Some(parent) = self.stack.last_mut() {
            parent.children.push(node);
            return Ok(());
        }

        match node {
            Node::Element(element) => {
                if self.root.is_some() {
                    return Err(DocumentError::Structure(format!(
                        "second root element <{}>",
                        element.name
                    )));
                }
                self.root = Some(element);
            }
            other if self.root.is_none() => self.prolog.push(other),
            other => self.epilog.push(other),
        }
        Ok(())
    }

    fn close(&mut self, name: &str) -> Result<(), DocumentError> {
        let element = self
            .stack
            .pop()
            .ok_or_else(|| DocumentError::Xml(format!("unexpected closing tag </{}>", name)))?;
        if element.name != name {
            return Err(DocumentError::Xml(format!(
                "mismatched closing tag: expected </{}>, found </{}>",
                element.name, name
            )));
        }
        self.attach(Node::Element(element))
    }

    fn finish(self) -> Result<DocumentTree, DocumentError> {
        if let Some(open) = self.stack.last() {
            return Err(DocumentError::Xml(format!("unclosed element <{}>", open.name)));
        }
        let root = self
            .root
            .ok_or_else(|| DocumentError::Structure("document has no root element".to_string()))?;
        Ok(DocumentTree {
            prolog: self.prolog,
            root,
            epilog: self.epilog,
        })
    }
}

/// Parse a document part into a tree.
pub fn parse_document(xml_bytes: &[u8]) -> Result<DocumentTree, DocumentError> {
    let mut reader = Reader::from_reader(xml_bytes);
    reader.config_mut().trim_text(false);

    let mut builder = TreeBuilder::default();
    let mut open_leaf: Option<OpenLeaf> = None;
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| DocumentError::Xml(format!("at byte {}: {}", reader.buffer_position(), e)))?;

        match event {
            Event::Eof => break,
            Event::Start(start) => {
                let name = bytes_to_string(start.name().as_ref());
                if let Some(leaf) = &open_leaf {
                    return Err(DocumentError::Structure(format!(
                        "element <{}> inside text leaf <{}>",
                        name, leaf.name
                    )));
                }
                let attrs = collect_attrs(&start)?;
                if name == TEXT_TAG {
                    open_leaf = Some(OpenLeaf { name, attrs, text: String::new() });
                } else {
                    builder.stack.push(Element::new(name, attrs));
                }
            }
            Event::Empty(start) => {
                let name = bytes_to_string(start.name().as_ref());
                if let Some(leaf) = &open_leaf {
                    return Err(DocumentError::Structure(format!(
                        "element <{}> inside text leaf <{}>",
                        name, leaf.name
                    )));
                }
                let attrs = collect_attrs(&start)?;
                let node = if name == TEXT_TAG {
                    Node::Text(OpenLeaf { name, attrs, text: String::new() }.finish())
                } else {
                    Node::Element(Element::new(name, attrs))
                };
                builder.attach(node)?;
            }
            Event::End(end) => {
                let name = bytes_to_string(end.name().as_ref());
                match open_leaf.take() {
                    Some(leaf) if leaf.name == name => builder.attach(Node::Text(leaf.finish()))?,
                    Some(leaf) => {
                        return Err(DocumentError::Xml(format!(
                            "mismatched closing tag: expected </{}>, found </{}>",
                            leaf.name, name
                        )));
                    }
                    None => builder.close(&name)?,
                }
            }
            Event::Text(text) => {
                let text = text
                    .unescape()
                    .map_err(|e| DocumentError::Xml(format!("unescape text: {}", e)))?
                    .into_owned();
                match open_leaf.as_mut() {
                    Some(leaf) => leaf.text.push_str(&text),
                    None => builder.attach(Node::CharData(text))?,
                }
            }
            Event::CData(data) => {
                let text = bytes_to_string(data.into_inner());
                match open_leaf.as_mut() {
                    Some(leaf) => leaf.text.push_str(&text),
                    None => builder.attach(Node::Raw(RawMarkup::CData(text)))?,
                }
            }
            Event::Comment(comment) => {
                let text = bytes_to_string(comment.into_inner());
                builder.attach(Node::Raw(RawMarkup::Comment(text)))?;
            }
            Event::Decl(decl) => {
                let version = bytes_to_string(
                    decl.version().map_err(|e| DocumentError::Xml(format!("decl version: {}", e)))?,
                );
                let encoding = decl
                    .encoding()
                    .map(|r| r.map(bytes_to_string))
                    .transpose()
                    .unwrap_or(None);
                let standalone = decl
                    .standalone()
                    .map(|r| r.map(bytes_to_string))
                    .transpose()
                    .unwrap_or(None);
                builder.attach(Node::Raw(RawMarkup::Decl { version, encoding, standalone }))?;
            }
            Event::PI(pi) => {
                let content = format!(
                    "{}{}",
                    bytes_to_string(pi.target()),
                    bytes_to_string(pi.content())
                );
                builder.attach(Node::Raw(RawMarkup::ProcessingInstruction(content)))?;
            }
            Event::DocType(doctype) => {
                let text = bytes_to_string(doctype.into_inner());
                builder.attach(Node::Raw(RawMarkup::DocType(text)))?;
            }
        }
    }

    if let Some(leaf) = open_leaf {
        return Err(DocumentError::Xml(format!("unclosed text leaf <{}>", leaf.name)));
    }

    let tree = builder.finish()?;
    trace!("Parsed document part with root <{}>", tree.root.name);
    Ok(tree)
}

fn collect_attrs(start: &BytesStart<'_>) -> Result<Attributes, DocumentError> {
    let mut attrs = Attributes::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| DocumentError::Xml(format!("attribute: {}", e)))?;
        // Keep the escaped bytes; unescaping character references such as
        // `&#13;&#10;` and writing them back would normalise them to spaces.
        attrs.push((bytes_to_string(attr.key.as_ref()), bytes_to_string(attr.value.as_ref())));
    }
    Ok(attrs)
}

fn bytes_to_string(bytes: impl AsRef<[u8]>) -> String {
    String::from_utf8_lossy(bytes.as_ref()).into_owned()
}

/// Serialize a tree back to XML bytes.
pub fn write_document(tree: &DocumentTree) -> Result<Vec<u8>, DocumentError> {
    let mut out: Vec<u8> = Vec::new();
    for node in &tree.prolog {
        write_node(&mut out, node)?;
    }
    write_element(&mut out, &tree.root)?;
    for node in &tree.epilog {
        write_node(&mut out, node)?;
    }
    Ok(out)
}

fn write_node(out: &mut Vec<u8>, node: &Node) -> Result<(), DocumentError> {
    match node {
        Node::Element(element) => write_element(out, element)?,
        Node::Text(leaf) => {
            write_start(out, &leaf.name, leaf.payload.attrs(), false);
            escape_text_into(out, leaf.text());
            write_end(out, &leaf.name);
        }
        Node::CharData(text) => escape_text_into(out, text),
        Node::Raw(raw) => write_raw(out, raw)?,
    }
    Ok(())
}

fn write_element(out: &mut Vec<u8>, element: &Element) -> Result<(), DocumentError> {
    if element.children.is_empty() {
        write_start(out, &element.name, &element.attrs, true);
        return Ok(());
    }
    write_start(out, &element.name, &element.attrs, false);
    for child in &element.children {
        write_node(out, child)?;
    }
    write_end(out, &element.name);
    Ok(())
}

fn write_raw(out: &mut Vec<u8>, raw: &RawMarkup) -> Result<(), DocumentError> {
    match raw {
        RawMarkup::Decl { version, encoding, standalone } => {
            let decl = BytesDecl::new(version.as_str(), encoding.as_deref(), standalone.as_deref());
            let mut writer = quick_xml::Writer::new(Vec::new());
            writer
                .write_event(Event::Decl(decl))
                .map_err(|e| DocumentError::Xml(format!("write decl: {}", e)))?;
            out.extend_from_slice(&writer.into_inner());
        }
        RawMarkup::Comment(text) => {
            out.extend_from_slice(b"<!--");
            out.extend_from_slice(text.as_bytes());
            out.extend_from_slice(b"-->");
        }
        RawMarkup::CData(text) => {
            out.extend_from_slice(b"<![CDATA[");
            out.extend_from_slice(text.as_bytes());
            out.extend_from_slice(b"]]>");
        }
        RawMarkup::ProcessingInstruction(content) => {
            out.extend_from_slice(b"<?");
            out.extend_from_slice(content.as_bytes());
            out.extend_from_slice(b"?>");
        }
        RawMarkup::DocType(text) => {
            out.extend_from_slice(b"<!DOCTYPE");
            out.extend_from_slice(text.as_bytes());
            out.extend_from_slice(b">");
        }
    }
    Ok(())
}

fn write_start(out: &mut Vec<u8>, name: &str, attrs: &[(String, String)], empty: bool) {
    out.push(b'<');
    out.extend_from_slice(name.as_bytes());
    // Values are already escaped.
    for (key, value) in attrs {
        out.push(b' ');
        out.extend_from_slice(key.as_bytes());
        out.extend_from_slice(b"=\"");
        out.extend_from_slice(value.as_bytes());
        out.push(b'"');
    }
    if empty {
        out.extend_from_slice(b"/>");
    } else {
        out.push(b'>');
    }
}

fn write_end(out: &mut Vec<u8>, name: &str) {
    out.extend_from_slice(b"</");
    out.extend_from_slice(name.as_bytes());
    out.push(b'>');
}

fn escape_text_into(out: &mut Vec<u8>, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.extend_from_slice(b"&amp;"),
            '<' => out.extend_from_slice(b"&lt;"),
            '>' => out.extend_from_slice(b"&gt;"),
            _ => {
                let mut buf = [0u8; 4];
                out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
            }
        }
    }
}
