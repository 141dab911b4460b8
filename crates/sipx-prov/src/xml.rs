//! Element tree on top of quick-xml, used to read and write PREMIS.
//!
//! The tree keeps what a PREMIS file can carry beyond the records this crate
//! models: qualified names, attributes and unknown elements all survive a
//! read followed by a write.

use crate::error::{PremisError, PremisResult};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::io::{self, BufRead};

/// An element with its qualified name, attributes, text and child elements.
///
/// Text is kept exactly for elements without children. Whitespace between
/// child elements is layout and is dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Node {
    /// Name as written, e.g. `premis:object`
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// The name without its namespace prefix.
    pub fn local_name(&self) -> &str {
        match self.name.split_once(':') {
            Some((_, local)) => local,
            None => &self.name,
        }
    }

    pub fn prefix(&self) -> Option<&str> {
        self.name.split_once(':').map(|(prefix, _)| prefix)
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    /// First child with this local name.
    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|child| child.local_name() == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.children
            .iter()
            .filter(move |child| child.local_name() == name)
    }

    /// Text of the descendant at `path` (local names), or an empty string.
    pub fn text_at(&self, path: &[&str]) -> String {
        let mut node = self;
        for name in path {
            match node.child(name) {
                Some(child) => node = child,
                None => return String::new(),
            }
        }
        node.text.clone()
    }
}

/// Read the root element of a document. Returns `None` for a document
/// without any element.
pub(crate) fn read_tree<R: BufRead>(source: R) -> PremisResult<Option<Node>> {
    let mut reader = Reader::from_reader(source);

    let mut stack: Vec<Node> = Vec::new();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(start) => stack.push(node_for(&start)?),
            Event::Empty(start) => {
                let node = node_for(&start)?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(node),
                    None => return Ok(Some(node)),
                }
            }
            Event::End(_) => {
                if let Some(mut node) = stack.pop() {
                    if !node.children.is_empty() && node.text.trim().is_empty() {
                        node.text.clear();
                    }
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(node),
                        None => return Ok(Some(node)),
                    }
                }
            }
            Event::Text(text) => {
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&text.unescape()?);
                }
            }
            Event::CData(data) => {
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::Eof => {
                return match stack.first() {
                    Some(node) => Err(PremisError::Truncated(node.name.clone())),
                    None => Ok(None),
                };
            }
            _ => {}
        }
        buf.clear();
    }
}

fn node_for(start: &BytesStart<'_>) -> PremisResult<Node> {
    let mut node = Node::new(String::from_utf8_lossy(start.name().as_ref()));
    for attribute in start.attributes() {
        let attribute = attribute.map_err(quick_xml::Error::from)?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute.unescape_value()?.into_owned();
        node.attributes.push((key, value));
    }
    Ok(node)
}

/// Serialize `root` with an XML declaration, two-space indentation and a
/// trailing newline.
pub(crate) fn write_tree(root: &Node) -> io::Result<Vec<u8>> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    write_node(&mut writer, root)?;
    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    Ok(bytes)
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &Node) -> io::Result<()> {
    let start = BytesStart::new(node.name.as_str()).with_attributes(
        node.attributes
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str())),
    );
    if node.children.is_empty() && node.text.is_empty() {
        return writer.write_event(Event::Empty(start));
    }

    writer.write_event(Event::Start(start))?;
    if !node.text.is_empty() {
        writer.write_event(Event::Text(BytesText::new(&node.text)))?;
    }
    for child in &node.children {
        write_node(writer, child)?;
    }
    writer.write_event(Event::End(BytesEnd::new(node.name.as_str())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_nested_text() {
        let source = r#"<p:a xmlns:p="urn:x"><p:b><p:c>one &amp; two</p:c></p:b><p:d/></p:a>"#;
        let root = read_tree(source.as_bytes()).unwrap().unwrap();
        assert_eq!(root.name, "p:a");
        assert_eq!(root.local_name(), "a");
        assert_eq!(root.prefix(), Some("p"));
        assert_eq!(root.attribute("xmlns:p"), Some("urn:x"));
        assert_eq!(root.text_at(&["b", "c"]), "one & two");
        assert!(root.child("d").is_some());
        assert_eq!(root.text_at(&["b", "missing"]), "");
    }

    #[test]
    fn leaf_text_is_kept_exactly() {
        let source = "<a>\n  <name> report </name>\n  <note>\n  1. bad header\n</note>\n  <blank>  </blank>\n</a>";
        let root = read_tree(source.as_bytes()).unwrap().unwrap();
        assert_eq!(root.text, "");
        assert_eq!(root.text_at(&["name"]), " report ");
        assert_eq!(root.text_at(&["note"]), "\n  1. bad header\n");
        assert_eq!(root.text_at(&["blank"]), "  ");
    }

    #[test]
    fn empty_input_has_no_root() {
        assert!(read_tree("".as_bytes()).unwrap().is_none());
        assert!(read_tree("<?xml version=\"1.0\"?>".as_bytes())
            .unwrap()
            .is_none());
    }

    #[test]
    fn unclosed_root_is_truncated() {
        let result = read_tree("<premis><object>".as_bytes());
        assert!(matches!(
            result,
            Err(PremisError::Truncated(_)) | Err(PremisError::Xml(_))
        ));
    }

    #[test]
    fn writes_indented_leaves() {
        let root = Node::new("premis:root")
            .with_attribute("version", "3.0")
            .with_child(Node::new("premis:name").with_text("a<b"))
            .with_child(Node::new("premis:padded").with_text(" x \n"))
            .with_child(Node::new("premis:empty"));
        let xml = String::from_utf8(write_tree(&root).unwrap()).unwrap();

        assert_eq!(
            xml,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <premis:root version=\"3.0\">\n  \
             <premis:name>a&lt;b</premis:name>\n  \
             <premis:padded> x \n</premis:padded>\n  \
             <premis:empty/>\n\
             </premis:root>\n"
        );
    }

    #[test]
    fn written_tree_reads_back_equal() {
        let root = Node::new("x:root")
            .with_attribute("xmlns:x", "urn:x")
            .with_child(
                Node::new("x:rights")
                    .with_attribute("kind", "a & b")
                    .with_child(Node::new("x:note").with_text("  spaced  ")),
            )
            .with_child(Node::new("other"));
        let bytes = write_tree(&root).unwrap();
        assert_eq!(read_tree(bytes.as_slice()).unwrap(), Some(root));
    }
}
