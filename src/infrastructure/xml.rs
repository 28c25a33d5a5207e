//! XML codec and the file-backed [`TreeBackend`].
//!
//! Parsing goes through `roxmltree`. Writing is a small serializer that
//! emits sorted attributes, ` />` for empty elements and the `text`/`tail`
//! layout produced by [`format::indent`].

use std::io;
use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, instrument};

use crate::domain::{format, DomainError, TreeNode};
use crate::infrastructure::traits::{FileSystem, TreeBackend};

pub const XML_DECLARATION: &str = "<?xml version='1.0' encoding='utf-8'?>\n";

#[derive(Error, Debug)]
pub enum XmlError {
    #[error("malformed XML: {0}")]
    Syntax(#[from] roxmltree::Error),

    #[error("{0}")]
    Node(#[from] DomainError),
}

impl From<XmlError> for io::Error {
    fn from(e: XmlError) -> Self {
        io::Error::new(io::ErrorKind::InvalidData, e)
    }
}

/// Parse a document into a tree rooted at its document element.
///
/// Whitespace-only text and tails are layout and are dropped; meaningful
/// mixed content is kept.
pub fn parse_document(input: &str) -> Result<TreeNode, XmlError> {
    let doc = roxmltree::Document::parse(input)?;
    convert(doc.root_element())
}

fn convert(node: roxmltree::Node<'_, '_>) -> Result<TreeNode, XmlError> {
    let mut out = TreeNode::new(
        node.tag_name().name(),
        node.attributes().map(|a| (a.name(), a.value())),
    )?;
    out.set_text(meaningful(node.text()));
    out.set_tail(meaningful(node.tail()));
    for child in node.children().filter(|n| n.is_element()) {
        out.append_child(convert(child)?);
    }
    Ok(out)
}

fn meaningful(value: Option<&str>) -> Option<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(str::to_string)
}

/// Serialize `root` with the XML declaration.
pub fn write_document(root: &TreeNode) -> String {
    let mut out = String::from(XML_DECLARATION);
    write_element(&mut out, root);
    out
}

/// Serialize a single element, its subtree and its tail.
pub fn write_element(out: &mut String, node: &TreeNode) {
    out.push('<');
    out.push_str(node.tag());
    for (key, value) in node.attributes() {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        escape_attribute(out, value);
        out.push('"');
    }

    let text = node.text().filter(|t| !t.is_empty());
    if text.is_none() && node.is_leaf() {
        out.push_str(" />");
    } else {
        out.push('>');
        if let Some(text) = text {
            write_text(out, text);
        }
        for child in node.children() {
            write_element(out, child);
        }
        out.push_str("</");
        out.push_str(node.tag());
        out.push('>');
    }

    if let Some(tail) = node.tail() {
        write_text(out, tail);
    }
}

fn escape_text(out: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            // A raw CR would be normalised to LF by the parser
            '\r' => out.push_str("&#13;"),
            _ => out.push(c),
        }
    }
}

/// Layout whitespace is written raw so pretty output keeps real line breaks.
fn write_text(out: &mut String, value: &str) {
    if value.trim().is_empty() {
        out.push_str(value);
    } else {
        escape_text(out, value);
    }
}

fn escape_attribute(out: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            '\t' => out.push_str("&#09;"),
            _ => out.push(c),
        }
    }
}

/// Stores the tree as a UTF-8 XML file.
pub struct XmlBackend {
    fs: Arc<dyn FileSystem>,
}

impl XmlBackend {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    fn layout(root: &TreeNode, pretty: bool) -> std::borrow::Cow<'_, TreeNode> {
        if pretty {
            std::borrow::Cow::Owned(format::pretty(root))
        } else {
            std::borrow::Cow::Borrowed(root)
        }
    }
}

impl TreeBackend for XmlBackend {
    fn exists(&self, location: &Path) -> bool {
        self.fs.is_file(location)
    }

    #[instrument(level = "debug", skip(self))]
    fn load(&self, location: &Path) -> io::Result<TreeNode> {
        let content = self.fs.read_to_string(location)?;
        let root = parse_document(&content)?;
        debug!(
            nodes = root.descendants().count(),
            depth = root.depth(),
            "loaded tree"
        );
        Ok(root)
    }

    #[instrument(level = "debug", skip(self, root))]
    fn save(&self, location: &Path, root: &TreeNode, pretty: bool) -> io::Result<()> {
        self.fs.ensure_parent(location)?;
        let content = write_document(&Self::layout(root, pretty));
        self.fs.write(location, &content)
    }

    fn render(&self, root: &TreeNode, pretty: bool) -> String {
        let mut out = String::new();
        write_element(&mut out, &Self::layout(root, pretty));
        if !out.ends_with('\n') {
            out.push('\n');
        }
        out
    }
}
