//! # XML Element Snapshots
//!
//! Read-only view of the remote catalog documents. Parsing is delegated to
//! `xot` and the tree is copied into plain `Element` values, so the catalog
//! can inspect a document without holding on to an arena. Whitespace-only
//! text, comments and processing instructions are dropped.
//!
//! Manifests are not read through this module; they are edited in place by
//! `manifest::ManifestDocument`.

use xot::{Node, Xot};

/// An XML document could not be parsed.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct XmlError(String);

/// An owned XML element with its attributes, text and child elements.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    /// Non-whitespace text content, if any.
    pub text: Option<String>,
    pub children: Vec<Element>,
}

impl Element {
    /// Returns the value of the attribute `name`, if present.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Iterates over the direct children named `name`.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// Returns the first direct child named `name`.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|child| child.name == name)
    }

    /// Returns the trimmed text of the first direct child named `name`.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name)
            .and_then(|child| child.text.as_deref())
            .map(str::trim)
    }
}

/// Parses `xml` and returns its document element.
pub fn parse(xml: &str) -> Result<Element, XmlError> {
    let mut xot = Xot::new();
    let document = xot.parse(xml).map_err(|err| XmlError(err.to_string()))?;
    let root = xot
        .document_element(document)
        .map_err(|err| XmlError(err.to_string()))?;
    Ok(convert(&xot, root))
}

fn convert(xot: &Xot, node: Node) -> Element {
    let name = xot
        .element(node)
        .map(|element| xot.local_name_str(element.name()).to_string())
        .unwrap_or_default();

    let attributes = xot
        .attributes(node)
        .iter()
        .map(|(name, value)| (xot.local_name_str(name).to_string(), value.to_string()))
        .collect();

    let mut text = String::new();
    let mut children = Vec::new();
    for child in xot.children(node) {
        if xot.is_element(child) {
            children.push(convert(xot, child));
        } else if let Some(content) = xot.text_str(child) {
            text.push_str(content);
        }
    }

    Element {
        name,
        attributes,
        text: if text.trim().is_empty() {
            None
        } else {
            Some(text)
        },
        children,
    }
}
