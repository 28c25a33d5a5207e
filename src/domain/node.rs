//! Owned ordered tree of XML-like elements.

use std::collections::BTreeMap;
use std::fmt;

use crate::domain::error::{DomainError, DomainResult};

/// Attribute map of a node. Key order carries no meaning.
pub type Attributes = BTreeMap<String, String>;

/// Element in the punch tree.
///
/// A node exclusively owns its children, so the structure is always a strict tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    tag: String,
    attributes: Attributes,
    text: Option<String>,
    /// Text following the end tag inside the parent; layout only
    tail: Option<String>,
    children: Vec<TreeNode>,
}

impl TreeNode {
    /// Create a node. Fails with [`DomainError::InvalidNode`] on an empty tag.
    pub fn new<I, K, V>(tag: impl Into<String>, attributes: I) -> DomainResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: ToString,
    {
        let tag = tag.into();
        if tag.is_empty() {
            return Err(DomainError::InvalidNode {
                reason: "tag must not be empty".to_string(),
            });
        }
        Ok(Self {
            tag,
            attributes: attributes
                .into_iter()
                .map(|(k, v)| (k.into(), v.to_string()))
                .collect(),
            text: None,
            tail: None,
            children: Vec::new(),
        })
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn set_text(&mut self, text: Option<String>) {
        self.text = text;
    }

    pub fn tail(&self) -> Option<&str> {
        self.tail.as_deref()
    }

    pub fn set_tail(&mut self, tail: Option<String>) {
        self.tail = tail;
    }

    pub fn children(&self) -> &[TreeNode] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut [TreeNode] {
        &mut self.children
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Append `child` after the existing children and return it.
    pub fn append_child(&mut self, child: TreeNode) -> &mut TreeNode {
        self.children.push(child);
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    /// Index of the first direct child with `tag` whose attributes satisfy `predicate`.
    pub fn position_child<P>(&self, tag: &str, predicate: P) -> Option<usize>
    where
        P: Fn(&Attributes) -> bool,
    {
        self.children
            .iter()
            .position(|c| c.tag == tag && predicate(&c.attributes))
    }

    /// All direct children with `tag`, in document order.
    pub fn children_named<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a TreeNode> + 'a {
        self.children.iter().filter(move |c| c.tag == tag)
    }

    /// Pre-order traversal starting with `self`.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// Number of levels in the tree rooted at `self`, counting `self`.
    pub fn depth(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(TreeNode::depth)
            .max()
            .unwrap_or(0)
    }
}

impl fmt::Display for TreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag)?;
        for (k, v) in &self.attributes {
            write!(f, " {}={:?}", k, v)?;
        }
        if let Some(text) = self.text.as_deref().filter(|t| !t.trim().is_empty()) {
            write!(f, ": {}", text)?;
        }
        Ok(())
    }
}

pub struct Descendants<'a> {
    stack: Vec<&'a TreeNode>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a TreeNode;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        // Push children in reverse order for left-to-right traversal
        for child in current.children.iter().rev() {
            self.stack.push(child);
        }
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(tag: &str, attrs: &[(&str, &str)]) -> TreeNode {
        TreeNode::new(tag, attrs.iter().copied()).unwrap()
    }

    #[test]
    fn test_new_rejects_empty_tag() {
        let err = TreeNode::new("", Attributes::new()).unwrap_err();
        assert!(matches!(err, DomainError::InvalidNode { .. }));
    }

    #[test]
    fn test_attribute_values_are_stringified() {
        let n = TreeNode::new("SIstation", [("Nr", 97)]).unwrap();
        assert_eq!(n.attribute("Nr"), Some("97"));
    }

    #[test]
    fn test_append_preserves_insertion_order() {
        let mut root = node("competition", &[]);
        root.append_child(node("SIstation", &[("Nr", "2")]));
        root.append_child(node("SIstation", &[("Nr", "1")]));
        let order: Vec<_> = root.children().iter().filter_map(|c| c.attribute("Nr")).collect();
        assert_eq!(order, vec!["2", "1"]);
    }

    #[test]
    fn test_position_child_returns_first_match() {
        let mut root = node("competition", &[]);
        root.append_child(node("SIcard", &[("Nr", "1")]));
        root.append_child(node("SIstation", &[("Nr", "1")])).set_text(Some("a".into()));
        root.append_child(node("SIstation", &[("Nr", "1")])).set_text(Some("b".into()));

        let idx = root
            .position_child("SIstation", |a| a.get("Nr").map(String::as_str) == Some("1"))
            .unwrap();
        assert_eq!(idx, 1);
        assert_eq!(root.children()[idx].text(), Some("a"));
        assert!(root.position_child("Punch", |_| true).is_none());
    }

    #[test]
    fn test_descendants_are_preorder() {
        let mut root = node("a", &[]);
        let b = root.append_child(node("b", &[]));
        b.append_child(node("c", &[]));
        root.append_child(node("d", &[]));

        let tags: Vec<_> = root.descendants().map(TreeNode::tag).collect();
        assert_eq!(tags, vec!["a", "b", "c", "d"]);
        assert_eq!(root.depth(), 3);
    }
}
