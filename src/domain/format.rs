//! Pretty-print layout: whitespace-only text and tails.

use crate::domain::node::TreeNode;

/// Line terminator of pretty output
pub const LINE_BREAK: &str = "\r\n";
/// Indentation per depth level
pub const INDENT: &str = "  ";

/// Absent or whitespace-only, i.e. free to be replaced by layout.
fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

/// Indent `node` (at depth `level`) and its subtree in place.
///
/// Only absent or whitespace-only text and tails are rewritten.
pub fn indent(node: &mut TreeNode, level: usize) {
    let line = format!("{}{}", LINE_BREAK, INDENT.repeat(level));
    if node.is_leaf() {
        if level > 0 && is_blank(node.tail()) {
            node.set_tail(Some(line));
        }
        return;
    }

    if is_blank(node.text()) {
        node.set_text(Some(format!("{}{}", line, INDENT)));
    }
    if is_blank(node.tail()) {
        node.set_tail(Some(line.clone()));
    }
    for child in node.children_mut() {
        indent(child, level + 1);
    }
    // The last child closes back to this node's indentation
    if let Some(last) = node.children_mut().last_mut() {
        if is_blank(last.tail()) {
            last.set_tail(Some(line));
        }
    }
}

/// Indented copy of `root`, leaving the original untouched.
pub fn pretty(root: &TreeNode) -> TreeNode {
    let mut copy = root.clone();
    indent(&mut copy, 0);
    copy
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::node::Attributes;

    fn sample() -> TreeNode {
        let mut root = TreeNode::new("competition", [("name", "x")]).unwrap();
        let station = root.append_child(TreeNode::new("SIstation", [("Nr", "97")]).unwrap());
        station.append_child(TreeNode::new("SIcard", Attributes::new()).unwrap());
        root
    }

    #[test]
    fn test_indent_assigns_crlf_layout() {
        let tree = pretty(&sample());

        assert_eq!(tree.text(), Some("\r\n  "));
        assert_eq!(tree.tail(), Some("\r\n"));
        let station = &tree.children()[0];
        assert_eq!(station.text(), Some("\r\n    "));
        assert_eq!(station.tail(), Some("\r\n"));
        assert_eq!(station.children()[0].tail(), Some("\r\n  "));
    }

    #[test]
    fn test_meaningful_text_is_kept() {
        let mut tree = sample();
        tree.children_mut()[0].set_text(Some("keep".into()));
        indent(&mut tree, 0);
        assert_eq!(tree.children()[0].text(), Some("keep"));
    }

    #[test]
    fn test_root_leaf_gets_no_tail() {
        let tree = pretty(&TreeNode::new("competition", Attributes::new()).unwrap());
        assert_eq!(tree.tail(), None);
        assert_eq!(tree.text(), None);
    }

    #[test]
    fn test_indent_is_stable() {
        let once = pretty(&sample());
        assert_eq!(pretty(&once), once);
    }
}
