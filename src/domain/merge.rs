//! Idempotent merge-insert of record paths into a tree.
//!
//! At every level the engine takes the first direct child with the same tag
//! and exactly the same attribute map. If the spec carries text and that
//! child's text differs, the match is void. Later siblings are not
//! considered, so a new child is appended. The engine then descends into the sub-records and finally
//! writes the spec's text onto the resolved node.
//!
//! Inserts are not atomic: if a deeper level fails (for example with
//! [`DomainError::MissingTag`]), nodes created at shallower levels stay in
//! the tree. Discard or reload the tree after an error.

use tracing::{instrument, trace};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::node::TreeNode;
use crate::domain::record::{RecordPath, RecordSpec};

/// Ensure `path` exists below `parent`.
///
/// Returns the node resolved for a single spec, or `None` for a fan-out.
/// Empty specs inside a fan-out are skipped.
#[instrument(level = "trace", skip_all, fields(parent = %parent.tag()))]
pub fn insert<'a>(parent: &'a mut TreeNode, path: &RecordPath) -> DomainResult<Option<&'a mut TreeNode>> {
    match path {
        RecordPath::One(spec) => insert_spec(parent, spec).map(Some),
        RecordPath::Many(specs) => {
            for spec in specs.iter().filter(|s| !s.is_empty()) {
                insert_spec(parent, spec)?;
            }
            Ok(None)
        }
    }
}

fn insert_spec<'a>(parent: &'a mut TreeNode, spec: &RecordSpec) -> DomainResult<&'a mut TreeNode> {
    let tag = spec.tag.as_deref().ok_or_else(|| DomainError::MissingTag {
        spec: spec.to_string(),
    })?;

    let idx = match find_match(parent, tag, spec) {
        Some(idx) => {
            trace!(tag, idx, "matched existing node");
            idx
        }
        None => {
            let node = TreeNode::new(tag, spec.attributes.clone())?;
            parent.append_child(node);
            trace!(tag, attributes = ?spec.attributes, "created node");
            parent.len() - 1
        }
    };
    let node = &mut parent.children_mut()[idx];

    match &spec.sub {
        Some(RecordPath::One(sub)) if sub.is_empty() => {}
        Some(sub) => {
            insert(&mut *node, sub)?;
        }
        None => {}
    }

    // Set after descending so it cannot influence matching within this call
    if let Some(text) = &spec.text {
        node.set_text(Some(text.clone()));
    }
    Ok(node)
}

/// First child with the same tag and an equal attribute map, unless its text
/// conflicts with the spec's text.
fn find_match(parent: &TreeNode, tag: &str, spec: &RecordSpec) -> Option<usize> {
    let idx = parent.position_child(tag, |attributes| attributes == &spec.attributes)?;
    match spec.text.as_deref() {
        Some(text) if parent.children()[idx].text() != Some(text) => {
            trace!(tag, idx, "text differs, match void");
            None
        }
        _ => Some(idx),
    }
}
