//! Text and JSON renderings of a projected tree.
//!
//! Both renderings walk the projection from a given node down to a depth
//! limit, expanding nodes as they go. A child that is already one of its own
//! ancestors is printed once as a back-reference and not descended into.

use super::factory::TreeNodeFactory;
use super::node::{ChildKey, NodeId, NodeKind, NodeRole, PlaceholderReason};
use super::projection::TreeProjection;
use crate::error::{Error, Result};
use serde::Serialize;

/// Serializable copy of a rendered subtree.
#[derive(Debug, Clone, Serialize)]
pub struct NodeSnapshot {
    /// Key under which the node hangs from its parent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Indirect reference, `"N G R"`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
    /// Value kind
    pub kind: String,
    /// Structural role
    pub role: NodeRole,
    /// One-line description
    pub summary: String,
    /// Set when the node repeats one of its ancestors
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub back_reference: bool,
    /// Rendered children
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSnapshot>,
}

impl NodeSnapshot {
    /// Serialize to JSON, pretty-printed unless `compact`.
    pub fn to_json(&self, compact: bool) -> Result<String> {
        let json = if compact {
            serde_json::to_string(self)
        } else {
            serde_json::to_string_pretty(self)
        };
        json.map_err(|e| Error::InvalidPdf(format!("cannot serialize snapshot: {}", e)))
    }
}

fn kind_name(kind: &NodeKind) -> &'static str {
    match kind {
        NodeKind::Dictionary => "dictionary",
        NodeKind::Array => "array",
        NodeKind::Stream => "stream",
        NodeKind::Primitive => "primitive",
        NodeKind::Placeholder(PlaceholderReason::Unresolved) => "unresolved",
        NodeKind::Placeholder(PlaceholderReason::Dangling) => "dangling",
        NodeKind::Placeholder(PlaceholderReason::Unsupported(_)) => "unsupported",
    }
}

/// Render the subtree under `root` as an indented outline, one line per node.
pub fn render_outline(
    projection: &mut TreeProjection,
    factory: &TreeNodeFactory,
    root: NodeId,
    max_depth: usize,
) -> Result<String> {
    let snapshot = snapshot(projection, factory, root, max_depth)?;
    let mut out = String::new();
    write_outline(&snapshot, 0, &mut out);
    Ok(out)
}

fn write_outline(node: &NodeSnapshot, depth: usize, out: &mut String) {
    out.push_str(&"  ".repeat(depth));
    if let Some(key) = &node.key {
        out.push_str(key);
        out.push_str(": ");
    }
    out.push_str(&node.summary);
    if node.back_reference {
        out.push_str(" (back-reference)");
    }
    out.push('\n');

    for child in &node.children {
        write_outline(child, depth + 1, out);
    }
}

/// Capture the subtree under `root` down to `max_depth` levels.
pub fn snapshot(
    projection: &mut TreeProjection,
    factory: &TreeNodeFactory,
    root: NodeId,
    max_depth: usize,
) -> Result<NodeSnapshot> {
    let mut ancestors = Vec::new();
    capture(projection, factory, root, None, 0, max_depth, &mut ancestors)
}

fn capture(
    projection: &mut TreeProjection,
    factory: &TreeNodeFactory,
    id: NodeId,
    key: Option<&ChildKey>,
    depth: usize,
    max_depth: usize,
    ancestors: &mut Vec<NodeId>,
) -> Result<NodeSnapshot> {
    let node = projection
        .node(id)
        .ok_or_else(|| Error::Unreachable(format!("node {} is not in the store", id.index())))?;

    let mut snapshot = NodeSnapshot {
        key: key.map(ToString::to_string),
        object: node.object_ref().map(|r| r.to_string()),
        kind: kind_name(node.kind()).to_string(),
        role: node.role(),
        summary: node.summary(),
        back_reference: ancestors.contains(&id),
        children: Vec::new(),
    };
    if snapshot.back_reference || depth >= max_depth {
        return Ok(snapshot);
    }

    let edges = projection.expand(factory, id)?;
    ancestors.push(id);
    for edge in &edges {
        let child = capture(projection, factory, edge.node, Some(&edge.key), depth + 1, max_depth, ancestors)?;
        snapshot.children.push(child);
    }
    ancestors.pop();
    Ok(snapshot)
}
