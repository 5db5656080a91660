//! Per-view selection state.
//!
//! A [`TreeView`] holds no node content, only which root it shows and its
//! own expanded/selected state. Selecting a node computes a fresh path from
//! the view's root, so the same node can be selected in several views at
//! once.
//!
//! Selection never materializes nodes. A path is searched over the children
//! already present in the store, so a node is reachable from a view only
//! through nodes that have been expanded.

use super::node::{ChildEdge, NodeId};
use super::projection::TreeProjection;
use crate::error::{Error, Result};
use std::collections::HashSet;

/// Which node of the projection a view is rooted at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewRoot {
    /// The trailer, showing the whole document
    Document,
    /// The page tree root
    Pages,
    /// The outline root
    Outlines,
    /// The interactive form dictionary
    Form,
}

impl ViewRoot {
    /// Every view root, in display order.
    pub const ALL: [ViewRoot; 4] = [
        ViewRoot::Document,
        ViewRoot::Pages,
        ViewRoot::Outlines,
        ViewRoot::Form,
    ];

    /// The node this root refers to in `projection`, if present.
    pub fn resolve(&self, projection: &TreeProjection) -> Option<NodeId> {
        match self {
            ViewRoot::Document => Some(projection.root()),
            ViewRoot::Pages => projection.pages_root(),
            ViewRoot::Outlines => projection.outline_root(),
            ViewRoot::Form => projection.form_root(),
        }
    }
}

/// Ordered nodes from a view root to a target node, both included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreePath {
    /// Nodes from root to target
    pub nodes: Vec<NodeId>,
}

impl TreePath {
    /// The node the path ends at.
    pub fn target(&self) -> Option<NodeId> {
        self.nodes.last().copied()
    }

    /// Nodes above the target.
    pub fn ancestors(&self) -> &[NodeId] {
        let end = self.nodes.len().saturating_sub(1);
        &self.nodes[..end]
    }

    /// Number of nodes in the path.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the path is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Capability of a view to select a node of the shared projection.
pub trait NodeSelector {
    /// Select `node`, returning the path it was found at.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unreachable`] if `node` is not part of `projection`
    /// or cannot be reached from this view's root through expanded nodes. The
    /// current selection is left unchanged on error.
    fn select_node(&mut self, projection: &TreeProjection, node: NodeId) -> Result<TreePath>;
}

/// A tree view over a shared projection.
#[derive(Debug, Clone)]
pub struct TreeView {
    root: ViewRoot,
    expanded: HashSet<NodeId>,
    selection: Option<TreePath>,
    scroll_target: Option<NodeId>,
}

impl TreeView {
    /// Create a view showing `root`.
    pub fn new(root: ViewRoot) -> Self {
        Self {
            root,
            expanded: HashSet::new(),
            selection: None,
            scroll_target: None,
        }
    }

    /// Which root this view shows.
    pub fn root(&self) -> ViewRoot {
        self.root
    }

    /// Current selection.
    pub fn selection(&self) -> Option<&TreePath> {
        self.selection.as_ref()
    }

    /// Selected node.
    pub fn selected(&self) -> Option<NodeId> {
        self.selection.as_ref().and_then(TreePath::target)
    }

    /// Node the view was last asked to scroll to.
    pub fn scroll_target(&self) -> Option<NodeId> {
        self.scroll_target
    }

    /// Whether the view shows `node` expanded.
    pub fn is_expanded(&self, node: NodeId) -> bool {
        self.expanded.contains(&node)
    }

    /// Mark `node` expanded or collapsed in this view.
    pub fn set_expanded(&mut self, node: NodeId, expanded: bool) {
        if expanded {
            self.expanded.insert(node);
        } else {
            self.expanded.remove(&node);
        }
    }

    /// Forget all per-view state, used when the document is replaced.
    pub fn reset(&mut self) {
        self.expanded.clear();
        self.selection = None;
        self.scroll_target = None;
    }
}

impl NodeSelector for TreeView {
    fn select_node(&mut self, projection: &TreeProjection, node: NodeId) -> Result<TreePath> {
        if !projection.store().contains(node) {
            return Err(Error::Unreachable(format!(
                "node {} does not belong to the open document",
                node.index()
            )));
        }

        let root = self.root.resolve(projection).ok_or_else(|| {
            Error::Unreachable(format!("the {:?} view has no root", self.root))
        })?;

        let path = find_path(projection, root, node).ok_or_else(|| {
            Error::Unreachable(format!(
                "node {} is not reachable from the {:?} view",
                node.index(),
                self.root
            ))
        })?;

        self.expanded.extend(path.ancestors().iter().copied());
        self.selection = Some(path.clone());
        self.scroll_target = Some(node);
        log::debug!("{:?} view selected node {} at depth {}", self.root, node.index(), path.len() - 1);
        Ok(path)
    }
}

/// Depth-first, pre-order search for `target` below `root`.
///
/// Only the children of expanded nodes are followed, in declared order and
/// each node at most once, so the first path found is deterministic, cycles
/// terminate and the store is left untouched.
pub fn find_path(projection: &TreeProjection, root: NodeId, target: NodeId) -> Option<TreePath> {
    if root == target {
        return Some(TreePath { nodes: vec![root] });
    }

    let mut visited = HashSet::new();
    visited.insert(root);
    let mut stack: Vec<(NodeId, &[ChildEdge], usize)> = vec![(root, children(projection, root), 0)];

    while let Some((_, edges, next)) = stack.last_mut() {
        let Some(child) = edges.get(*next).map(|edge| edge.node) else {
            stack.pop();
            continue;
        };
        *next += 1;

        if !visited.insert(child) {
            continue;
        }
        if child == target {
            let mut nodes: Vec<NodeId> = stack.iter().map(|(id, _, _)| *id).collect();
            nodes.push(child);
            return Some(TreePath { nodes });
        }
        stack.push((child, children(projection, child), 0));
    }

    None
}

/// Materialized children of `id`; empty while the node is unexpanded.
fn children(projection: &TreeProjection, id: NodeId) -> &[ChildEdge] {
    match projection.node(id) {
        Some(node) => node.children(),
        None => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{MemoryGraph, ObjectGraph};
    use crate::object::{Dict, Object, ObjectRef};
    use crate::tree::TreeNodeFactory;

    fn dict(entries: Vec<(&str, Object)>) -> Object {
        Object::Dictionary(entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect::<Dict>())
    }

    fn r(id: u32) -> Object {
        Object::Reference(ObjectRef::new(id, 0))
    }

    fn setup() -> (TreeNodeFactory, TreeProjection) {
        let mut graph = MemoryGraph::new();
        graph.insert(ObjectRef::new(1, 0), dict(vec![("Pages", r(2)), ("Outlines", r(4))]));
        graph.insert(
            ObjectRef::new(2, 0),
            dict(vec![("Kids", Object::Array(vec![r(3)])), ("Count", Object::Integer(1))]),
        );
        graph.insert(ObjectRef::new(3, 0), dict(vec![("Parent", r(2))]));
        graph.insert(ObjectRef::new(4, 0), dict(vec![("First", r(5))]));
        graph.insert(ObjectRef::new(5, 0), dict(vec![("Dest", Object::Array(vec![r(3)]))]));
        graph.set_trailer_entry("Root", r(1));

        let trailer = graph.trailer().clone();
        let factory = TreeNodeFactory::new(graph);
        let mut projection = TreeProjection::new("test");
        projection.bind_root(&factory, trailer).unwrap();
        (factory, projection)
    }

    fn node_for(projection: &TreeProjection, id: u32) -> NodeId {
        projection.store().lookup(ObjectRef::new(id, 0)).unwrap()
    }

    #[test]
    fn test_select_in_pages_view() {
        let (factory, mut projection) = setup();
        let mut view = TreeView::new(ViewRoot::Pages);
        let pages = projection.pages_root().unwrap();
        let page = projection.expand(&factory, pages).unwrap()[0].node;
        assert_eq!(page, node_for(&projection, 3));

        let path = view.select_node(&projection, page).unwrap();
        assert_eq!(path.nodes, vec![pages, page]);
        assert_eq!(view.selected(), Some(page));
        assert_eq!(view.scroll_target(), Some(page));
        assert!(view.is_expanded(pages));
        assert!(!view.is_expanded(page));
    }

    #[test]
    fn test_each_view_computes_its_own_path() {
        let (factory, mut projection) = setup();
        let mut pages = TreeView::new(ViewRoot::Pages);
        let mut outlines = TreeView::new(ViewRoot::Outlines);
        let mut document = TreeView::new(ViewRoot::Document);

        projection.expand(&factory, projection.pages_root().unwrap()).unwrap();
        let page = node_for(&projection, 3);

        let in_pages = pages.select_node(&projection, page).unwrap();
        let count = projection.store().len();
        let in_document = document.select_node(&projection, page).unwrap();
        assert_eq!(projection.store().len(), count);
        assert_eq!(
            in_document.nodes,
            vec![
                projection.root(),
                projection.catalog().unwrap(),
                projection.pages_root().unwrap(),
                page
            ]
        );

        // The outline reaches the page only once its items are expanded
        let item = projection.expand(&factory, projection.outline_root().unwrap()).unwrap()[0].node;
        let dest = projection.expand(&factory, item).unwrap()[0].node;
        projection.expand(&factory, dest).unwrap();
        let in_outlines = outlines.select_node(&projection, page).unwrap();

        assert_eq!(in_pages.target(), in_document.target());
        assert_eq!(in_pages.target(), in_outlines.target());
        assert_eq!(in_outlines.nodes, vec![projection.outline_root().unwrap(), item, dest, page]);
    }

    #[test]
    fn test_unexpanded_path_is_unreachable_and_expands_nothing() {
        let (factory, mut projection) = setup();
        let mut outlines = TreeView::new(ViewRoot::Outlines);
        projection.expand(&factory, projection.pages_root().unwrap()).unwrap();
        let page = node_for(&projection, 3);
        let count = projection.store().len();

        assert!(matches!(
            outlines.select_node(&projection, page),
            Err(Error::Unreachable(_))
        ));
        assert_eq!(projection.store().len(), count);
        let outline_root = projection.outline_root().unwrap();
        assert!(!projection.node(outline_root).unwrap().is_expanded());
        assert!(outlines.selection().is_none());
    }

    #[test]
    fn test_foreign_node_is_unreachable_and_keeps_selection() {
        let (_, mut projection) = setup();
        let mut view = TreeView::new(ViewRoot::Document);
        let catalog = projection.catalog().unwrap();
        view.select_node(&projection, catalog).unwrap();

        let stale = projection.pages_root().unwrap();
        projection.reset_root("next");
        let result = view.select_node(&projection, stale);
        assert!(matches!(result, Err(Error::Unreachable(_))));
        assert_eq!(view.selected(), Some(catalog));
    }

    #[test]
    fn test_node_outside_view_root_is_unreachable() {
        let (_, projection) = setup();
        let mut view = TreeView::new(ViewRoot::Pages);
        let outlines = projection.outline_root().unwrap();
        assert!(matches!(
            view.select_node(&projection, outlines),
            Err(Error::Unreachable(_))
        ));
        assert!(view.selection().is_none());
    }

    #[test]
    fn test_view_without_root_is_unreachable() {
        let (_, projection) = setup();
        let mut view = TreeView::new(ViewRoot::Form);
        assert!(matches!(
            view.select_node(&projection, projection.root()),
            Err(Error::Unreachable(_))
        ));
    }

    #[test]
    fn test_find_path_terminates_on_cycles() {
        let mut graph = MemoryGraph::new();
        graph.insert(ObjectRef::new(1, 0), dict(vec![("Next", r(2))]));
        graph.insert(ObjectRef::new(2, 0), dict(vec![("Next", r(1))]));
        let factory = TreeNodeFactory::new(graph);
        let mut projection = TreeProjection::new("cycle");
        let mut other = TreeProjection::new("other");
        let a = factory.resolve_reference(projection.store_mut(), ObjectRef::new(1, 0));
        let b = projection.expand(&factory, a).unwrap()[0].node;
        projection.expand(&factory, b).unwrap();
        let missing = other.store_mut().create_direct(Object::Null);

        assert!(find_path(&projection, a, missing).is_none());
        assert_eq!(find_path(&projection, a, b).unwrap().nodes, vec![a, b]);
    }

    #[test]
    fn test_reset_clears_state() {
        let (_, projection) = setup();
        let mut view = TreeView::new(ViewRoot::Document);
        let catalog = projection.catalog().unwrap();
        view.select_node(&projection, catalog).unwrap();
        view.reset();
        assert!(view.selection().is_none());
        assert!(view.scroll_target().is_none());
        assert!(!view.is_expanded(projection.root()));
    }
}
