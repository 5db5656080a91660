//! Tree projection of one open document.
//!
//! [`TreeProjection`] owns the [`NodeStore`] together with the document-wide
//! trailer node and the named sub-roots resolved from the catalog. Replacing
//! the document resets everything at once, so no node of the previous
//! document can be reached afterwards.

use super::factory::TreeNodeFactory;
use super::node::{ChildEdge, DocumentNode, NodeId, NodeKind, NodeRole};
use super::store::NodeStore;
use crate::error::{Error, Result};
use crate::object::{Dict, Object};

/// Projection of a document's object graph onto a navigable tree.
///
/// # Example
///
/// ```
/// use pdf_rups::graph::MemoryGraph;
/// use pdf_rups::object::{Dict, Object};
/// use pdf_rups::tree::{TreeNodeFactory, TreeProjection};
///
/// let mut graph = MemoryGraph::new();
/// let pages = graph.add(Object::Dictionary(Dict::new()));
/// let mut catalog = Dict::new();
/// catalog.insert("Pages".to_string(), Object::Reference(pages));
/// let root = graph.add(Object::Dictionary(catalog));
/// graph.set_trailer_entry("Root", Object::Reference(root));
///
/// let trailer = pdf_rups::graph::ObjectGraph::trailer(&graph).clone();
/// let factory = TreeNodeFactory::new(graph);
/// let mut projection = TreeProjection::new("memory");
/// projection.bind_root(&factory, trailer)?;
/// assert!(projection.pages_root().is_some());
/// assert!(projection.outline_root().is_none());
/// # Ok::<(), pdf_rups::error::Error>(())
/// ```
#[derive(Debug)]
pub struct TreeProjection {
    store: NodeStore,
    root: NodeId,
    catalog: Option<NodeId>,
    pages: Option<NodeId>,
    outlines: Option<NodeId>,
    form: Option<NodeId>,
}

impl TreeProjection {
    /// Create a projection with an unbound trailer node labelled `label`.
    pub fn new(label: impl Into<String>) -> Self {
        let mut store = NodeStore::new();
        let root = Self::create_trailer(&mut store, label.into());
        Self {
            store,
            root,
            catalog: None,
            pages: None,
            outlines: None,
            form: None,
        }
    }

    fn create_trailer(store: &mut NodeStore, label: String) -> NodeId {
        let root = store.create_direct(Object::Dictionary(Dict::new()));
        if let Some(node) = store.get_mut(root) {
            node.role = NodeRole::Trailer;
            node.label = Some(label);
        }
        root
    }

    /// Discard the whole projection and start over with a fresh trailer node.
    ///
    /// All sub-roots become `None` until [`bind_root`](Self::bind_root) runs again.
    pub fn reset_root(&mut self, label: impl Into<String>) {
        self.store.reset();
        self.root = Self::create_trailer(&mut self.store, label.into());
        self.catalog = None;
        self.pages = None;
        self.outlines = None;
        self.form = None;
    }

    /// Bind a trailer onto the root node and resolve the catalog and sub-roots.
    ///
    /// Absent sub-roots stay `None`. Binding again replaces the trailer value
    /// and re-resolves from scratch. Indirect nodes are reused through the
    /// store, and so are direct trailer entries whose value is unchanged. A
    /// direct entry whose value changed gets a new node; the old one stays in
    /// the store, detached, until [`reset_root`](Self::reset_root).
    pub fn bind_root(&mut self, factory: &TreeNodeFactory, trailer: Dict) -> Result<()> {
        let root = self.root;
        let node = self
            .store
            .get_mut(root)
            .ok_or_else(|| Error::Unreachable("trailer node is not in the store".to_string()))?;
        node.kind = NodeKind::Dictionary;
        node.value = Some(Object::Dictionary(trailer));
        node.expanded = false;
        let previous = std::mem::take(&mut node.children);

        factory.expand_reusing(&mut self.store, root, &previous)?;
        self.catalog = optional(factory.get_child_node(&mut self.store, root, "Root"))?;
        self.pages = None;
        self.outlines = None;
        self.form = None;

        if let Some(catalog) = self.catalog {
            self.pages = optional(factory.get_child_node(&mut self.store, catalog, "Pages"))?;
            self.outlines = optional(factory.get_child_node(&mut self.store, catalog, "Outlines"))?;
            self.form = optional(factory.get_child_node(&mut self.store, catalog, "AcroForm"))?;
        } else {
            log::warn!("Trailer has no /Root entry");
        }

        log::debug!(
            "Bound trailer: catalog={} pages={} outlines={} form={}",
            self.catalog.is_some(),
            self.pages.is_some(),
            self.outlines.is_some(),
            self.form.is_some()
        );
        Ok(())
    }

    /// The document-wide trailer node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The catalog node, if the trailer names one.
    pub fn catalog(&self) -> Option<NodeId> {
        self.catalog
    }

    /// Root of the page tree.
    pub fn pages_root(&self) -> Option<NodeId> {
        self.pages
    }

    /// Root of the outline tree.
    pub fn outline_root(&self) -> Option<NodeId> {
        self.outlines
    }

    /// The interactive form dictionary.
    pub fn form_root(&self) -> Option<NodeId> {
        self.form
    }

    /// The canonical node store.
    pub fn store(&self) -> &NodeStore {
        &self.store
    }

    pub(crate) fn store_mut(&mut self) -> &mut NodeStore {
        &mut self.store
    }

    /// Borrow a node of this projection.
    pub fn node(&self, id: NodeId) -> Option<&DocumentNode> {
        self.store.get(id)
    }

    /// Expand a node of this projection one level.
    pub fn expand(&mut self, factory: &TreeNodeFactory, id: NodeId) -> Result<Vec<ChildEdge>> {
        factory.expand_node(&mut self.store, id)
    }

    /// Child of `parent` under dictionary key `key`.
    pub fn child(&mut self, factory: &TreeNodeFactory, parent: NodeId, key: &str) -> Result<NodeId> {
        factory.get_child_node(&mut self.store, parent, key)
    }

    /// Label of the document this projection belongs to.
    pub fn label(&self) -> Option<&str> {
        self.store.get(self.root).and_then(|n| n.label())
    }

    /// Change the label carried by the trailer node.
    pub fn set_label(&mut self, label: impl Into<String>) {
        if let Some(node) = self.store.get_mut(self.root) {
            node.label = Some(label.into());
        }
    }
}

fn optional(result: Result<NodeId>) -> Result<Option<NodeId>> {
    match result {
        Ok(id) => Ok(Some(id)),
        Err(Error::NotFound { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{MemoryGraph, ObjectGraph};
    use crate::object::ObjectRef;

    fn dict(entries: Vec<(&str, Object)>) -> Object {
        Object::Dictionary(entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect::<Dict>())
    }

    fn r(id: u32) -> Object {
        Object::Reference(ObjectRef::new(id, 0))
    }

    fn sample_graph() -> MemoryGraph {
        let mut graph = MemoryGraph::new();
        graph.insert(
            ObjectRef::new(1, 0),
            dict(vec![
                ("Type", Object::Name("Catalog".to_string())),
                ("Pages", r(5)),
                ("Outlines", r(9)),
            ]),
        );
        graph.insert(
            ObjectRef::new(5, 0),
            dict(vec![
                ("Type", Object::Name("Pages".to_string())),
                ("Kids", Object::Array(vec![r(6), r(7)])),
                ("Count", Object::Integer(2)),
            ]),
        );
        graph.insert(ObjectRef::new(6, 0), dict(vec![("Parent", r(5))]));
        graph.insert(ObjectRef::new(7, 0), dict(vec![("Parent", r(5))]));
        graph.insert(ObjectRef::new(9, 0), dict(vec![("Count", Object::Integer(0))]));
        graph.set_trailer_entry("Size", Object::Integer(10));
        graph.set_trailer_entry("Root", r(1));
        graph
    }

    fn bound() -> (TreeNodeFactory, TreeProjection) {
        let graph = sample_graph();
        let trailer = graph.trailer().clone();
        let factory = TreeNodeFactory::new(graph);
        let mut projection = TreeProjection::new("sample.pdf");
        projection.bind_root(&factory, trailer).unwrap();
        (factory, projection)
    }

    #[test]
    fn test_new_projection_is_unbound() {
        let projection = TreeProjection::new("empty");
        assert_eq!(projection.label(), Some("empty"));
        assert_eq!(projection.node(projection.root()).unwrap().role(), NodeRole::Trailer);
        assert!(projection.catalog().is_none());
        assert!(projection.pages_root().is_none());
    }

    #[test]
    fn test_bind_resolves_sub_roots() {
        let (_, projection) = bound();
        let pages = projection.pages_root().unwrap();
        let outlines = projection.outline_root().unwrap();
        assert!(projection.form_root().is_none());

        let pages_node = projection.node(pages).unwrap();
        assert_eq!(pages_node.object_ref(), Some(ObjectRef::new(5, 0)));
        assert_eq!(pages_node.role(), NodeRole::Pages);
        assert!(!pages_node.is_expanded());
        assert_eq!(
            projection.node(outlines).unwrap().object_ref(),
            Some(ObjectRef::new(9, 0))
        );
        assert_eq!(
            projection.node(projection.catalog().unwrap()).unwrap().role(),
            NodeRole::Catalog
        );
    }

    #[test]
    fn test_pages_root_expands_into_its_pages() {
        let (factory, mut projection) = bound();
        let pages = projection.pages_root().unwrap();
        let refs: Vec<Option<ObjectRef>> = projection
            .expand(&factory, pages)
            .unwrap()
            .iter()
            .map(|e| projection.node(e.node).and_then(|n| n.object_ref()))
            .collect();
        assert_eq!(refs, vec![Some(ObjectRef::new(6, 0)), Some(ObjectRef::new(7, 0))]);
        assert!(matches!(
            projection.child(&factory, pages, "Kids"),
            Err(Error::NotFound { .. })
        ));
    }

    #[test]
    fn test_reset_root_isolates_previous_document() {
        let (_, mut projection) = bound();
        let old_pages = projection.pages_root().unwrap();
        projection.reset_root("other.pdf");

        assert!(projection.pages_root().is_none());
        assert!(projection.outline_root().is_none());
        assert!(projection.catalog().is_none());
        assert!(projection.node(old_pages).is_none());
        assert!(projection.store().lookup(ObjectRef::new(5, 0)).is_none());
        assert_eq!(projection.label(), Some("other.pdf"));
    }

    #[test]
    fn test_missing_root_leaves_sub_roots_none() {
        let factory = TreeNodeFactory::new(MemoryGraph::new());
        let mut projection = TreeProjection::new("bare");
        projection.bind_root(&factory, Dict::new()).unwrap();
        assert!(projection.catalog().is_none());
        assert!(projection.pages_root().is_none());
    }

    #[test]
    fn test_rebind_reuses_nodes() {
        let (factory, mut projection) = bound();
        let pages = projection.pages_root();
        let before = projection.expand(&factory, projection.root()).unwrap();
        let count = projection.store().len();

        let trailer = factory.graph().trailer().clone();
        projection.bind_root(&factory, trailer).unwrap();
        assert_eq!(projection.pages_root(), pages);
        assert_eq!(projection.expand(&factory, projection.root()).unwrap(), before);
        assert_eq!(projection.store().len(), count);
    }

    #[test]
    fn test_rebind_with_changed_entry_replaces_only_that_child() {
        let (factory, mut projection) = bound();
        let before = projection.expand(&factory, projection.root()).unwrap();
        let count = projection.store().len();

        let mut trailer = factory.graph().trailer().clone();
        trailer.insert("Size".to_string(), Object::Integer(11));
        projection.bind_root(&factory, trailer).unwrap();

        let after = projection.expand(&factory, projection.root()).unwrap();
        assert_eq!(after[1], before[1]);
        assert_ne!(after[0].node, before[0].node);
        assert_eq!(projection.node(after[0].node).unwrap().value(), Some(&Object::Integer(11)));
        assert_eq!(projection.store().len(), count + 1);
    }
}
