//! Object-graph resolver.
//!
//! [`TreeNodeFactory`] turns values of an [`ObjectGraph`] into nodes of a
//! [`NodeStore`]. Expansion is lazy and one level deep: expanding a node
//! creates (or reuses) a node for each of its entries and loads the values of
//! indirect children, but never expands them.
//!
//! Dangling references and unreadable values do not abort expansion; the
//! offending child becomes a placeholder node and its siblings are still
//! resolved.
//!
//! Page tree nodes (role [`NodeRole::Pages`]) expand into their `/Kids`
//! directly, so the children of the pages root are the pages themselves.

use super::node::{ChildEdge, ChildKey, DocumentNode, NodeId, NodeKind, NodeRole, PlaceholderReason};
use super::store::NodeStore;
use crate::error::{Error, Result};
use crate::graph::ObjectGraph;
use crate::object::{Object, ObjectRef};

/// Resolves graph values into canonical nodes.
pub struct TreeNodeFactory {
    graph: Box<dyn ObjectGraph>,
}

impl std::fmt::Debug for TreeNodeFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeNodeFactory")
            .field("objects", &self.graph.object_refs().len())
            .finish()
    }
}

impl TreeNodeFactory {
    /// Create a factory reading from `graph`.
    pub fn new(graph: impl ObjectGraph + 'static) -> Self {
        Self {
            graph: Box::new(graph),
        }
    }

    /// Create a factory from an already boxed graph.
    pub fn from_boxed(graph: Box<dyn ObjectGraph>) -> Self {
        Self { graph }
    }

    /// The underlying object graph.
    pub fn graph(&self) -> &dyn ObjectGraph {
        self.graph.as_ref()
    }

    /// Return the canonical node for `obj_ref`, loading its value on first sight.
    pub fn resolve_reference(&self, store: &mut NodeStore, obj_ref: ObjectRef) -> NodeId {
        let id = store.get_or_create(obj_ref);
        self.load(store, id, obj_ref);
        id
    }

    /// Fill in the value of a node that is still unresolved.
    fn load(&self, store: &mut NodeStore, id: NodeId, obj_ref: ObjectRef) {
        let unresolved = matches!(
            store.get(id).map(|n| n.kind()),
            Some(NodeKind::Placeholder(PlaceholderReason::Unresolved))
        );
        if !unresolved {
            return;
        }

        let (kind, value) = if !self.graph.contains(obj_ref) {
            log::warn!("{}", Error::DanglingReference(obj_ref));
            (NodeKind::Placeholder(PlaceholderReason::Dangling), None)
        } else {
            match self.graph.resolve(obj_ref) {
                Ok(Object::Reference(target)) => {
                    let err = Error::UnsupportedValue(format!("{} resolves to {}", obj_ref, target));
                    log::warn!("{}", err);
                    (NodeKind::Placeholder(PlaceholderReason::Unsupported(err.to_string())), None)
                },
                Ok(obj) => (NodeKind::of(&obj), Some(obj)),
                Err(e) => {
                    log::warn!("Cannot load {}: {}", obj_ref, e);
                    (NodeKind::Placeholder(PlaceholderReason::Unsupported(e.to_string())), None)
                },
            }
        };

        if let Some(node) = store.get_mut(id) {
            node.kind = kind;
            node.value = value;
        }
    }

    /// Expand `id` one level and return its children.
    ///
    /// Expanding an already expanded node returns the existing children
    /// without touching the store.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unreachable`] if `id` does not belong to `store`.
    pub fn expand_node(&self, store: &mut NodeStore, id: NodeId) -> Result<Vec<ChildEdge>> {
        self.expand_reusing(store, id, &[])
    }

    /// Expand `id`, taking direct children from `previous` when an edge with
    /// the same key holds an equal value.
    pub(crate) fn expand_reusing(
        &self,
        store: &mut NodeStore,
        id: NodeId,
        previous: &[ChildEdge],
    ) -> Result<Vec<ChildEdge>> {
        let node = store
            .get(id)
            .ok_or_else(|| Error::Unreachable(format!("node {} is not in the store", id.index())))?;
        if node.is_expanded() {
            return Ok(node.children().to_vec());
        }

        if let Some(obj_ref) = node.object_ref() {
            self.load(store, id, obj_ref);
        }

        let (entries, page_tree) = match store.get(id) {
            Some(node) => (self.entries(node), node.role() == NodeRole::Pages),
            None => (Vec::new(), false),
        };

        let mut children = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            let child = match value {
                Object::Reference(obj_ref) => self.resolve_reference(store, obj_ref),
                other => match reusable(store, previous, &key, &other) {
                    Some(existing) => existing,
                    None => store.create_direct(other),
                },
            };
            if page_tree {
                tag_intermediate_pages(store, child);
            }
            children.push(ChildEdge { key, node: child });
        }

        log::debug!("Expanded node {} into {} children", id.index(), children.len());
        if let Some(node) = store.get_mut(id) {
            node.children = children.clone();
            node.expanded = true;
        }
        Ok(children)
    }

    /// Entries `node` expands into, in declared order.
    ///
    /// A page tree node with a `/Kids` array lists the kids; every other node
    /// lists its dictionary entries or array items.
    fn entries(&self, node: &DocumentNode) -> Vec<(ChildKey, Object)> {
        let Some(value) = node.value() else {
            return Vec::new();
        };
        if node.role() == NodeRole::Pages {
            if let Some(kids) = self.page_kids(value) {
                return kids
                    .into_iter()
                    .enumerate()
                    .map(|(i, kid)| (ChildKey::Index(i), kid))
                    .collect();
            }
        }
        match value {
            Object::Dictionary(dict) | Object::Stream { dict, .. } => dict
                .iter()
                .map(|(k, v)| (ChildKey::Name(k.clone()), v.clone()))
                .collect(),
            Object::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, v)| (ChildKey::Index(i), v.clone()))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// The `/Kids` array of a page tree node, following one indirection.
    fn page_kids(&self, value: &Object) -> Option<Vec<Object>> {
        match value.as_dict()?.get("Kids")? {
            Object::Array(kids) => Some(kids.clone()),
            Object::Reference(obj_ref) => match self.graph.resolve(*obj_ref) {
                Ok(Object::Array(kids)) => Some(kids),
                _ => None,
            },
            _ => None,
        }
    }

    /// Expand `parent` and return the child stored under dictionary key `key`.
    ///
    /// When `key` names a structural sub-root (`Root`, `Pages`, `Outlines`,
    /// `AcroForm`) the child is tagged with the matching [`NodeRole`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the expanded parent has no such key.
    pub fn get_child_node(&self, store: &mut NodeStore, parent: NodeId, key: &str) -> Result<NodeId> {
        let children = self.expand_node(store, parent)?;
        let child = children
            .iter()
            .find(|edge| matches!(&edge.key, ChildKey::Name(name) if name == key))
            .map(|edge| edge.node)
            .ok_or_else(|| Error::NotFound {
                key: key.to_string(),
                node: store
                    .get(parent)
                    .map(|n| n.summary())
                    .unwrap_or_default(),
            })?;

        if let Some(role) = NodeRole::for_key(key) {
            if let Some(node) = store.get_mut(child) {
                if node.role == NodeRole::Generic {
                    node.role = role;
                }
            }
        }
        Ok(child)
    }
}

/// A direct child of `previous` stored under `key` with the same value.
fn reusable(store: &NodeStore, previous: &[ChildEdge], key: &ChildKey, value: &Object) -> Option<NodeId> {
    previous
        .iter()
        .find(|edge| &edge.key == key)
        .map(|edge| edge.node)
        .filter(|&id| {
            store
                .get(id)
                .is_some_and(|node| node.object_ref().is_none() && node.value() == Some(value))
        })
}

/// Kids that are themselves `/Type /Pages` continue the page tree.
fn tag_intermediate_pages(store: &mut NodeStore, id: NodeId) {
    if let Some(node) = store.get_mut(id) {
        let is_pages = node
            .value()
            .and_then(Object::as_dict)
            .and_then(|d| d.get("Type"))
            .and_then(Object::as_name)
            == Some("Pages");
        if is_pages && node.role == NodeRole::Generic {
            node.role = NodeRole::Pages;
        }
    }
}
