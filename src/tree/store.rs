//! Canonical node store.
//!
//! An arena of [`DocumentNode`]s plus an identity map from object reference
//! to node. [`NodeStore::get_or_create`] is the only way indirect nodes are
//! produced, so every object identity maps to exactly one node for the life
//! of the store, cyclic references included.

use super::node::{DocumentNode, Identity, NodeId, NodeKind, PlaceholderReason};
use crate::object::{Object, ObjectRef};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_EPOCH: AtomicU32 = AtomicU32::new(1);

fn next_epoch() -> u32 {
    NEXT_EPOCH.fetch_add(1, Ordering::Relaxed)
}

/// Registry of all nodes of one document projection.
#[derive(Debug)]
pub struct NodeStore {
    epoch: u32,
    nodes: Vec<DocumentNode>,
    by_identity: HashMap<ObjectRef, NodeId>,
}

impl Default for NodeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeStore {
    /// Create an empty store with a fresh epoch.
    pub fn new() -> Self {
        Self {
            epoch: next_epoch(),
            nodes: Vec::new(),
            by_identity: HashMap::new(),
        }
    }

    fn push(&mut self, identity: Identity, kind: NodeKind, value: Option<Object>) -> NodeId {
        let id = NodeId {
            epoch: self.epoch,
            index: self.nodes.len() as u32,
        };
        self.nodes.push(DocumentNode::new(id, identity, kind, value));
        id
    }

    /// Return the node for `obj_ref`, registering an unresolved placeholder on first sight.
    pub fn get_or_create(&mut self, obj_ref: ObjectRef) -> NodeId {
        if let Some(&id) = self.by_identity.get(&obj_ref) {
            return id;
        }
        let id = self.push(
            Identity::Indirect(obj_ref),
            NodeKind::Placeholder(PlaceholderReason::Unresolved),
            None,
        );
        self.by_identity.insert(obj_ref, id);
        id
    }

    /// Register a node for a value embedded in its parent.
    pub fn create_direct(&mut self, value: Object) -> NodeId {
        let kind = NodeKind::of(&value);
        self.push(Identity::Direct, kind, Some(value))
    }

    /// Node registered for an identity, without creating one.
    pub fn lookup(&self, obj_ref: ObjectRef) -> Option<NodeId> {
        self.by_identity.get(&obj_ref).copied()
    }

    /// Whether `id` belongs to this store's current projection.
    pub fn contains(&self, id: NodeId) -> bool {
        id.epoch == self.epoch && id.index() < self.nodes.len()
    }

    /// Borrow a node.
    pub fn get(&self, id: NodeId) -> Option<&DocumentNode> {
        if self.contains(id) {
            self.nodes.get(id.index())
        } else {
            None
        }
    }

    /// Mutably borrow a node.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut DocumentNode> {
        if self.contains(id) {
            self.nodes.get_mut(id.index())
        } else {
            None
        }
    }

    /// Discard every node and move to a new epoch.
    pub fn reset(&mut self) {
        log::debug!("Discarding {} nodes", self.nodes.len());
        self.nodes.clear();
        self.by_identity.clear();
        self.epoch = next_epoch();
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the store holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over all nodes in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &DocumentNode> {
        self.nodes.iter()
    }
}
