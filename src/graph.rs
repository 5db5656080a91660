//! Object-graph accessor.
//!
//! [`ObjectGraph`] is the narrow view of a parsed document the tree layer
//! consumes: look up an indirect object, test whether its number is in the
//! cross-reference table, and enumerate objects for rewriting.

use crate::error::{Error, Result};
use crate::object::{Dict, Object, ObjectRef};
use std::collections::BTreeMap;

/// Read access to a parsed document's object graph.
pub trait ObjectGraph {
    /// The trailer dictionary anchoring the catalog.
    fn trailer(&self) -> &Dict;

    /// Whether an in-use object with this number is in the cross-reference table.
    fn contains(&self, obj_ref: ObjectRef) -> bool;

    /// Load the object behind an indirect reference.
    fn resolve(&self, obj_ref: ObjectRef) -> Result<Object>;

    /// All in-use object references, ascending by object number.
    fn object_refs(&self) -> Vec<ObjectRef>;
}

/// An object graph held entirely in memory.
///
/// ```
/// use pdf_rups::graph::{MemoryGraph, ObjectGraph};
/// use pdf_rups::object::{Object, ObjectRef};
///
/// let mut graph = MemoryGraph::new();
/// let catalog = graph.add(Object::Dictionary(Default::default()));
/// graph.set_trailer_entry("Root", Object::Reference(catalog));
/// assert!(graph.contains(catalog));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryGraph {
    objects: BTreeMap<u32, (u16, Object)>,
    trailer: Dict,
}

impl MemoryGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an object under an explicit identity.
    pub fn insert(&mut self, obj_ref: ObjectRef, obj: Object) {
        self.objects.insert(obj_ref.id, (obj_ref.gen, obj));
    }

    /// Add an object under the next free object number.
    pub fn add(&mut self, obj: Object) -> ObjectRef {
        let id = self.objects.keys().next_back().map_or(1, |last| last + 1);
        let obj_ref = ObjectRef::new(id, 0);
        self.insert(obj_ref, obj);
        obj_ref
    }

    /// Set one trailer entry.
    pub fn set_trailer_entry(&mut self, key: impl Into<String>, value: Object) {
        self.trailer.insert(key.into(), value);
    }

    /// Replace the whole trailer.
    pub fn set_trailer(&mut self, trailer: Dict) {
        self.trailer = trailer;
    }

    /// Number of objects in the graph.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the graph holds no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl ObjectGraph for MemoryGraph {
    fn trailer(&self) -> &Dict {
        &self.trailer
    }

    fn contains(&self, obj_ref: ObjectRef) -> bool {
        self.objects.contains_key(&obj_ref.id)
    }

    fn resolve(&self, obj_ref: ObjectRef) -> Result<Object> {
        match self.objects.get(&obj_ref.id) {
            Some((gen, obj)) if *gen == obj_ref.gen => Ok(obj.clone()),
            _ => Err(Error::ObjectNotFound(obj_ref.id, obj_ref.gen)),
        }
    }

    fn object_refs(&self) -> Vec<ObjectRef> {
        self.objects
            .iter()
            .map(|(&id, (gen, _))| ObjectRef::new(id, *gen))
            .collect()
    }
}
