//! Node records of a projected document tree.

use crate::object::{Object, ObjectRef};
use serde::Serialize;

/// Non-owning handle to a node in a [`NodeStore`](super::NodeStore).
///
/// The epoch identifies the store generation the node was created in; a
/// handle from a discarded projection never matches a live store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    pub(crate) epoch: u32,
    pub(crate) index: u32,
}

impl NodeId {
    /// Position of the node inside its store.
    pub fn index(&self) -> usize {
        self.index as usize
    }
}

/// What a node stands for in the object graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Identity {
    /// An indirect object, shared by every reference to it
    Indirect(ObjectRef),
    /// A value embedded directly in its parent
    Direct,
}

/// Why a node carries no value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceholderReason {
    /// Registered but not loaded yet
    Unresolved,
    /// The object number is absent from the cross-reference table
    Dangling,
    /// The value could not be read or has no recognized kind
    Unsupported(String),
}

/// Value kind of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Dictionary value
    Dictionary,
    /// Array value
    Array,
    /// Stream value (children are its dictionary entries)
    Stream,
    /// Leaf value
    Primitive,
    /// No value available
    Placeholder(PlaceholderReason),
}

impl NodeKind {
    /// Kind of a loaded object.
    pub fn of(obj: &Object) -> Self {
        match obj {
            Object::Dictionary(_) => NodeKind::Dictionary,
            Object::Array(_) => NodeKind::Array,
            Object::Stream { .. } => NodeKind::Stream,
            Object::Reference(r) => {
                NodeKind::Placeholder(PlaceholderReason::Unsupported(format!("reference to {}", r)))
            },
            _ => NodeKind::Primitive,
        }
    }

    /// Whether expansion can produce children for this kind.
    pub fn is_container(&self) -> bool {
        matches!(self, NodeKind::Dictionary | NodeKind::Array | NodeKind::Stream)
    }
}

/// Structural role a node plays in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NodeRole {
    /// Document-wide root holding the trailer
    Trailer,
    /// The catalog dictionary
    Catalog,
    /// Root of the page tree
    Pages,
    /// Root of the outline tree
    Outlines,
    /// The interactive form dictionary
    Form,
    /// Anything else
    Generic,
}

impl NodeRole {
    /// Role recognized for a dictionary key, if any.
    pub fn for_key(key: &str) -> Option<Self> {
        match key {
            "Root" => Some(NodeRole::Catalog),
            "Pages" => Some(NodeRole::Pages),
            "Outlines" => Some(NodeRole::Outlines),
            "AcroForm" => Some(NodeRole::Form),
            _ => None,
        }
    }
}

/// Key under which a child hangs from its parent.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChildKey {
    /// Dictionary entry name
    Name(String),
    /// Array position
    Index(usize),
}

impl std::fmt::Display for ChildKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChildKey::Name(name) => write!(f, "/{}", name),
            ChildKey::Index(i) => write!(f, "[{}]", i),
        }
    }
}

/// Edge from a parent to one of its children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildEdge {
    /// Key in the parent
    pub key: ChildKey,
    /// The child node
    pub node: NodeId,
}

/// One resolved position in the object graph.
#[derive(Debug, Clone)]
pub struct DocumentNode {
    pub(crate) id: NodeId,
    pub(crate) identity: Identity,
    pub(crate) kind: NodeKind,
    pub(crate) role: NodeRole,
    pub(crate) value: Option<Object>,
    pub(crate) children: Vec<ChildEdge>,
    pub(crate) expanded: bool,
    pub(crate) label: Option<String>,
}

impl DocumentNode {
    pub(crate) fn new(id: NodeId, identity: Identity, kind: NodeKind, value: Option<Object>) -> Self {
        Self {
            id,
            identity,
            kind,
            role: NodeRole::Generic,
            value,
            children: Vec::new(),
            expanded: false,
            label: None,
        }
    }

    /// Handle of this node.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Object identity, or `Direct` for embedded values.
    pub fn identity(&self) -> Identity {
        self.identity
    }

    /// Indirect reference of this node, if it has one.
    pub fn object_ref(&self) -> Option<ObjectRef> {
        match self.identity {
            Identity::Indirect(r) => Some(r),
            Identity::Direct => None,
        }
    }

    /// Value kind.
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Structural role.
    pub fn role(&self) -> NodeRole {
        self.role
    }

    /// Loaded value, absent for placeholders.
    pub fn value(&self) -> Option<&Object> {
        self.value.as_ref()
    }

    /// Children, empty until the node is expanded.
    pub fn children(&self) -> &[ChildEdge] {
        &self.children
    }

    /// Whether the node has been expanded.
    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Document label carried by the trailer node.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// One-line description for display.
    pub fn summary(&self) -> String {
        let body = match (&self.kind, &self.value) {
            (NodeKind::Placeholder(PlaceholderReason::Unresolved), _) => "(unresolved)".to_string(),
            (NodeKind::Placeholder(PlaceholderReason::Dangling), _) => "(dangling)".to_string(),
            (NodeKind::Placeholder(PlaceholderReason::Unsupported(why)), _) => {
                format!("(unsupported: {})", why)
            },
            (_, Some(value)) => value.summary(),
            (_, None) => "(empty)".to_string(),
        };

        match (self.role, self.identity, &self.label) {
            (NodeRole::Trailer, _, Some(label)) => format!("Trailer of {}", label),
            (NodeRole::Trailer, _, None) => "Trailer".to_string(),
            (_, Identity::Indirect(r), _) => format!("{} {}", r, body),
            (_, Identity::Direct, _) => body,
        }
    }
}
