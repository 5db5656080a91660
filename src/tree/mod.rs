//! Lazy tree projection of a PDF object graph.
//!
//! The object graph of a PDF is shared and may be cyclic. This module maps it
//! onto navigable trees without copying it:
//!
//! - [`NodeStore`] registers exactly one node per object identity
//! - [`TreeNodeFactory`] expands nodes one level at a time on demand
//! - [`TreeProjection`] owns the store, the trailer node and the named
//!   sub-roots (pages, outlines, form)
//! - [`TreeView`] keeps per-view selection state and finds paths to a node
//!   from its own root
//!
//! All views of one document share a single projection, so selecting an
//! object in one view can be forwarded to any other view that reaches it.

pub mod factory;
pub mod node;
pub mod projection;
pub mod render;
pub mod store;
pub mod view;

pub use factory::TreeNodeFactory;
pub use node::{ChildEdge, ChildKey, DocumentNode, Identity, NodeId, NodeKind, NodeRole, PlaceholderReason};
pub use projection::TreeProjection;
pub use render::{render_outline, snapshot, NodeSnapshot};
pub use store::NodeStore;
pub use view::{find_path, NodeSelector, TreePath, TreeView, ViewRoot};
