//! Document inspector.
//!
//! [`Inspector`] owns the open document, its tree projection and one
//! [`TreeView`] per [`ViewRoot`]. All views share the projection, so a node
//! selected in one view can be forwarded to every other view that reaches it.

use crate::config::InspectorConfig;
use crate::document::PdfDocument;
use crate::error::{Error, Result};
use crate::graph::ObjectGraph;
use crate::tree::{
    render_outline, snapshot, ChildEdge, NodeId, NodeSelector, NodeSnapshot, TreeNodeFactory, TreePath,
    TreeProjection, TreeView, ViewRoot,
};
use crate::writer::{save_document, WriteOptions};
use std::path::{Path, PathBuf};

/// A loaded document and its projection.
#[derive(Debug)]
struct OpenDocument {
    path: Option<PathBuf>,
    factory: TreeNodeFactory,
    projection: TreeProjection,
}

/// Inspects one PDF document at a time through several tree views.
///
/// # Example
///
/// ```no_run
/// use pdf_rups::inspector::Inspector;
/// use pdf_rups::tree::ViewRoot;
///
/// let mut inspector = Inspector::default();
/// inspector.open("sample.pdf")?;
/// if let Some(pages) = inspector.projection().and_then(|p| p.pages_root()) {
///     inspector.select(ViewRoot::Pages, pages)?;
/// }
/// inspector.save("copy.pdf")?;
/// # Ok::<(), pdf_rups::error::Error>(())
/// ```
#[derive(Debug)]
pub struct Inspector {
    config: InspectorConfig,
    document: Option<OpenDocument>,
    views: [TreeView; 4],
}

impl Default for Inspector {
    fn default() -> Self {
        Self::new(InspectorConfig::default())
    }
}

fn slot(root: ViewRoot) -> usize {
    match root {
        ViewRoot::Document => 0,
        ViewRoot::Pages => 1,
        ViewRoot::Outlines => 2,
        ViewRoot::Form => 3,
    }
}

impl Inspector {
    /// Create an inspector with no document open.
    pub fn new(config: InspectorConfig) -> Self {
        Self {
            config,
            document: None,
            views: ViewRoot::ALL.map(TreeView::new),
        }
    }

    /// The configuration in use.
    pub fn config(&self) -> &InspectorConfig {
        &self.config
    }

    /// Open a PDF file, replacing the current document.
    ///
    /// On failure the previously open document stays open.
    pub fn open(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let doc = PdfDocument::open_with_options(path, self.config.parser)?;
        self.replace(Box::new(doc), path.display().to_string(), Some(path.to_path_buf()))
    }

    /// Load an object graph that is not backed by a file.
    pub fn load(&mut self, graph: impl ObjectGraph + 'static, label: impl Into<String>) -> Result<()> {
        self.replace(Box::new(graph), label.into(), None)
    }

    fn replace(&mut self, graph: Box<dyn ObjectGraph>, label: String, path: Option<PathBuf>) -> Result<()> {
        let trailer = graph.trailer().clone();
        let factory = TreeNodeFactory::from_boxed(graph);
        let mut projection = TreeProjection::new(label);
        projection.bind_root(&factory, trailer)?;

        // Swap only once the new projection is complete
        self.document = Some(OpenDocument {
            path,
            factory,
            projection,
        });
        for view in &mut self.views {
            view.reset();
        }
        log::info!(
            "Opened {}",
            self.label().unwrap_or("document")
        );
        Ok(())
    }

    /// Close the current document.
    pub fn close(&mut self) {
        if let Some(doc) = self.document.take() {
            log::info!("Closed {}", doc.projection.label().unwrap_or("document"));
        }
        for view in &mut self.views {
            view.reset();
        }
    }

    /// Whether a document is open.
    pub fn is_open(&self) -> bool {
        self.document.is_some()
    }

    /// File backing the open document, if any.
    pub fn path(&self) -> Option<&Path> {
        self.document.as_ref().and_then(|d| d.path.as_deref())
    }

    /// Label of the open document.
    pub fn label(&self) -> Option<&str> {
        self.document.as_ref().and_then(|d| d.projection.label())
    }

    /// Projection of the open document.
    pub fn projection(&self) -> Option<&TreeProjection> {
        self.document.as_ref().map(|d| &d.projection)
    }

    /// Resolver of the open document.
    pub fn factory(&self) -> Option<&TreeNodeFactory> {
        self.document.as_ref().map(|d| &d.factory)
    }

    /// State of one view.
    pub fn view(&self, root: ViewRoot) -> &TreeView {
        &self.views[slot(root)]
    }

    /// Mutable state of one view.
    pub fn view_mut(&mut self, root: ViewRoot) -> &mut TreeView {
        &mut self.views[slot(root)]
    }

    fn open_document(&mut self) -> Result<&mut OpenDocument> {
        self.document
            .as_mut()
            .ok_or_else(|| Error::Unreachable("no document is open".to_string()))
    }

    /// Expand a node of the open document one level.
    pub fn expand(&mut self, node: NodeId) -> Result<Vec<ChildEdge>> {
        let doc = self.open_document()?;
        doc.projection.expand(&doc.factory, node)
    }

    /// Select `node` in one view.
    ///
    /// Only nodes reachable through already expanded nodes can be selected;
    /// selecting never adds nodes to the projection.
    pub fn select(&mut self, root: ViewRoot, node: NodeId) -> Result<TreePath> {
        let doc = self
            .document
            .as_ref()
            .ok_or_else(|| Error::Unreachable("no document is open".to_string()))?;
        self.views[slot(root)].select_node(&doc.projection, node)
    }

    /// Select `node` in every view that can reach it.
    ///
    /// Returns the views that now select the node, in [`ViewRoot::ALL`] order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unreachable`] if `node` does not belong to the open
    /// document or no view reaches it.
    pub fn forward_selection(&mut self, node: NodeId) -> Result<Vec<ViewRoot>> {
        let mut selected = Vec::new();
        for root in ViewRoot::ALL {
            match self.select(root, node) {
                Ok(_) => selected.push(root),
                Err(Error::Unreachable(reason)) => {
                    log::debug!("{:?} view skipped: {}", root, reason);
                },
                Err(e) => return Err(e),
            }
        }
        if selected.is_empty() {
            return Err(Error::Unreachable(format!(
                "node {} is not reachable from any view",
                node.index()
            )));
        }
        Ok(selected)
    }

    /// Render the subtree of one view as an indented outline.
    pub fn outline(&mut self, root: ViewRoot, max_depth: usize) -> Result<String> {
        let doc = self.open_document()?;
        let start = root
            .resolve(&doc.projection)
            .ok_or_else(|| Error::Unreachable(format!("the {:?} view has no root", root)))?;
        render_outline(&mut doc.projection, &doc.factory, start, max_depth)
    }

    /// Capture the subtree of one view for serialization.
    pub fn snapshot(&mut self, root: ViewRoot, max_depth: usize) -> Result<NodeSnapshot> {
        let doc = self.open_document()?;
        let start = root
            .resolve(&doc.projection)
            .ok_or_else(|| Error::Unreachable(format!("the {:?} view has no root", root)))?;
        snapshot(&mut doc.projection, &doc.factory, start, max_depth)
    }

    /// Rewrite the open document to `target`.
    ///
    /// On success the document is rebound to `target`; on failure nothing
    /// changes and no file is left at `target`.
    pub fn save(&mut self, target: impl AsRef<Path>) -> Result<()> {
        let target = target.as_ref();
        let options = WriteOptions::from(&self.config);
        let doc = self
            .document
            .as_mut()
            .ok_or_else(|| Error::StructuralFailure("no document is open".to_string()))?;

        save_document(doc.factory.graph(), target, &options)?;
        doc.path = Some(target.to_path_buf());
        doc.projection.set_label(target.display().to_string());
        Ok(())
    }
}
