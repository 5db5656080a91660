//! Tree projection over shared and cyclic object graphs.

use pdf_rups::error::Error;
use pdf_rups::graph::{MemoryGraph, ObjectGraph};
use pdf_rups::inspector::Inspector;
use pdf_rups::object::{Dict, Object, ObjectRef};
use pdf_rups::tree::{
    ChildKey, NodeKind, NodeRole, NodeSelector, PlaceholderReason, TreeNodeFactory, TreeProjection,
    TreeView, ViewRoot,
};
use proptest::prelude::*;

fn dict(entries: Vec<(&str, Object)>) -> Object {
    Object::Dictionary(entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect::<Dict>())
}

fn r(id: u32) -> Object {
    Object::Reference(ObjectRef::new(id, 0))
}

fn name(n: &str) -> Object {
    Object::Name(n.to_string())
}

/// Catalog with pages (5,0) holding kids (6,0), (7,0) and outlines (9,0).
fn scenario_graph() -> MemoryGraph {
    let mut graph = MemoryGraph::new();
    add_scenario_objects(&mut graph);
    graph.set_trailer_entry("Size", Object::Integer(10));
    graph.set_trailer_entry("Root", r(1));
    graph
}

/// The same document with an `/Info` dictionary listed before `/Root`.
fn scenario_graph_with_info() -> MemoryGraph {
    let mut graph = MemoryGraph::new();
    add_scenario_objects(&mut graph);
    graph.insert(
        ObjectRef::new(3, 0),
        dict(vec![("Producer", Object::String(b"test".to_vec())), ("Extra", r(4))]),
    );
    graph.insert(ObjectRef::new(4, 0), dict(vec![("Note", Object::Integer(1))]));
    graph.set_trailer_entry("Size", Object::Integer(10));
    graph.set_trailer_entry("Info", r(3));
    graph.set_trailer_entry("Root", r(1));
    graph
}

fn add_scenario_objects(graph: &mut MemoryGraph) {
    graph.insert(
        ObjectRef::new(1, 0),
        dict(vec![("Type", name("Catalog")), ("Pages", r(5)), ("Outlines", r(9))]),
    );
    graph.insert(
        ObjectRef::new(5, 0),
        dict(vec![
            ("Type", name("Pages")),
            ("Kids", Object::Array(vec![r(6), r(7)])),
            ("Count", Object::Integer(2)),
        ]),
    );
    for id in [6, 7] {
        graph.insert(
            ObjectRef::new(id, 0),
            dict(vec![("Type", name("Page")), ("Parent", r(5))]),
        );
    }
    graph.insert(
        ObjectRef::new(9, 0),
        dict(vec![("Type", name("Outlines")), ("Count", Object::Integer(0))]),
    );
}

fn bind(graph: MemoryGraph) -> (TreeNodeFactory, TreeProjection) {
    let trailer = graph.trailer().clone();
    let factory = TreeNodeFactory::new(graph);
    let mut projection = TreeProjection::new("scenario");
    projection.bind_root(&factory, trailer).unwrap();
    (factory, projection)
}

#[test]
fn test_concrete_scenario() {
    let (factory, mut projection) = bind(scenario_graph());

    let pages = projection.pages_root().expect("pages root");
    let outlines = projection.outline_root().expect("outline root");
    assert_eq!(projection.node(outlines).unwrap().object_ref(), Some(ObjectRef::new(9, 0)));
    assert_eq!(projection.node(outlines).unwrap().role(), NodeRole::Outlines);

    // Expanding the pages root yields exactly the two pages, in declared order
    let page_edges = projection.expand(&factory, pages).unwrap();
    let refs: Vec<_> = page_edges
        .iter()
        .map(|e| projection.node(e.node).unwrap().object_ref())
        .collect();
    assert_eq!(refs, vec![Some(ObjectRef::new(6, 0)), Some(ObjectRef::new(7, 0))]);

    // Select (6,0) in the pages view, then in the document view
    let page = page_edges[0].node;
    let mut pages_view = TreeView::new(ViewRoot::Pages);
    let mut document_view = TreeView::new(ViewRoot::Document);
    pages_view.select_node(&projection, page).unwrap();
    let count = projection.store().len();
    document_view.select_node(&projection, page).unwrap();

    assert_eq!(projection.store().len(), count);
    assert_eq!(pages_view.selected(), Some(page));
    assert_eq!(document_view.selected(), Some(page));
    assert_eq!(document_view.selection().unwrap().nodes[0], projection.root());
}

#[test]
fn test_trailer_entry_before_root_adds_no_nodes_on_forward() {
    let (factory, mut projection) = bind(scenario_graph_with_info());
    let root = projection.root();
    let info = projection.child(&factory, root, "Info").unwrap();
    assert!(!projection.node(info).unwrap().is_expanded());

    let pages = projection.pages_root().unwrap();
    let page = projection.expand(&factory, pages).unwrap()[0].node;
    let mut pages_view = TreeView::new(ViewRoot::Pages);
    let mut document_view = TreeView::new(ViewRoot::Document);
    pages_view.select_node(&projection, page).unwrap();

    let count = projection.store().len();
    let path = document_view.select_node(&projection, page).unwrap();
    assert_eq!(projection.store().len(), count);
    assert!(!projection.node(info).unwrap().is_expanded());
    assert!(projection.store().lookup(ObjectRef::new(4, 0)).is_none());
    assert_eq!(
        path.nodes,
        vec![projection.root(), projection.catalog().unwrap(), pages, page]
    );
}

#[test]
fn test_unreachable_select_does_not_grow_store() {
    let (factory, mut projection) = bind(scenario_graph_with_info());
    let pages = projection.pages_root().unwrap();
    let page = projection.expand(&factory, pages).unwrap()[1].node;
    let count = projection.store().len();

    // The outline tree never reaches a page
    let mut outlines_view = TreeView::new(ViewRoot::Outlines);
    assert!(matches!(
        outlines_view.select_node(&projection, page),
        Err(Error::Unreachable(_))
    ));
    assert_eq!(projection.store().len(), count);
    let outlines = projection.outline_root().unwrap();
    assert!(!projection.node(outlines).unwrap().is_expanded());
    assert!(outlines_view.selection().is_none());
}

#[test]
fn test_pages_root_child_count() {
    let (factory, mut projection) = bind(scenario_graph_with_info());
    let pages = projection.pages_root().unwrap();
    let edges = projection.expand(&factory, pages).unwrap();
    assert_eq!(edges.len(), 2);
    assert_eq!(edges[0].key, ChildKey::Index(0));
    assert_eq!(edges[1].key, ChildKey::Index(1));
    // The page itself is an ordinary dictionary
    let page_keys: Vec<ChildKey> = projection
        .expand(&factory, edges[0].node)
        .unwrap()
        .into_iter()
        .map(|e| e.key)
        .collect();
    assert_eq!(
        page_keys,
        vec![ChildKey::Name("Type".to_string()), ChildKey::Name("Parent".to_string())]
    );
}

#[test]
fn test_pages_and_document_paths_differ() {
    let (factory, mut projection) = bind(scenario_graph());
    let pages = projection.pages_root().unwrap();
    let page = projection.expand(&factory, pages).unwrap()[1].node;

    let mut pages_view = TreeView::new(ViewRoot::Pages);
    let mut document_view = TreeView::new(ViewRoot::Document);
    let short = pages_view.select_node(&projection, page).unwrap();
    let long = document_view.select_node(&projection, page).unwrap();

    assert_eq!(short.nodes, vec![pages, page]);
    assert_eq!(
        long.nodes,
        vec![projection.root(), projection.catalog().unwrap(), pages, page]
    );
}

#[test]
fn test_dedup_across_parents() {
    // Two pages share one resource dictionary
    let mut graph = MemoryGraph::new();
    graph.insert(ObjectRef::new(1, 0), dict(vec![("Pages", r(2))]));
    graph.insert(ObjectRef::new(2, 0), dict(vec![("Kids", Object::Array(vec![r(3), r(4)]))]));
    graph.insert(ObjectRef::new(3, 0), dict(vec![("Resources", r(10))]));
    graph.insert(ObjectRef::new(4, 0), dict(vec![("Resources", r(10))]));
    graph.insert(ObjectRef::new(10, 0), dict(vec![("ProcSet", Object::Array(vec![name("PDF")]))]));
    graph.set_trailer_entry("Root", r(1));
    let (factory, mut projection) = bind(graph);

    let pages = projection.pages_root().unwrap();
    let edges = projection.expand(&factory, pages).unwrap();
    let first = projection.child(&factory, edges[0].node, "Resources").unwrap();
    let second = projection.child(&factory, edges[1].node, "Resources").unwrap();

    assert_eq!(first, second);
    assert_eq!(projection.store().lookup(ObjectRef::new(10, 0)), Some(first));
}

#[test]
fn test_cycle_terminates_with_same_node() {
    let mut graph = MemoryGraph::new();
    graph.insert(ObjectRef::new(1, 0), dict(vec![("Outlines", r(2))]));
    graph.insert(ObjectRef::new(2, 0), dict(vec![("First", r(3))]));
    graph.insert(ObjectRef::new(3, 0), dict(vec![("Parent", r(2)), ("Next", r(4))]));
    graph.insert(ObjectRef::new(4, 0), dict(vec![("Parent", r(2)), ("Prev", r(3))]));
    graph.set_trailer_entry("Root", r(1));
    let (factory, mut projection) = bind(graph);

    let a = projection.outline_root().unwrap();
    let b = projection.child(&factory, a, "First").unwrap();
    let back = projection.child(&factory, b, "Parent").unwrap();
    assert_eq!(back, a);

    // Expanding the whole cycle and searching it terminates
    let c = projection.child(&factory, b, "Next").unwrap();
    projection.expand(&factory, c).unwrap();
    let count = projection.store().len();
    let missing = projection.root();
    let mut view = TreeView::new(ViewRoot::Outlines);
    assert!(matches!(
        view.select_node(&projection, missing),
        Err(Error::Unreachable(_))
    ));
    assert_eq!(projection.store().len(), count);
    assert_eq!(view.select_node(&projection, c).unwrap().nodes, vec![a, b, c]);

    let outline_nodes = projection
        .store()
        .iter()
        .filter(|n| n.object_ref().is_some_and(|r| (2..=4).contains(&r.id)))
        .count();
    assert_eq!(outline_nodes, 3);
}

#[test]
fn test_document_switch_isolation() {
    let (factory, mut projection) = bind(scenario_graph());
    let old_pages = projection.pages_root().unwrap();
    let old_catalog = projection.catalog().unwrap();

    projection.reset_root("next.pdf");
    assert!(projection.pages_root().is_none());
    assert!(projection.outline_root().is_none());
    assert!(projection.form_root().is_none());
    assert!(projection.node(old_pages).is_none());
    assert!(projection.node(old_catalog).is_none());
    assert!(projection.store().lookup(ObjectRef::new(5, 0)).is_none());
    assert_eq!(projection.store().len(), 1);

    // Old handles stay unreachable after the new document is bound
    projection.bind_root(&factory, factory.graph().trailer().clone()).unwrap();
    assert!(projection.pages_root().is_some());
    assert_ne!(projection.pages_root(), Some(old_pages));
    let mut view = TreeView::new(ViewRoot::Pages);
    assert!(matches!(
        view.select_node(&projection, old_pages),
        Err(Error::Unreachable(_))
    ));
}

#[test]
fn test_unreachable_keeps_previous_selection() {
    let (_, projection) = bind(scenario_graph());
    let (_, other) = bind(scenario_graph());
    let mut view = TreeView::new(ViewRoot::Document);

    let catalog = projection.catalog().unwrap();
    view.select_node(&projection, catalog).unwrap();

    let foreign = other.pages_root().unwrap();
    assert!(matches!(
        view.select_node(&projection, foreign),
        Err(Error::Unreachable(_))
    ));
    assert_eq!(view.selected(), Some(catalog));
}

#[test]
fn test_dangling_and_unsupported_children() {
    let mut graph = MemoryGraph::new();
    graph.insert(
        ObjectRef::new(1, 0),
        dict(vec![("Pages", r(2)), ("Outlines", r(50)), ("AcroForm", r(3))]),
    );
    graph.insert(ObjectRef::new(2, 0), dict(vec![]));
    graph.insert(ObjectRef::new(3, 0), r(2));
    graph.set_trailer_entry("Root", r(1));
    let (_, projection) = bind(graph);

    let outlines = projection.outline_root().unwrap();
    assert_eq!(
        projection.node(outlines).unwrap().kind(),
        &NodeKind::Placeholder(PlaceholderReason::Dangling)
    );
    let form = projection.form_root().unwrap();
    assert!(matches!(
        projection.node(form).unwrap().kind(),
        NodeKind::Placeholder(PlaceholderReason::Unsupported(_))
    ));
    assert!(projection.pages_root().is_some());
}

#[test]
fn test_forward_selection_through_inspector() {
    let mut inspector = Inspector::default();
    inspector.load(scenario_graph(), "scenario").unwrap();
    let pages = inspector.projection().unwrap().pages_root().unwrap();
    let page = inspector.expand(pages).unwrap()[0].node;

    inspector.select(ViewRoot::Pages, page).unwrap();
    let count = inspector.projection().unwrap().store().len();
    let views = inspector.forward_selection(page).unwrap();
    assert_eq!(inspector.projection().unwrap().store().len(), count);
    assert_eq!(views, vec![ViewRoot::Document, ViewRoot::Pages]);
    assert_eq!(
        inspector.view(ViewRoot::Document).selected(),
        inspector.view(ViewRoot::Pages).selected()
    );
}

proptest! {
    #[test]
    fn prop_expansion_preserves_declared_order(
        keys in prop::collection::vec("[A-Za-z]{1,8}", 1..12),
        values in prop::collection::vec(any::<i64>(), 1..12),
    ) {
        let mut entries = Dict::new();
        for (key, value) in keys.iter().zip(values.iter()) {
            entries.insert(key.clone(), Object::Integer(*value));
        }
        let declared: Vec<String> = entries.keys().cloned().collect();
        let items: Vec<Object> = values.iter().map(|v| Object::Integer(*v)).collect();

        let mut graph = MemoryGraph::new();
        graph.insert(ObjectRef::new(1, 0), Object::Dictionary(entries));
        graph.insert(ObjectRef::new(2, 0), Object::Array(items.clone()));
        let factory = TreeNodeFactory::new(graph);
        let mut projection = TreeProjection::new("prop");
        let mut trailer = Dict::new();
        trailer.insert("Dict".to_string(), r(1));
        trailer.insert("Array".to_string(), r(2));
        projection.bind_root(&factory, trailer).unwrap();

        let root = projection.root();
        let dict_node = projection.child(&factory, root, "Dict").unwrap();
        let names: Vec<String> = projection
            .expand(&factory, dict_node)
            .unwrap()
            .into_iter()
            .map(|e| match e.key {
                ChildKey::Name(n) => n,
                ChildKey::Index(i) => i.to_string(),
            })
            .collect();
        prop_assert_eq!(names, declared);

        let array_node = projection.child(&factory, root, "Array").unwrap();
        let edges = projection.expand(&factory, array_node).unwrap();
        let found: Vec<Object> = edges
            .iter()
            .map(|e| projection.node(e.node).unwrap().value().cloned().unwrap())
            .collect();
        prop_assert_eq!(found, items);
        for (i, edge) in edges.iter().enumerate() {
            prop_assert_eq!(&edge.key, &ChildKey::Index(i));
        }
    }
}
