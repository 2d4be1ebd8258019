//! Edge case tests for footnote-dom
//!
//! Boundary conditions for the tree, selectors, parsing, serialization and
//! the in-memory window.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use footnote_dom::{
    inner_html, outer_html, parse_html, DOMRect, Document, DomError, DomTree, EventHandler,
    EventType, FlowLayout, MemoryWindow, NodeId, SelectorList, Timers, WindowHost,
};
use pretty_assertions::assert_eq;

// ============================================================================
// TREE EDGE CASES
// ============================================================================

#[test]
fn test_append_moves_node() {
    let mut tree = DomTree::new();
    let a = tree.create_element("div");
    let b = tree.create_element("div");
    let child = tree.create_element("span");
    tree.append_child(a, child).unwrap();
    tree.append_child(b, child).unwrap();

    assert!(tree.child_ids(a).is_empty());
    assert_eq!(tree.child_ids(b), vec![child]);
    assert_eq!(tree.parent(child), Some(b));
}

#[test]
fn test_cannot_append_ancestor() {
    let mut tree = DomTree::new();
    let outer = tree.create_element("div");
    let inner = tree.create_element("div");
    tree.append_child(outer, inner).unwrap();

    assert_eq!(tree.append_child(inner, outer), Err(DomError::HierarchyRequest));
    assert_eq!(tree.append_child(outer, outer), Err(DomError::HierarchyRequest));
}

#[test]
fn test_cannot_append_to_text() {
    let mut tree = DomTree::new();
    let text = tree.create_text("hi");
    let span = tree.create_element("span");
    assert_eq!(tree.append_child(text, span), Err(DomError::HierarchyRequest));
}

#[test]
fn test_remove_non_child() {
    let mut tree = DomTree::new();
    let a = tree.create_element("div");
    let b = tree.create_element("div");
    assert_eq!(tree.remove_child(a, b), Err(DomError::NotAChild));
}

#[test]
fn test_clone_document_rejected() {
    let mut tree = DomTree::new();
    let root = tree.root();
    assert_eq!(tree.clone_node(root, true), Err(DomError::InvalidNodeType));
}

#[test]
fn test_shallow_clone_keeps_attributes_only() {
    let mut doc = parse_html(r#"<p id="a" class="x">text <b>bold</b></p>"#, "about:blank");
    let p = doc.get_element_by_id("a").unwrap();
    let copy = doc.tree_mut().clone_node(p, false).unwrap();

    assert_eq!(outer_html(doc.tree(), copy), r#"<p id="a" class="x"></p>"#);
    assert_eq!(doc.tree().parent(copy), None);
}

#[test]
fn test_deep_clone_is_independent() {
    let mut doc = parse_html(r#"<p id="a">text <b>bold</b></p>"#, "about:blank");
    let p = doc.get_element_by_id("a").unwrap();
    let copy = doc.tree_mut().clone_node(p, true).unwrap();
    let bold = doc.tree().child_ids(copy)[1];
    doc.tree_mut().set_attribute(bold, "title", "changed").unwrap();

    assert_eq!(inner_html(doc.tree(), p), "text <b>bold</b>");
    assert_eq!(inner_html(doc.tree(), copy), r#"text <b title="changed">bold</b>"#);
}

#[test]
fn test_deep_nesting() {
    let mut tree = DomTree::new();
    let mut parent = tree.root();
    for _ in 0..1_000 {
        let div = tree.create_element("div");
        tree.append_child(parent, div).unwrap();
        parent = div;
    }
    assert_eq!(tree.descendants(tree.root()).len(), 1_000);
    assert!(tree.is_connected(parent));
}

#[test]
fn test_detached_subtree_not_connected() {
    let mut doc = parse_html("<div id=\"a\"><p id=\"b\"></p></div>", "about:blank");
    let a = doc.get_element_by_id("a").unwrap();
    let b = doc.get_element_by_id("b").unwrap();
    let body = doc.body();
    doc.tree_mut().remove_child(body, a).unwrap();

    assert!(!doc.tree().is_connected(b));
    assert_eq!(doc.get_element_by_id("b"), None);
}

// ============================================================================
// CLASS EDGE CASES
// ============================================================================

#[test]
fn test_class_toggle_forced() {
    let mut tree = DomTree::new();
    let div = tree.create_element("div");

    assert!(!tree.toggle_class(div, "empty", Some(false)).unwrap());
    assert!(tree.toggle_class(div, "empty", Some(true)).unwrap());
    assert!(tree.toggle_class(div, "empty", Some(true)).unwrap());
    assert_eq!(tree.get_attribute(div, "class"), Some("empty"));
    assert!(!tree.toggle_class(div, "empty", None).unwrap());
    assert!(!tree.has_class(div, "empty"));
}

#[test]
fn test_class_ops_on_text_fail() {
    let mut tree = DomTree::new();
    let text = tree.create_text("x");
    assert_eq!(tree.add_class(text, "a"), Err(DomError::InvalidNodeType));
}

// ============================================================================
// SELECTOR EDGE CASES
// ============================================================================

fn select(html: &str, selectors: &str) -> Vec<String> {
    let doc = parse_html(html, "about:blank");
    doc.query_selector_all(selectors)
        .unwrap()
        .into_iter()
        .map(|n| outer_html(doc.tree(), n))
        .collect()
}

#[test]
fn test_selector_list_document_order() {
    let found = select("<i>1</i><b>2</b><i>3</i>", "b, i");
    assert_eq!(found, vec!["<i>1</i>", "<b>2</b>", "<i>3</i>"]);
}

#[test]
fn test_descendant_vs_child() {
    let html = "<div><p><a>deep</a></p><a>direct</a></div>";
    assert_eq!(select(html, "div a").len(), 2);
    assert_eq!(select(html, "div > a"), vec!["<a>direct</a>"]);
    assert_eq!(select(html, "div > p > a"), vec!["<a>deep</a>"]);
}

#[test]
fn test_attribute_matchers() {
    let html = r##"<a href="#fn1">1</a><a href="https://x.org">2</a><a>3</a>"##;
    assert_eq!(select(html, "a[href]").len(), 2);
    assert_eq!(select(html, "a[href^='#']"), vec![r##"<a href="#fn1">1</a>"##]);
    assert_eq!(select(html, r#"[href="https://x.org"]"#).len(), 1);
}

#[test]
fn test_case_insensitive_type_selector() {
    assert_eq!(select("<SECTION>x</SECTION>", "Section").len(), 1);
}

#[test]
fn test_selector_whitespace_tolerated() {
    assert_eq!(select("<ul><li>a</li></ul>", "  ul   >   li  ").len(), 1);
}

#[test]
fn test_unsupported_selectors_rejected() {
    for bad in ["a:hover", "a::before", "a + b", "a ~ b", "*|a", "#"] {
        let err = SelectorList::parse(bad).unwrap_err();
        assert!(matches!(err, DomError::Syntax { .. }), "{bad:?}");
        assert!(err.to_string().contains(bad), "{bad:?}");
    }
}

#[test]
fn test_query_on_empty_document() {
    let doc = Document::default();
    assert_eq!(doc.query_selector("p").unwrap(), None);
    assert!(doc.query_selector_all("*").unwrap().len() >= 3);
}

// ============================================================================
// PARSING & SERIALIZATION
// ============================================================================

#[test]
fn test_parse_fragment_gets_body() {
    let doc = parse_html("just text", "https://example.com/");
    assert_eq!(inner_html(doc.tree(), doc.body()), "just text");
    assert_eq!(doc.url(), "https://example.com/");
}

#[test]
fn test_parse_title() {
    let doc = parse_html("<title> Chapter 1 </title><p>x</p>", "about:blank");
    assert_eq!(doc.title(), "Chapter 1");
}

#[test]
fn test_serialize_escapes() {
    let doc = parse_html(r#"<p title="a &quot;b&quot; &amp; c">1 &lt; 2 &amp;&amp; 3 &gt; 2</p>"#, "about:blank");
    let p = doc.query_selector("p").unwrap().unwrap();
    assert_eq!(
        outer_html(doc.tree(), p),
        r#"<p title="a &quot;b&quot; &amp; c">1 &lt; 2 &amp;&amp; 3 &gt; 2</p>"#
    );
}

#[test]
fn test_serialize_void_elements() {
    let doc = parse_html("<p>a<br>b<img src=\"x.png\"></p>", "about:blank");
    let p = doc.query_selector("p").unwrap().unwrap();
    assert_eq!(inner_html(doc.tree(), p), r#"a<br>b<img src="x.png">"#);
}

#[test]
fn test_comments_survive() {
    let doc = parse_html("<p><!-- note -->x</p>", "about:blank");
    let p = doc.query_selector("p").unwrap().unwrap();
    assert_eq!(inner_html(doc.tree(), p), "<!-- note -->x");
}

// ============================================================================
// LAYOUT
// ============================================================================

#[test]
fn test_layout_replaces_old_boxes() {
    let mut doc = parse_html("<p id=\"a\">x</p>", "about:blank");
    let a = doc.get_element_by_id("a").unwrap();
    doc.set_layout_rect(a, DOMRect::from_xywh(0.0, 5000.0, 10.0, 10.0));

    FlowLayout::default().apply(&mut doc);
    assert_eq!(doc.layout_rect(a).y, 0.0);
}

#[test]
fn test_layout_empty_body() {
    let mut doc = Document::default();
    assert_eq!(FlowLayout::default().apply(&mut doc), 0.0);
}

// ============================================================================
// WINDOW EDGE CASES
// ============================================================================

fn window() -> MemoryWindow {
    let mut doc = parse_html("<p id=\"a\">x</p>", "https://example.com/");
    let a = doc.get_element_by_id("a").unwrap();
    doc.set_layout_rect(a, DOMRect::from_xywh(0.0, 1000.0, 100.0, 20.0));
    MemoryWindow::new(doc, 800.0, 600.0)
}

#[test]
fn test_scroll_clamps_at_origin() {
    let w = window();
    w.scroll_by(-50.0, -50.0);
    assert_eq!(w.scroll_position(), (0.0, 0.0));
}

#[test]
fn test_timers_fire_in_deadline_order() {
    let w = window();
    let log = Rc::new(RefCell::new(Vec::new()));
    for (name, delay) in [("c", 30), ("a", 10), ("b", 20), ("a2", 10)] {
        let log = log.clone();
        w.set_timeout(Box::new(move || log.borrow_mut().push(name)), Duration::from_millis(delay));
    }

    assert_eq!(w.advance(Duration::from_millis(30)), 4);
    assert_eq!(*log.borrow(), vec!["a", "a2", "b", "c"]);
    assert_eq!(w.now(), Duration::from_millis(30));
}

#[test]
fn test_timer_scheduled_by_timer() {
    let w = Rc::new(window());
    let fired = Rc::new(RefCell::new(Vec::new()));

    let inner_w = w.clone();
    let log = fired.clone();
    w.set_timeout(
        Box::new(move || {
            log.borrow_mut().push(inner_w.now());
            let log = log.clone();
            let clock = inner_w.clone();
            inner_w.set_timeout(
                Box::new(move || log.borrow_mut().push(clock.now())),
                Duration::from_millis(5),
            );
        }),
        Duration::from_millis(10),
    );

    w.advance(Duration::from_millis(20));
    assert_eq!(
        *fired.borrow(),
        vec![Duration::from_millis(10), Duration::from_millis(15)]
    );
}

#[test]
fn test_cleared_timer_never_fires() {
    let w = window();
    let fired = Rc::new(RefCell::new(false));
    let flag = fired.clone();
    let id = w.set_timeout(Box::new(move || *flag.borrow_mut() = true), Duration::from_millis(1));
    w.clear_timeout(id);
    w.clear_timeout(id);

    assert_eq!(w.advance(Duration::from_millis(10)), 0);
    assert!(!*fired.borrow());
}

#[test]
fn test_cancelled_frame_never_runs() {
    let w = window();
    let ran = Rc::new(RefCell::new(false));
    let flag = ran.clone();
    let id = w.request_animation_frame(Box::new(move || *flag.borrow_mut() = true));
    w.cancel_animation_frame(id);

    assert_eq!(w.run_animation_frame(), 0);
    assert!(!*ran.borrow());
}

#[test]
fn test_same_handler_both_events() {
    let w = window();
    let calls = Rc::new(RefCell::new(0));
    let counter = calls.clone();
    let handler: EventHandler = Rc::new(move || *counter.borrow_mut() += 1);
    w.add_event_listener(EventType::Scroll, handler.clone());
    w.add_event_listener(EventType::Resize, handler.clone());

    w.scroll_to(0.0, 10.0);
    w.resize(640.0, 480.0);
    assert_eq!(*calls.borrow(), 2);

    w.remove_event_listener(EventType::Scroll, &handler);
    w.scroll_to(0.0, 20.0);
    assert_eq!(*calls.borrow(), 2);
    assert_eq!(w.listener_count(EventType::Resize), 1);
}

#[test]
fn test_client_rect_detached_is_empty() {
    let w = window();
    let node: NodeId = w.get_element_by_id("a").unwrap();
    let body = w.document().body();
    w.remove_child(&body, &node).unwrap();

    assert!(w.bounding_client_rect(&node).is_empty());
}

#[test]
fn test_release_node_requires_detached() {
    let w = window();
    let node: NodeId = w.get_element_by_id("a").unwrap();
    assert_eq!(w.release_node(&node), Err(DomError::HierarchyRequest));

    let body = w.document().body();
    w.remove_child(&body, &node).unwrap();
    w.release_node(&node).unwrap();
    assert_eq!(w.document().tree().free_count(), 2);

    let fresh = w.create_element("div").unwrap();
    w.append_child(&body, &fresh).unwrap();
    assert_eq!(w.bounding_client_rect(&fresh).top(), 0.0);
}
