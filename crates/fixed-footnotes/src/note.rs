//! Notes and their displayed copies
//!
//! Resolves a reference marker to the note it points at, and builds the
//! `<li>` copy shown in the overlay: the note's children cloned deep, every
//! `id` attribute removed, then handed to the caller's hook.

use footnote_dom::WindowHost;
use url::Url;

use crate::config::Options;
use crate::error::Result;

/// Fragment named by a marker's `href`, if it points into the current
/// document
///
/// `#frag` is taken as is. Anything else is resolved against
/// `document_url` and accepted only when it lands on the same document.
pub fn note_id_from_href(href: &str, document_url: &str) -> Option<String> {
    if let Some(fragment) = href.strip_prefix('#') {
        return (!fragment.is_empty()).then(|| fragment.to_string());
    }

    let mut base = Url::parse(document_url).ok()?;
    let mut target = base.join(href).ok()?;
    let fragment = target.fragment().filter(|f| !f.is_empty())?.to_string();

    base.set_fragment(None);
    target.set_fragment(None);
    (base == target).then_some(fragment)
}

/// Note targeted by `marker`, or `None` when it does not resolve
pub fn resolve_note<W: WindowHost + ?Sized>(window: &W, marker: &W::Node) -> Option<W::Node> {
    let href = window.get_attribute(marker, "href")?;
    let id = note_id_from_href(&href, &window.document_url())?;
    window.get_element_by_id(&id)
}

/// Build the overlay entry for `note`
pub fn build_displayed_note<W: WindowHost>(
    window: &W,
    note: &W::Node,
    options: &Options<W>,
) -> Result<W::Node> {
    let item = window.create_element("li")?;
    window.add_class(&item, &options.config().footnote_class)?;

    for child in window.child_nodes(note) {
        let copy = window.clone_node(&child, true)?;
        window.append_child(&item, &copy)?;
    }
    strip_ids(window, &item)?;

    Ok((options.note_hook())(window, item))
}

/// Remove the `id` attribute from `root` and every element below it
pub fn strip_ids<W: WindowHost + ?Sized>(window: &W, root: &W::Node) -> Result<()> {
    let mut stack = vec![root.clone()];
    while let Some(node) = stack.pop() {
        if !window.is_element(&node) {
            continue;
        }
        window.remove_attribute(&node, "id")?;
        stack.extend(window.child_nodes(&node));
    }
    Ok(())
}

/// Detach and free every child of `node`
pub fn empty_element<W: WindowHost + ?Sized>(window: &W, node: &W::Node) -> Result<()> {
    for child in window.child_nodes(node) {
        window.remove_child(node, &child)?;
        window.release_node(&child)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use footnote_dom::{inner_html, parse_html, MemoryWindow};
    use pretty_assertions::assert_eq;

    const URL: &str = "https://example.com/book/ch1.html";

    #[test]
    fn test_note_id_from_href() {
        let cases = [
            ("#fn1", Some("fn1")),
            ("#", None),
            ("", None),
            ("ch1.html#fn2", Some("fn2")),
            ("/book/ch1.html#fn3", Some("fn3")),
            ("https://example.com/book/ch1.html#fn4", Some("fn4")),
            ("ch2.html#fn1", None),
            ("https://other.org/book/ch1.html#fn1", None),
            ("ch1.html", None),
            ("ch1.html?print=1#fn1", None),
        ];
        for (href, expected) in cases {
            assert_eq!(note_id_from_href(href, URL).as_deref(), expected, "href {href:?}");
        }
    }

    #[test]
    fn test_fragment_only_works_without_base() {
        assert_eq!(note_id_from_href("#fn1", "about:blank").as_deref(), Some("fn1"));
        assert_eq!(note_id_from_href("other#fn1", "about:blank"), None);
    }

    #[test]
    fn test_resolve_note() {
        let doc = parse_html(
            r##"<a id="m1" href="#fn1">1</a><a id="m2" href="#nope">2</a><a id="m3">3</a>
                <p id="fn1">note</p>"##,
            URL,
        );
        let w = MemoryWindow::new(doc, 800.0, 600.0);
        let m1 = w.get_element_by_id("m1").unwrap();
        let m2 = w.get_element_by_id("m2").unwrap();
        let m3 = w.get_element_by_id("m3").unwrap();

        assert_eq!(resolve_note(&w, &m1), w.get_element_by_id("fn1"));
        assert_eq!(resolve_note(&w, &m2), None);
        assert_eq!(resolve_note(&w, &m3), None);
    }

    #[test]
    fn test_build_strips_nested_ids() {
        let doc = parse_html(
            r#"<div id="fn1">See <em id="x">this</em> and <span id="y"><b id="z">that</b></span></div>"#,
            URL,
        );
        let w = MemoryWindow::new(doc, 800.0, 600.0);
        let note = w.get_element_by_id("fn1").unwrap();

        let item = build_displayed_note(&w, &note, &Options::new()).unwrap();

        let doc = w.document();
        assert_eq!(
            inner_html(doc.tree(), item),
            "See <em>this</em> and <span><b>that</b></span>"
        );
        assert!(doc.tree().has_class(item, "fixed-footnotes-note"));
        assert_eq!(doc.get_element_by_id("x").map(|n| doc.tree().is_connected(n)), Some(true));
    }

    #[test]
    fn test_source_note_untouched() {
        let doc = parse_html(r#"<p id="fn1">a <i id="i">b</i></p>"#, URL);
        let w = MemoryWindow::new(doc, 800.0, 600.0);
        let note = w.get_element_by_id("fn1").unwrap();
        let before = inner_html(w.document().tree(), note);

        build_displayed_note(&w, &note, &Options::new()).unwrap();

        assert_eq!(inner_html(w.document().tree(), note), before);
    }

    #[test]
    fn test_transform_hook_runs_on_stripped_note() {
        let doc = parse_html(r#"<p id="fn1"><span id="s">x</span></p>"#, URL);
        let w = MemoryWindow::new(doc, 800.0, 600.0);
        let note = w.get_element_by_id("fn1").unwrap();

        let options = Options::<MemoryWindow>::new().transform_note(|w: &MemoryWindow, item| {
            assert_eq!(w.child_nodes(&item).len(), 1);
            w.set_attribute(&item, "data-seen", "yes").unwrap();
            item
        });
        let item = build_displayed_note(&w, &note, &options).unwrap();

        assert_eq!(w.get_attribute(&item, "data-seen").as_deref(), Some("yes"));
        assert_eq!(w.get_attribute(&item, "id"), None);
    }

    #[test]
    fn test_empty_element() {
        let doc = parse_html("<ul id=\"l\"><li>a</li>text<li>b</li></ul>", URL);
        let w = MemoryWindow::new(doc, 800.0, 600.0);
        let list = w.get_element_by_id("l").unwrap();

        empty_element(&w, &list).unwrap();
        assert!(w.child_nodes(&list).is_empty());
        assert_eq!(w.document().tree().free_count(), 5);
    }
}
