//! HTML serialization (innerHTML / outerHTML)

use std::fmt::Write;

use crate::{DomTree, NodeData, NodeId};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track", "wbr",
];

/// Serialize the children of a node
pub fn inner_html(tree: &DomTree, node: NodeId) -> String {
    let mut out = String::new();
    for (child, _) in tree.children(node) {
        write_node(tree, child, &mut out);
    }
    out
}

/// Serialize a node and its subtree
pub fn outer_html(tree: &DomTree, node: NodeId) -> String {
    let mut out = String::new();
    write_node(tree, node, &mut out);
    out
}

fn write_node(tree: &DomTree, id: NodeId, out: &mut String) {
    let Some(node) = tree.get(id) else {
        return;
    };
    match &node.data {
        NodeData::Document => out.push_str(&inner_html(tree, id)),
        NodeData::Text(text) => escape(text, false, out),
        NodeData::Comment(text) => {
            let _ = write!(out, "<!--{text}-->");
        }
        NodeData::Element(elem) => {
            out.push('<');
            out.push_str(&elem.local_name);
            for attr in elem.attrs.iter() {
                out.push(' ');
                out.push_str(&attr.name);
                out.push_str("=\"");
                escape(&attr.value, true, out);
                out.push('"');
            }
            out.push('>');
            if VOID_ELEMENTS.contains(&elem.local_name.as_str()) {
                return;
            }
            for (child, _) in tree.children(id) {
                write_node(tree, child, out);
            }
            let _ = write!(out, "</{}>", elem.local_name);
        }
    }
}

fn escape(text: &str, attribute: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_outer_html() {
        let mut tree = DomTree::new();
        let p = tree.create_element("p");
        tree.set_attribute(p, "class", "note").unwrap();
        tree.set_attribute(p, "title", "a \"quoted\" <title>").unwrap();
        let text = tree.create_text("1 < 2 & 3");
        let br = tree.create_element("br");
        tree.append_child(p, text).unwrap();
        tree.append_child(p, br).unwrap();

        assert_eq!(
            outer_html(&tree, p),
            "<p class=\"note\" title=\"a &quot;quoted&quot; <title>\">1 &lt; 2 &amp; 3<br></p>"
        );
        assert_eq!(inner_html(&tree, p), "1 &lt; 2 &amp; 3<br>");
    }

    #[test]
    fn test_comment() {
        let mut tree = DomTree::new();
        let div = tree.create_element("div");
        let comment = tree.create_comment(" note ");
        tree.append_child(div, comment).unwrap();
        assert_eq!(outer_html(&tree, div), "<div><!-- note --></div>");
    }
}
