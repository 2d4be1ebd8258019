//! HTML5 Parser
//!
//! Uses html5ever's RcDom and converts it into our arena DOM.

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};

use crate::{Document, DomTree, NodeId};

/// HTML5 parser
#[derive(Debug, Default)]
pub struct HtmlParser;

impl HtmlParser {
    /// Create a new HTML parser
    pub fn new() -> Self {
        Self
    }

    /// Parse HTML string into a Document
    pub fn parse(&self, html: &str) -> Document {
        self.parse_with_url(html, "about:blank")
    }

    /// Parse HTML with a document URL
    pub fn parse_with_url(&self, html: &str, url: &str) -> Document {
        tracing::debug!("Parsing HTML document: {}", url);

        let dom = parse_document(RcDom::default(), Default::default()).one(html);

        let mut document = Document::empty(url);
        let root = document.tree().root();
        self.convert_node(&dom.document, document.tree_mut(), root);
        document.finalize();

        tracing::debug!("Parsed {} nodes", document.tree().len());
        document
    }

    /// Convert an RcDom node into our tree under `parent`
    fn convert_node(&self, handle: &Handle, tree: &mut DomTree, parent: NodeId) {
        let id = match &handle.data {
            RcNodeData::Document => {
                for child in handle.children.borrow().iter() {
                    self.convert_node(child, tree, parent);
                }
                return;
            }
            RcNodeData::Text { contents } => {
                let text = contents.borrow();
                if text.trim().is_empty() {
                    return;
                }
                tree.create_text(&text)
            }
            RcNodeData::Comment { contents } => tree.create_comment(contents),
            RcNodeData::Element { name, attrs, .. } => {
                let id = tree.create_element(&name.local);
                for attr in attrs.borrow().iter() {
                    // Fresh element, cannot fail
                    let _ = tree.set_attribute(id, &attr.name.local, &attr.value);
                }
                id
            }
            RcNodeData::Doctype { .. } | RcNodeData::ProcessingInstruction { .. } => return,
        };

        if let Err(err) = tree.append_child(parent, id) {
            tracing::warn!("Dropping parsed node: {}", err);
            return;
        }
        for child in handle.children.borrow().iter() {
            self.convert_node(child, tree, id);
        }
    }
}

/// Parse a full HTML document
pub fn parse_html(html: &str, url: &str) -> Document {
    HtmlParser::new().parse_with_url(html, url)
}
