//! Document - High-level document API

use std::collections::HashMap;

use crate::{DOMRect, DomResult, DomTree, NodeId, SelectorList};

/// HTML Document
#[derive(Debug, Clone)]
pub struct Document {
    /// The DOM tree
    pub tree: DomTree,
    /// Document URL
    url: String,
    /// Cached reference to <html> element
    html_element: NodeId,
    /// Cached reference to <head> element
    head_element: NodeId,
    /// Cached reference to <body> element
    body_element: NodeId,
    /// Page-coordinate boxes assigned by layout
    layout: HashMap<NodeId, DOMRect>,
}

impl Document {
    /// Create a new document with html/head/body
    pub fn new(url: &str) -> Self {
        let mut tree = DomTree::new();

        let html = tree.create_element("html");
        let head = tree.create_element("head");
        let body = tree.create_element("body");

        tree.append_new(tree.root(), html);
        tree.append_new(html, head);
        tree.append_new(html, body);

        Self {
            tree,
            url: url.to_string(),
            html_element: html,
            head_element: head,
            body_element: body,
            layout: HashMap::new(),
        }
    }

    /// Create an empty document (no structure)
    pub fn empty(url: &str) -> Self {
        Self {
            tree: DomTree::new(),
            url: url.to_string(),
            html_element: NodeId::NONE,
            head_element: NodeId::NONE,
            body_element: NodeId::NONE,
            layout: HashMap::new(),
        }
    }

    /// Locate <html>, <head> and <body> after the tree was built externally
    pub fn finalize(&mut self) {
        let find = |tree: &DomTree, parent: NodeId, tag: &str| {
            tree.children(parent)
                .find(|(_, n)| n.as_element().is_some_and(|e| e.local_name == tag))
                .map_or(NodeId::NONE, |(id, _)| id)
        };
        self.html_element = find(&self.tree, self.tree.root(), "html");
        if self.html_element.is_valid() {
            self.head_element = find(&self.tree, self.html_element, "head");
            self.body_element = find(&self.tree, self.html_element, "body");
        }
    }

    /// Get document URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get document title
    pub fn title(&self) -> String {
        if !self.head_element.is_valid() {
            return String::new();
        }
        self.tree
            .children(self.head_element)
            .find(|(_, n)| n.as_element().is_some_and(|e| e.local_name == "title"))
            .map(|(id, _)| self.tree.text_content(id).trim().to_string())
            .unwrap_or_default()
    }

    /// Get <html> element
    pub fn document_element(&self) -> NodeId {
        self.html_element
    }

    /// Get <head> element
    pub fn head(&self) -> NodeId {
        self.head_element
    }

    /// Get <body> element
    pub fn body(&self) -> NodeId {
        self.body_element
    }

    /// Get the first connected element with the given id, in document order
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        if id.is_empty() {
            return None;
        }
        self.tree
            .descendants(self.tree.root())
            .into_iter()
            .find(|&node| self.tree.element(node).and_then(|e| e.id()) == Some(id))
    }

    /// First connected element matching `selectors`
    pub fn query_selector(&self, selectors: &str) -> DomResult<Option<NodeId>> {
        let list = SelectorList::parse(selectors)?;
        Ok(self
            .tree
            .descendants(self.tree.root())
            .into_iter()
            .find(|&node| list.matches(&self.tree, node)))
    }

    /// All connected elements matching `selectors`, in document order
    pub fn query_selector_all(&self, selectors: &str) -> DomResult<Vec<NodeId>> {
        let list = SelectorList::parse(selectors)?;
        Ok(self
            .tree
            .descendants(self.tree.root())
            .into_iter()
            .filter(|&node| list.matches(&self.tree, node))
            .collect())
    }

    /// Assign the box of a node in page coordinates
    pub fn set_layout_rect(&mut self, node: NodeId, rect: DOMRect) {
        self.layout.insert(node, rect);
    }

    /// Box of a node in page coordinates; empty when never laid out
    pub fn layout_rect(&self, node: NodeId) -> DOMRect {
        self.layout.get(&node).copied().unwrap_or_default()
    }

    /// Free a detached subtree along with its layout boxes
    pub fn release_node(&mut self, node: NodeId) -> DomResult<()> {
        let mut freed = self.tree.descendants(node);
        self.tree.release(node)?;
        freed.push(node);
        for id in freed {
            self.layout.remove(&id);
        }
        Ok(())
    }

    /// Drop every layout box
    pub fn clear_layout(&mut self) {
        self.layout.clear();
    }

    /// Access the DOM tree
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Access the DOM tree mutably
    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("about:blank")
    }
}
