//! DOM Tree (arena-based allocation)

use crate::{DomError, DomResult, ElementData, Node, NodeData, NodeId};

/// Arena-based DOM tree
///
/// Node 0 is always the document node. Removed nodes stay in the arena as
/// detached subtrees until [`DomTree::release`] hands their slots back;
/// released IDs are reused by later allocations.
#[derive(Debug, Clone)]
pub struct DomTree {
    pub(crate) nodes: Vec<Node>,
    free: Vec<NodeId>,
}

impl DomTree {
    /// Create a tree holding only the document node
    pub fn new() -> Self {
        Self { nodes: vec![Node::document()], free: Vec::new() }
    }

    /// Document node
    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    /// Number of slots in the arena, detached and released ones included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Released slots waiting for reuse
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Only the document node exists
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    fn push(&mut self, node: Node) -> NodeId {
        if let Some(id) = self.free.pop() {
            self.nodes[id.index()] = node;
            return id;
        }
        // NONE is the last u32, so it never names a slot
        let index = u32::try_from(self.nodes.len())
            .ok()
            .filter(|&i| i != NodeId::NONE.0);
        let Some(index) = index else {
            panic!("DOM arena exhausted at {} nodes", self.nodes.len());
        };
        self.nodes.push(node);
        NodeId(index)
    }

    /// Create a detached element
    pub fn create_element(&mut self, local_name: &str) -> NodeId {
        self.push(Node::element(local_name))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.push(Node::text(content))
    }

    /// Create a detached comment node
    pub fn create_comment(&mut self, content: &str) -> NodeId {
        self.push(Node::comment(content))
    }

    fn node(&self, id: NodeId) -> DomResult<&Node> {
        self.get(id).ok_or(DomError::NotFound)
    }

    /// Element data for `id`, if it is an element
    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(Node::as_element)
    }

    fn element_mut(&mut self, id: NodeId) -> DomResult<&mut ElementData> {
        self.get_mut(id)
            .ok_or(DomError::NotFound)?
            .as_element_mut()
            .ok_or(DomError::InvalidNodeType)
    }

    /// Parent of a node, if attached
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).map(|n| n.parent).filter(|p| p.is_valid())
    }

    /// Check whether `ancestor` is `node` or one of its ancestors
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = node;
        while current.is_valid() {
            if current == ancestor {
                return true;
            }
            current = self.get(current).map_or(NodeId::NONE, |n| n.parent);
        }
        false
    }

    /// Check whether a node is reachable from the document node
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.is_inclusive_ancestor(self.root(), id)
    }

    /// Append `child` as the last child of `parent`
    ///
    /// The child is detached from its current parent first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        match self.node(parent)?.data {
            NodeData::Element(_) | NodeData::Document => {}
            _ => return Err(DomError::HierarchyRequest),
        }
        if matches!(self.node(child)?.data, NodeData::Document) {
            return Err(DomError::HierarchyRequest);
        }
        if self.is_inclusive_ancestor(child, parent) {
            return Err(DomError::HierarchyRequest);
        }

        self.detach(child);
        self.link_last(parent, child);
        Ok(())
    }

    /// Append a freshly created, detached node under `parent`
    ///
    /// Only for building known-good structure: no hierarchy checks run.
    pub(crate) fn append_new(&mut self, parent: NodeId, child: NodeId) {
        debug_assert!(!self.nodes[child.index()].parent.is_valid());
        self.link_last(parent, child);
    }

    fn link_last(&mut self, parent: NodeId, child: NodeId) {
        let last = self.nodes[parent.index()].last_child;
        {
            let node = &mut self.nodes[child.index()];
            node.parent = parent;
            node.prev_sibling = last;
            node.next_sibling = NodeId::NONE;
        }
        if last.is_valid() {
            self.nodes[last.index()].next_sibling = child;
        } else {
            self.nodes[parent.index()].first_child = child;
        }
        self.nodes[parent.index()].last_child = child;
    }

    /// Remove `child` from `parent`
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        self.node(parent)?;
        if self.node(child)?.parent != parent {
            return Err(DomError::NotAChild);
        }
        self.detach(child);
        Ok(())
    }

    fn detach(&mut self, id: NodeId) {
        let (parent, prev, next) = {
            let node = &self.nodes[id.index()];
            (node.parent, node.prev_sibling, node.next_sibling)
        };
        if !parent.is_valid() {
            return;
        }
        if prev.is_valid() {
            self.nodes[prev.index()].next_sibling = next;
        } else {
            self.nodes[parent.index()].first_child = next;
        }
        if next.is_valid() {
            self.nodes[next.index()].prev_sibling = prev;
        } else {
            self.nodes[parent.index()].last_child = prev;
        }
        let node = &mut self.nodes[id.index()];
        node.parent = NodeId::NONE;
        node.prev_sibling = NodeId::NONE;
        node.next_sibling = NodeId::NONE;
    }

    /// Free a detached subtree, returning how many slots were reclaimed
    ///
    /// `id` and every node below it become invalid handles; their slots are
    /// handed to later allocations. The document node and anything still
    /// attached to a parent cannot be released.
    pub fn release(&mut self, id: NodeId) -> DomResult<usize> {
        let node = self.node(id)?;
        if id == self.root() || node.parent.is_valid() {
            return Err(DomError::HierarchyRequest);
        }
        if self.free.contains(&id) {
            return Err(DomError::NotFound);
        }

        let mut doomed = self.descendants(id);
        doomed.push(id);
        for &slot in &doomed {
            self.nodes[slot.index()] = Node::comment("");
        }
        self.free.extend(doomed.iter().rev());
        Ok(doomed.len())
    }

    /// Iterate over the children of a node
    pub fn children(&self, parent: NodeId) -> Children<'_> {
        Children {
            tree: self,
            next: self.get(parent).map_or(NodeId::NONE, |n| n.first_child),
        }
    }

    /// Child IDs in order
    pub fn child_ids(&self, parent: NodeId) -> Vec<NodeId> {
        self.children(parent).map(|(id, _)| id).collect()
    }

    /// All descendants of `root` in document (pre-)order, `root` excluded
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.child_ids(root);
        stack.reverse();
        while let Some(id) = stack.pop() {
            out.push(id);
            let first = stack.len();
            stack.extend(self.children(id).map(|(child, _)| child));
            stack[first..].reverse();
        }
        out
    }

    /// Clone a node; with `deep` its whole subtree is copied too
    ///
    /// The copy is detached. Attributes, ids included, are copied verbatim.
    pub fn clone_node(&mut self, id: NodeId, deep: bool) -> DomResult<NodeId> {
        let copy = self.node(id)?.detached_copy();
        if matches!(copy.data, NodeData::Document) {
            return Err(DomError::InvalidNodeType);
        }
        let new_id = self.push(copy);
        if deep {
            for child in self.child_ids(id) {
                let child_copy = self.clone_node(child, true)?;
                self.append_child(new_id, child_copy)?;
            }
        }
        Ok(new_id)
    }

    /// Concatenated text of the node and its descendants
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(text) = self.get(id).and_then(Node::as_text) {
            return text.to_string();
        }
        self.descendants(id)
            .into_iter()
            .filter_map(|d| self.get(d).and_then(Node::as_text))
            .collect()
    }

    /// Get an attribute of an element
    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?.get_attr(&name.to_ascii_lowercase())
    }

    /// Set an attribute on an element
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> DomResult<()> {
        self.element_mut(id)?.set_attr(name, value);
        Ok(())
    }

    /// Remove an attribute from an element; absent attributes are fine
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> DomResult<()> {
        self.element_mut(id)?.remove_attr(&name.to_ascii_lowercase());
        Ok(())
    }

    /// classList.add
    pub fn add_class(&mut self, id: NodeId, class: &str) -> DomResult<()> {
        let elem = self.element_mut(id)?;
        let mut list = elem.class_list();
        list.add(class);
        elem.set_class_list(&list);
        Ok(())
    }

    /// classList.toggle, returns whether the class is now present
    pub fn toggle_class(&mut self, id: NodeId, class: &str, force: Option<bool>) -> DomResult<bool> {
        let elem = self.element_mut(id)?;
        let mut list = elem.class_list();
        let on = list.toggle(class, force);
        elem.set_class_list(&list);
        Ok(on)
    }

    /// classList.contains
    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.element(id).is_some_and(|e| e.has_class(class))
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over the children of a node
pub struct Children<'a> {
    tree: &'a DomTree,
    next: NodeId,
}

impl<'a> Iterator for Children<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next;
        let node = self.tree.get(id)?;
        self.next = node.next_sibling;
        Some((id, node))
    }
}
