//! Footnote DOM - Document Object Model substrate
//!
//! Arena-based DOM tree, selector matching, HTML parsing and serialization,
//! plus the window capability the fixed-footnotes engine runs against.

mod attributes;
mod classlist;
mod document;
mod error;
mod geometry;
mod layout;
mod node;
mod parser;
mod selector;
mod serialize;
mod tree;
pub mod window;

pub use attributes::{Attr, NamedNodeMap};
pub use classlist::DOMTokenList;
pub use document::Document;
pub use error::{DomError, DomResult};
pub use geometry::DOMRect;
pub use layout::FlowLayout;
pub use node::{ElementData, Node, NodeData};
pub use parser::{parse_html, HtmlParser};
pub use selector::{AttrMatcher, Combinator, CompoundSelector, SelectorList, SimpleSelector};
pub use serialize::{inner_html, outer_html};
pub use tree::DomTree;
pub use window::{EventHandler, EventType, FrameId, MemoryWindow, TimerId, Timers, WindowHost};

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root (document) node ID
    pub const ROOT: NodeId = NodeId(0);

    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Check that this ID points at a node
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    /// Raw arena index
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}
