//! Flow Layout
//!
//! A monospace block formatting pass. Block boxes stack vertically and fill
//! their container's width; text wraps at a fixed character width; inline
//! elements get a box on the line(s) their text occupies. It is enough to
//! give every element a plausible page position without a style system.

use crate::{DOMRect, Document, NodeData, NodeId};

const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "dd", "details", "div", "dl", "dt",
    "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6",
    "header", "hr", "html", "li", "main", "nav", "ol", "p", "pre", "section", "summary", "table",
    "ul",
];

const SKIPPED_ELEMENTS: &[&str] = &["head", "script", "style", "template", "title", "meta", "link"];

/// Flow layout parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowLayout {
    /// Width of the initial containing block
    pub width: f64,
    /// Height of one line of text
    pub line_height: f64,
    /// Advance of one character
    pub char_width: f64,
}

impl Default for FlowLayout {
    fn default() -> Self {
        Self {
            width: 800.0,
            line_height: 20.0,
            char_width: 8.0,
        }
    }
}

impl FlowLayout {
    pub fn new(width: f64, line_height: f64, char_width: f64) -> Self {
        Self { width, line_height, char_width }
    }

    /// Lay out the body of `document`, replacing any previous boxes
    ///
    /// Returns the total document height.
    pub fn apply(&self, document: &mut Document) -> f64 {
        document.clear_layout();
        let body = document.body();
        if !body.is_valid() {
            return 0.0;
        }
        let height = self.layout_block(document, body, 0.0, 0.0, self.width);
        document.set_layout_rect(body, DOMRect::from_xywh(0.0, 0.0, self.width, height));
        tracing::debug!("Flow layout: {} px tall", height);
        height
    }

    fn chars_per_line(&self, width: f64) -> usize {
        ((width / self.char_width).floor() as usize).max(1)
    }

    /// Lay out the children of a block box; returns the content height
    fn layout_block(&self, doc: &mut Document, block: NodeId, x: f64, y: f64, width: f64) -> f64 {
        let mut cursor_y = y;
        let mut run: Vec<NodeId> = Vec::new();

        for child in doc.tree().child_ids(block) {
            match self.classify(doc, child) {
                Flow::Skip => {}
                Flow::Inline => run.push(child),
                Flow::Block => {
                    cursor_y += self.layout_inline_run(doc, &std::mem::take(&mut run), x, cursor_y, width);
                    let height = self.layout_block(doc, child, x, cursor_y, width);
                    doc.set_layout_rect(child, DOMRect::from_xywh(x, cursor_y, width, height));
                    cursor_y += height;
                }
            }
        }
        cursor_y += self.layout_inline_run(doc, &run, x, cursor_y, width);
        cursor_y - y
    }

    fn classify(&self, doc: &Document, node: NodeId) -> Flow {
        match doc.tree().get(node).map(|n| &n.data) {
            Some(NodeData::Text(_)) => Flow::Inline,
            Some(NodeData::Element(e)) if SKIPPED_ELEMENTS.contains(&e.local_name.as_str()) => Flow::Skip,
            Some(NodeData::Element(e)) if BLOCK_ELEMENTS.contains(&e.local_name.as_str()) => Flow::Block,
            Some(NodeData::Element(_)) => Flow::Inline,
            _ => Flow::Skip,
        }
    }

    /// Lay out consecutive inline nodes; returns the height of their lines
    fn layout_inline_run(&self, doc: &mut Document, run: &[NodeId], x: f64, y: f64, width: f64) -> f64 {
        if run.is_empty() {
            return 0.0;
        }
        let line = LineBox {
            x,
            y,
            width,
            per_line: self.chars_per_line(width),
        };
        let mut offset = 0;
        for &node in run {
            offset = self.layout_inline(doc, node, &line, offset);
        }
        if offset == 0 {
            return 0.0;
        }
        let lines = offset.div_ceil(line.per_line);
        lines as f64 * self.line_height
    }

    /// Assign boxes to an inline node and its descendants; returns the new
    /// character offset within the run
    fn layout_inline(&self, doc: &mut Document, node: NodeId, line: &LineBox, start: usize) -> usize {
        if let Some(text) = doc.tree().get(node).and_then(|n| n.as_text()) {
            return start + text.chars().count();
        }
        if !matches!(self.classify(doc, node), Flow::Inline | Flow::Block) {
            return start;
        }
        let mut offset = start;
        for child in doc.tree().child_ids(node) {
            offset = self.layout_inline(doc, child, line, offset);
        }
        doc.set_layout_rect(node, self.inline_rect(line, start, offset));
        offset
    }

    fn inline_rect(&self, line: &LineBox, start: usize, end: usize) -> DOMRect {
        let first_line = start / line.per_line;
        let last_line = end.saturating_sub(1).max(start) / line.per_line;
        let top = line.y + first_line as f64 * self.line_height;
        let height = (last_line - first_line + 1) as f64 * self.line_height;
        if first_line == last_line {
            let column = start % line.per_line;
            let len = (end - start).max(1);
            DOMRect::from_xywh(
                line.x + column as f64 * self.char_width,
                top,
                len as f64 * self.char_width,
                height,
            )
        } else {
            DOMRect::from_xywh(line.x, top, line.width, height)
        }
    }
}

enum Flow {
    Block,
    Inline,
    Skip,
}

struct LineBox {
    x: f64,
    y: f64,
    width: f64,
    per_line: usize,
}
