//! Headless graph canvas.
//!
//! Owns the elements currently on screen, their positions, and two
//! orthogonal overlays: visibility (type filter) and highlighting (search).
//! The UI crate paints whatever this holds; it never mutates the graph
//! directly.
//!
//! ```text
//! set_graph ──► nodes/edges + positions ──► paint
//!                      │
//!     apply_type_filter ─► hidden set
//!     highlight         ─► highlighted set
//!     fit               ─► viewport target
//! ```

use serde_json::Value;
use std::collections::{BTreeSet, HashMap, HashSet};

use crate::layout::{run_layout, Bounds, LayoutKind, Point};
use crate::model::{GraphEdge, GraphElements, GraphNode, NodeCategory, Payload};

/// Padding around a fitted selection, in world units.
pub const FIT_PADDING: f32 = 60.0;

/// Title attached to edge payloads.
pub const EDGE_TITLE: &str = "Edge";

// =============================================================================
// STYLE
// =============================================================================

/// Plain RGB colour; the UI converts it to its own colour type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const fn hex(value: u32) -> Self {
        Self((value >> 16) as u8, (value >> 8) as u8, value as u8)
    }
}

pub const PACKAGE_COLOR: Rgb = Rgb::hex(0x2da44e);
pub const MODULE_COLOR: Rgb = Rgb::hex(0x8250df);
pub const DATASET_COLOR: Rgb = Rgb::hex(0xd29922);
pub const GENERIC_COLOR: Rgb = Rgb::hex(0x1f6feb);
pub const HIGHLIGHT_COLOR: Rgb = Rgb::hex(0xfb8500);
pub const EDGE_COLOR: Rgb = Rgb::hex(0x8c959f);

/// Fill colour for a node category.
pub fn category_color(category: NodeCategory) -> Rgb {
    match category {
        NodeCategory::Package => PACKAGE_COLOR,
        NodeCategory::Module => MODULE_COLOR,
        NodeCategory::Dataset => DATASET_COLOR,
        NodeCategory::Generic => GENERIC_COLOR,
    }
}

/// Resolved paint style of one node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeStyle {
    pub fill: Rgb,
    pub border: Option<Rgb>,
    pub border_width: f32,
}

// =============================================================================
// CANVAS
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct GraphCanvas {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
    node_index: HashMap<String, usize>,
    positions: HashMap<String, Point>,
    layout: Option<LayoutKind>,
    hidden: HashSet<String>,
    highlighted: HashSet<String>,
    active_types: BTreeSet<String>,
    viewport: Option<Bounds>,
}

impl GraphCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove every element and overlay.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Replace the graph: nodes, then edges, then layout. Overlays reset and
    /// every present type becomes active.
    pub fn set_graph(&mut self, elements: &GraphElements, layout: LayoutKind) {
        self.clear();

        for node in &elements.nodes {
            if self.node_index.contains_key(&node.id) {
                tracing::warn!(id = %node.id, "duplicate node id, keeping first");
                continue;
            }
            self.node_index.insert(node.id.clone(), self.nodes.len());
            self.nodes.push(node.clone());
        }

        for edge in &elements.edges {
            if !self.node_index.contains_key(&edge.source) || !self.node_index.contains_key(&edge.target) {
                tracing::warn!(
                    id = %edge.id,
                    source = %edge.source,
                    target = %edge.target,
                    "dropping edge with missing endpoint"
                );
                continue;
            }
            self.edges.push(edge.clone());
        }

        self.positions = run_layout(layout, &self.nodes, &self.edges);
        self.layout = Some(layout);
        self.active_types = self.node_types();
        self.viewport = self.bounds_of(self.nodes.iter().map(|n| n.id.as_str()));

        tracing::debug!(
            nodes = self.nodes.len(),
            edges = self.edges.len(),
            layout = layout.as_str(),
            "canvas populated"
        );
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.node_index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn edge(&self, id: &str) -> Option<&GraphEdge> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn layout(&self) -> Option<LayoutKind> {
        self.layout
    }

    pub fn position(&self, id: &str) -> Option<Point> {
        self.positions.get(id).copied()
    }

    /// Distinct node types present, sorted.
    pub fn node_types(&self) -> BTreeSet<String> {
        self.nodes.iter().map(|n| n.node_type.clone()).collect()
    }

    pub fn active_types(&self) -> &BTreeSet<String> {
        &self.active_types
    }

    // -------------------------------------------------------------------------
    // Visibility
    // -------------------------------------------------------------------------

    /// Hide nodes whose type is not in `active`. Elements stay on the canvas.
    pub fn apply_type_filter(&mut self, active: &BTreeSet<String>) {
        self.active_types = active.clone();
        self.hidden = self
            .nodes
            .iter()
            .filter(|n| !active.contains(&n.node_type))
            .map(|n| n.id.clone())
            .collect();
    }

    pub fn is_hidden(&self, node_id: &str) -> bool {
        self.hidden.contains(node_id)
    }

    /// An edge is hidden when either endpoint is.
    pub fn is_edge_hidden(&self, edge: &GraphEdge) -> bool {
        self.is_hidden(&edge.source) || self.is_hidden(&edge.target)
    }

    pub fn visible_nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.iter().filter(|n| !self.is_hidden(&n.id))
    }

    pub fn visible_edges(&self) -> impl Iterator<Item = &GraphEdge> {
        self.edges.iter().filter(|e| !self.is_edge_hidden(e))
    }

    // -------------------------------------------------------------------------
    // Highlighting
    // -------------------------------------------------------------------------

    pub fn clear_highlights(&mut self) {
        self.highlighted.clear();
    }

    /// Add `ids` to the highlighted set. Unknown ids are ignored.
    pub fn highlight<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) {
        for id in ids {
            if self.node_index.contains_key(id) {
                self.highlighted.insert(id.to_string());
            }
        }
    }

    pub fn is_highlighted(&self, node_id: &str) -> bool {
        self.highlighted.contains(node_id)
    }

    pub fn highlighted_count(&self) -> usize {
        self.highlighted.len()
    }

    // -------------------------------------------------------------------------
    // Viewport
    // -------------------------------------------------------------------------

    /// Set the viewport target to the bounding box of `ids`. Returns false and
    /// leaves the viewport alone when none of them are on the canvas.
    pub fn fit<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) -> bool {
        match self.bounds_of(ids) {
            Some(bounds) => {
                self.viewport = Some(bounds);
                true
            }
            None => false,
        }
    }

    pub fn viewport(&self) -> Option<Bounds> {
        self.viewport
    }

    fn bounds_of<'a>(&self, ids: impl IntoIterator<Item = &'a str>) -> Option<Bounds> {
        let points = ids.into_iter().filter_map(|id| self.position(id));
        Bounds::around(points, FIT_PADDING)
    }

    // -------------------------------------------------------------------------
    // Taps and styling
    // -------------------------------------------------------------------------

    /// Payload of a tapped node.
    pub fn tap_node(&self, id: &str) -> Option<Payload> {
        self.node(id).map(GraphNode::payload)
    }

    /// Payload of a tapped edge, titled "Edge".
    pub fn tap_edge(&self, id: &str) -> Option<Payload> {
        let mut payload = self.edge(id)?.payload();
        payload.insert("title".into(), Value::String(EDGE_TITLE.to_string()));
        Some(payload)
    }

    pub fn node_style(&self, node: &GraphNode) -> NodeStyle {
        let highlighted = self.is_highlighted(&node.id);
        NodeStyle {
            fill: category_color(node.category()),
            border: highlighted.then_some(HIGHLIGHT_COLOR),
            border_width: if highlighted { 3.0 } else { 0.0 },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn elements() -> GraphElements {
        let edge = |id: &str, s: &str, t: &str| GraphEdge {
            id: id.into(),
            source: s.into(),
            target: t.into(),
            label: "edge".into(),
            edge_type: "edge".into(),
        };
        GraphElements {
            nodes: vec![
                GraphNode::new("pkg", "pkg", "package"),
                GraphNode::new("mod_a", "mod_a", "module"),
                GraphNode::new("mod_b", "mod_b", "module"),
                GraphNode::new("mod_a", "mod_a_dup", "module"),
            ],
            edges: vec![
                edge("e0", "pkg", "mod_a"),
                edge("e1", "mod_a", "mod_b"),
                edge("e2", "mod_b", "missing"),
            ],
        }
    }

    fn canvas() -> GraphCanvas {
        let mut canvas = GraphCanvas::new();
        canvas.set_graph(&elements(), LayoutKind::Breadthfirst);
        canvas
    }

    #[test]
    fn test_set_graph_dedupes_and_drops_dangling() {
        let c = canvas();
        assert_eq!(c.nodes().len(), 3);
        assert_eq!(c.node("mod_a").unwrap().name, "mod_a");
        assert_eq!(c.edges().len(), 2);
        assert!(c.edges().iter().all(|e| c.node(&e.source).is_some() && c.node(&e.target).is_some()));
        assert!(c.nodes().iter().all(|n| c.position(&n.id).is_some()));
    }

    #[test]
    fn test_type_filter_hides_nodes_and_their_edges() {
        let mut c = canvas();
        c.apply_type_filter(&BTreeSet::from(["module".to_string()]));
        assert!(c.is_hidden("pkg"));
        assert!(!c.is_hidden("mod_a"));
        let visible: Vec<_> = c.visible_edges().map(|e| e.id.as_str()).collect();
        assert_eq!(visible, vec!["e1"]);
        assert_eq!(c.nodes().len(), 3);
    }

    #[test]
    fn test_highlight_independent_of_visibility() {
        let mut c = canvas();
        c.highlight(["pkg", "nope"]);
        c.apply_type_filter(&BTreeSet::new());
        assert!(c.is_highlighted("pkg"));
        assert_eq!(c.highlighted_count(), 1);
        c.clear_highlights();
        assert_eq!(c.highlighted_count(), 0);
        assert!(c.is_hidden("pkg"));
    }

    #[test]
    fn test_set_graph_resets_overlays() {
        let mut c = canvas();
        c.highlight(["pkg"]);
        c.apply_type_filter(&BTreeSet::new());
        c.set_graph(&elements(), LayoutKind::Cose);
        assert_eq!(c.highlighted_count(), 0);
        assert!(c.visible_nodes().count() == 3);
        assert_eq!(c.active_types(), &c.node_types());
    }

    #[test]
    fn test_fit_padding() {
        let mut c = canvas();
        assert!(c.fit(["mod_a"]));
        let vp = c.viewport().unwrap();
        assert_eq!(vp.width(), 2.0 * FIT_PADDING);
        assert!(!c.fit(["ghost"]));
    }

    #[test]
    fn test_taps() {
        let c = canvas();
        let node = c.tap_node("pkg").unwrap();
        assert_eq!(node["type"], json!("package"));
        let edge = c.tap_edge("e1").unwrap();
        assert_eq!(edge["title"], json!("Edge"));
        assert_eq!(edge["source"], json!("mod_a"));
        assert!(c.tap_edge("e2").is_none());
    }

    #[test]
    fn test_styles() {
        let mut c = canvas();
        c.highlight(["mod_a"]);
        let style = c.node_style(c.node("mod_a").unwrap());
        assert_eq!(style.fill, Rgb(0x82, 0x50, 0xdf));
        assert_eq!(style.border, Some(HIGHLIGHT_COLOR));
        let style = c.node_style(c.node("pkg").unwrap());
        assert_eq!(style.fill, PACKAGE_COLOR);
        assert_eq!(style.border, None);
    }
}
