//! Projects a trace model onto the flow graph the viewer draws.

use std::collections::HashMap;

use serde::Serialize;
use trajview_core::{kind_color, HANDOFF_KIND};
use trajview_trace::TraceModel;

use crate::layout::{GraphLayout, LayoutConfig, LayoutNode, LayoutRequest, Point};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowNode {
    pub id: String,
    pub label: String,
    pub kind: String,
    pub color: String,
    pub duration: String,
    /// Set for the selected span only.
    pub emphasized: bool,
    pub width: f64,
    pub height: f64,
    /// Top-left corner of the node box. The origin until a layout is applied.
    pub position: Point,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    /// Set when the target is a handoff span.
    pub emphasized: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlowGraph {
    pub nodes: Vec<FlowNode>,
    pub edges: Vec<FlowEdge>,
}

/// One node per span and one edge per resolvable parent link, in file order.
///
/// Spans whose parent does not resolve become disconnected nodes.
pub fn project(model: &TraceModel, selected: Option<&str>, config: &LayoutConfig) -> FlowGraph {
    let mut graph = FlowGraph::default();

    for span in model.unique_spans() {
        let kind = span.kind();
        graph.nodes.push(FlowNode {
            id: span.id.clone(),
            label: span.label().to_string(),
            kind: kind.to_string(),
            color: kind_color(kind).to_string(),
            duration: span.duration(),
            emphasized: selected == Some(span.id.as_str()),
            width: config.node_width,
            height: config.node_height,
            position: Point::default(),
        });

        if let Some(parent) = span.parent().filter(|_| model.has_parent(span)) {
            graph.edges.push(FlowEdge {
                id: format!("{}-{}", parent, span.id),
                source: parent.to_string(),
                target: span.id.clone(),
                emphasized: kind == HANDOFF_KIND,
            });
        }
    }

    tracing::debug!(nodes = graph.nodes.len(), edges = graph.edges.len(), "Projected flow graph");
    graph
}

impl FlowGraph {
    pub fn layout_request(&self, config: &LayoutConfig) -> LayoutRequest {
        LayoutRequest {
            direction: config.direction,
            rank_sep: config.rank_sep,
            node_sep: config.node_sep,
            nodes: self
                .nodes
                .iter()
                .map(|node| LayoutNode {
                    id: node.id.clone(),
                    width: node.width,
                    height: node.height,
                })
                .collect(),
            edges: self
                .edges
                .iter()
                .map(|edge| (edge.source.clone(), edge.target.clone()))
                .collect(),
        }
    }

    /// Centers each node box on its anchor. Nodes without one are left where they are.
    pub fn apply_layout(&mut self, anchors: &HashMap<String, Point>) {
        for node in &mut self.nodes {
            if let Some(anchor) = anchors.get(&node.id) {
                node.position = Point::new(anchor.x - node.width / 2.0, anchor.y - node.height / 2.0);
            }
        }
    }

    /// Runs `layout` over this graph and applies the result.
    pub fn layout_with(mut self, layout: &dyn GraphLayout, config: &LayoutConfig) -> Self {
        let anchors = layout.layout(&self.layout_request(config));
        self.apply_layout(&anchors);
        self
    }
}
