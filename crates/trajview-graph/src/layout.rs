//! Boundary to the graph-layout collaborator.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// Rank direction handed to the layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RankDir {
    #[default]
    #[serde(rename = "TB")]
    TopBottom,
    #[serde(rename = "LR")]
    LeftRight,
}

/// Node box size and spacing used for every flow graph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    #[serde(default = "default_node_width")]
    pub node_width: f64,
    #[serde(default = "default_node_height")]
    pub node_height: f64,
    /// Gap between consecutive ranks.
    #[serde(default = "default_rank_sep")]
    pub rank_sep: f64,
    /// Gap between neighbours within a rank.
    #[serde(default = "default_node_sep")]
    pub node_sep: f64,
    #[serde(default)]
    pub direction: RankDir,
}

fn default_node_width() -> f64 {
    250.0
}

fn default_node_height() -> f64 {
    80.0
}

fn default_rank_sep() -> f64 {
    100.0
}

fn default_node_sep() -> f64 {
    50.0
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: default_node_width(),
            node_height: default_node_height(),
            rank_sep: default_rank_sep(),
            node_sep: default_node_sep(),
            direction: RankDir::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutNode {
    pub id: String,
    pub width: f64,
    pub height: f64,
}

/// Everything a layered layout needs: spacing, node boxes, and directed edges.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutRequest {
    pub direction: RankDir,
    pub rank_sep: f64,
    pub node_sep: f64,
    pub nodes: Vec<LayoutNode>,
    /// `(source, target)` pairs.
    pub edges: Vec<(String, String)>,
}

/// A layered graph layout. Returns the center point of each node it placed.
pub trait GraphLayout: Send + Sync {
    fn layout(&self, request: &LayoutRequest) -> HashMap<String, Point>;
}

/// Minimal layered layout: rank is the depth below the nearest source, and
/// nodes keep request order within their rank, each rank centered on the
/// widest one. No crossing reduction.
#[derive(Debug, Clone, Copy, Default)]
pub struct RankedLayout;

impl GraphLayout for RankedLayout {
    fn layout(&self, request: &LayoutRequest) -> HashMap<String, Point> {
        let parents: HashMap<&str, &str> = request
            .edges
            .iter()
            .map(|(source, target)| (target.as_str(), source.as_str()))
            .collect();

        let mut ranks: Vec<Vec<&LayoutNode>> = Vec::new();
        for node in &request.nodes {
            let rank = depth(&parents, &node.id);
            if ranks.len() <= rank {
                ranks.resize_with(rank + 1, Vec::new);
            }
            ranks[rank].push(node);
        }

        let horizontal = request.direction == RankDir::TopBottom;
        // Extent of a node along the rank, and across it.
        let along = |n: &LayoutNode| if horizontal { n.width } else { n.height };
        let across = |n: &LayoutNode| if horizontal { n.height } else { n.width };

        let extent = |rank: &[&LayoutNode]| {
            let gaps = rank.len().saturating_sub(1) as f64 * request.node_sep;
            rank.iter().map(|&n| along(n)).sum::<f64>() + gaps
        };
        let widest = ranks.iter().map(|r| extent(r.as_slice())).fold(0.0, f64::max);

        let mut positions = HashMap::with_capacity(request.nodes.len());
        let mut rank_offset = 0.0;
        for rank in &ranks {
            let thickness = rank.iter().map(|&n| across(n)).fold(0.0, f64::max);
            let mut cursor = (widest - extent(rank.as_slice())) / 2.0;
            for &node in rank {
                let main = cursor + along(node) / 2.0;
                let cross = rank_offset + thickness / 2.0;
                let point = if horizontal { Point::new(main, cross) } else { Point::new(cross, main) };
                positions.insert(node.id.clone(), point);
                cursor += along(node) + request.node_sep;
            }
            rank_offset += thickness + request.rank_sep;
        }

        positions
    }
}

fn depth(parents: &HashMap<&str, &str>, id: &str) -> usize {
    let mut seen = HashSet::new();
    let mut current = id;
    let mut depth = 0;
    while let Some(&parent) = parents.get(current) {
        if !seen.insert(current) {
            break;
        }
        depth += 1;
        current = parent;
    }
    depth
}
