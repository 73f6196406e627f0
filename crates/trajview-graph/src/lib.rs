//! Flow-graph view of a trace.
//!
//! [`project`] turns a [`TraceModel`](trajview_trace::TraceModel) into nodes
//! and edges; a [`GraphLayout`] supplies positions.
//!
//! ```rust
//! use trajview_graph::{project, LayoutConfig, RankedLayout};
//! use trajview_trace::TraceModel;
//!
//! let text = r#"{"data":[{"object":"trace.span","id":"a"},{"object":"trace.span","id":"b","parent_id":"a"}]}"#;
//! let model = TraceModel::from_text(text).unwrap();
//! let config = LayoutConfig::default();
//! let graph = project(&model, None, &config).layout_with(&RankedLayout, &config);
//! assert_eq!(graph.edges[0].id, "a-b");
//! ```

mod layout;
mod projection;

pub use layout::{GraphLayout, LayoutConfig, LayoutNode, LayoutRequest, Point, RankDir, RankedLayout};
pub use projection::{project, FlowEdge, FlowGraph, FlowNode};
