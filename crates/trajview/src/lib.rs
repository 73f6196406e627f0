//! Reconstructs AI-agent execution traces from trajectory files.
//!
//! A trajectory file holds one `{"data": [...]}` envelope per line, each a
//! mix of trace headers and spans. This crate re-exports the pieces that turn
//! it into a navigable model:
//!
//! - [`types`]: span types, kind classification, time formatting
//! - [`trace`]: parsing, the span forest, detail and timeline views, sessions
//! - [`graph`]: flow-graph projection and layout
//! - [`config`]: viewer settings
//!
//! ```rust
//! use trajview::prelude::*;
//!
//! let text = r#"{"data":[{"object":"trace","id":"t1"},{"object":"trace.span","id":"s1","started_at":"2024-01-01T00:00:00Z","ended_at":"2024-01-01T00:00:01Z"}]}"#;
//! let model = TraceModel::from_text(text).unwrap();
//! assert_eq!(model.summary().id, "t1");
//! assert_eq!(model.roots()[0].span.duration(), "1.00s");
//! ```

pub use trajview_config as config;
pub use trajview_core as types;
pub use trajview_graph as graph;
pub use trajview_trace as trace;

pub mod prelude {
    pub use trajview_config::{ConfigError, ViewerConfig};
    pub use trajview_core::{calculate_duration, format_duration_ms, format_timestamp, Span, SpanData, TraceHeader};
    pub use trajview_graph::{project, FlowGraph, GraphLayout, LayoutConfig, RankedLayout};
    pub use trajview_trace::{
        timeline, ParseError, SpanDetails, SpanNode, TraceLoadError, TraceModel, TraceSession, TraceSummary,
    };
}
