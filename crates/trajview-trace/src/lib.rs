//! Trajectory file ingestion for trajview.
//!
//! Turns the line-delimited envelope written by an agent runtime into a
//! [`TraceModel`]: the header, the flat span list, an id lookup, and the span
//! forest. [`TraceSession`] holds the model currently on screen.
//!
//! ```rust
//! use trajview_trace::TraceModel;
//!
//! let text = r#"{"data":[{"object":"trace.span","id":"s1","parent_id":null}]}"#;
//! let model = TraceModel::from_text(text).unwrap();
//! assert_eq!(model.roots()[0].id(), "s1");
//! ```

mod error;
mod model;
pub mod parse;
mod session;
mod tree;
pub mod view;

pub use error::{ParseError, TraceLoadError};
pub use model::TraceModel;
pub use parse::{parse_records, Record};
pub use session::{LoadedTrace, TraceSession};
pub use tree::{build_forest, index_spans, SpanIndex, SpanNode, MAX_DEPTH};
pub use view::{timeline, DetailSection, SpanDetails, TimelineEntry, TraceSummary};
