//! Core domain types for trajview.
//!
//! This crate provides the records shared across the trajview crates:
//!
//! - [`Span`] and [`SpanData`]: one unit of recorded agent work and its typed payload
//! - [`TraceHeader`]: the record describing the whole run
//! - [`classify`]: the semantic kind of a span
//! - [`format`]: timestamp and duration rendering for display
//!
//! # Example
//!
//! ```rust
//! use trajview_core::{classify, Span};
//!
//! let span: Span = serde_json::from_value(serde_json::json!({
//!     "id": "span_1",
//!     "parent_id": null,
//!     "started_at": "2024-01-01T00:00:00Z",
//!     "ended_at": "2024-01-01T00:00:01.250Z",
//!     "span_data": { "type": "agent", "name": "Router" },
//! }))
//! .unwrap();
//!
//! assert_eq!(classify(Some(&span)), "agent");
//! assert_eq!(span.label(), "Router");
//! assert_eq!(span.duration(), "1.25s");
//! ```

pub mod format;
mod span;

pub use format::{calculate_duration, format_duration_ms, format_timestamp, format_timestamp_in};
pub use span::{
    classify, kind_color, AgentData, FunctionData, GenerationData, HandoffData, Message, Span,
    SpanData, ToolCall, ToolFunction, TraceHeader, Usage, AGENT_KIND, FUNCTION_KIND,
    GENERATION_KIND, HANDOFF_KIND, UNKNOWN_KIND,
};
