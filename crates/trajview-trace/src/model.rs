//! The assembled, immutable trace model every view reads from.

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;
use trajview_core::{Span, TraceHeader};

use crate::error::TraceLoadError;
use crate::parse::{self, Record};
use crate::tree::{self, SpanIndex, SpanNode};
use crate::view::TraceSummary;

/// One trajectory file, parsed and reconstructed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TraceModel {
    trace: Option<TraceHeader>,
    spans: Vec<Arc<Span>>,
    spans_by_id: SpanIndex,
    trace_tree: Vec<SpanNode>,
}

impl TraceModel {
    /// Parses `text` and builds the model. No partial model is produced on failure.
    pub fn from_text(text: &str) -> Result<Self, TraceLoadError> {
        let records = parse::parse_records(text)?;
        Ok(Self::from_records(records))
    }

    /// Reads and parses a trajectory file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TraceLoadError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| TraceLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_text(&text)
    }

    /// Assembles a model from decoded records. The first header wins.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut trace = None;
        let mut spans = Vec::new();
        let mut ignored_headers = 0usize;

        for record in records {
            match record {
                Record::Trace(header) if trace.is_none() => trace = Some(header),
                Record::Trace(_) => ignored_headers += 1,
                Record::Span(span) => spans.push(Arc::new(span)),
                Record::Other(_) => {}
            }
        }

        if ignored_headers > 0 {
            tracing::warn!(ignored_headers, "Multiple trace headers, using the first");
        }

        let spans_by_id = tree::index_spans(&spans);
        let trace_tree = tree::build_forest(&spans, &spans_by_id);

        tracing::debug!(
            spans = spans.len(),
            roots = trace_tree.len(),
            "Assembled trace model"
        );

        Self {
            trace,
            spans,
            spans_by_id,
            trace_tree,
        }
    }

    pub fn header(&self) -> Option<&TraceHeader> {
        self.trace.as_ref()
    }

    /// Every span record in file order, duplicates included.
    pub fn spans(&self) -> &[Arc<Span>] {
        &self.spans
    }

    pub fn spans_by_id(&self) -> &SpanIndex {
        &self.spans_by_id
    }

    pub fn span(&self, id: &str) -> Option<&Arc<Span>> {
        self.spans_by_id.get(id)
    }

    /// Root nodes of the span forest.
    pub fn roots(&self) -> &[SpanNode] {
        &self.trace_tree
    }

    /// Spans in file order, skipping records superseded by a later duplicate id.
    pub fn unique_spans(&self) -> impl Iterator<Item = &Arc<Span>> + '_ {
        self.spans
            .iter()
            .filter(|span| tree::is_indexed(&self.spans_by_id, span))
    }

    /// Whether `span`'s parent id names a span in this trace.
    pub fn has_parent(&self, span: &Span) -> bool {
        span.parent().is_some_and(|p| self.spans_by_id.contains_key(p))
    }

    pub fn len(&self) -> usize {
        self.spans_by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans_by_id.is_empty()
    }

    pub fn summary(&self) -> TraceSummary {
        TraceSummary::of(self)
    }
}

impl FromStr for TraceModel {
    type Err = TraceLoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_text(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseError;
    use serde_json::json;

    const SCENARIO: &str = concat!(
        r#"{"data":[{"object":"trace","id":"t1","workflow_name":"demo"}]}"#,
        "\n",
        r#"{"data":[{"object":"trace.span","id":"s1","parent_id":null,"started_at":"2024-01-01T00:00:00Z","ended_at":"2024-01-01T00:00:01Z","span_data":{"type":"agent","name":"Router"}},{"object":"trace.span","id":"s2","parent_id":"s1","started_at":"2024-01-01T00:00:01Z","ended_at":"2024-01-01T00:00:02Z","span_data":{"type":"function","name":"lookup"}}]}"#,
    );

    #[test]
    fn test_end_to_end_scenario() {
        let model = TraceModel::from_text(SCENARIO).unwrap();

        assert_eq!(model.header().and_then(|h| h.id.as_deref()), Some("t1"));
        assert_eq!(model.spans().len(), 2);
        assert_eq!(model.roots().len(), 1);

        let root = &model.roots()[0];
        assert_eq!(root.id(), "s1");
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].id(), "s2");
        assert_eq!(root.span.duration(), "1.00s");
        assert_eq!(model.span("s2").map(|s| s.kind()), Some("function"));
    }

    #[test]
    fn test_from_str() {
        let model: TraceModel = SCENARIO.parse().unwrap();
        assert_eq!(model.len(), 2);
    }

    #[test]
    fn test_first_header_wins_and_unknown_records_ignored() {
        let text = [
            json!({ "data": [{ "object": "trace", "id": "first" }, { "object": "trace.event" }] }),
            json!({ "data": [{ "object": "trace", "id": "second" }, { "object": "trace.span", "id": "s" }] }),
        ]
        .map(|v| v.to_string())
        .join("\n");

        let model = TraceModel::from_text(&text).unwrap();
        assert_eq!(model.header().and_then(|h| h.id.as_deref()), Some("first"));
        assert_eq!(model.spans().len(), 1);
    }

    #[test]
    fn test_mistyped_headers_do_not_fail_the_load() {
        let text = json!({
            "data": [
                { "object": "trace", "id": "t1" },
                { "object": "trace", "id": 2, "workflow_name": { "nested": true } },
                { "object": "trace.span", "id": "s1" }
            ]
        })
        .to_string();
        let model = TraceModel::from_text(&text).unwrap();
        assert_eq!(model.header().and_then(|h| h.id.as_deref()), Some("t1"));
        assert_eq!(model.len(), 1);

        let text = json!({ "data": [{ "object": "trace", "id": 7 }, { "object": "trace.span", "id": "s1" }] }).to_string();
        let model = TraceModel::from_text(&text).unwrap();
        assert_eq!(model.summary().id, "7");
    }

    #[test]
    fn test_deep_parent_chain_loads() {
        let data: Vec<_> = (0..10_000)
            .map(|i| {
                let parent = if i == 0 { None } else { Some(format!("s{}", i - 1)) };
                json!({ "object": "trace.span", "id": format!("s{i}"), "parent_id": parent })
            })
            .collect();
        let text = json!({ "data": data }).to_string();

        let model = TraceModel::from_text(&text).unwrap();
        assert_eq!(model.len(), 10_000);
        assert_eq!(model.roots()[0].id(), "s0");
        assert_eq!(model.roots().iter().map(SpanNode::size).sum::<usize>(), 10_000);

        let value = serde_json::to_value(&model).unwrap();
        assert_eq!(value["trace_tree"][0]["children"][0]["id"], "s1");
        drop(model);
    }

    #[test]
    fn test_missing_header() {
        let text = json!({ "data": [{ "object": "trace.span", "id": "s" }] }).to_string();
        let model = TraceModel::from_text(&text).unwrap();
        assert!(model.header().is_none());
        assert_eq!(model.roots().len(), 1);
    }

    #[test]
    fn test_duplicates_in_flat_list_but_not_lookup() {
        let text = json!({
            "data": [
                { "object": "trace.span", "id": "a", "span_data": { "type": "agent", "name": "old" } },
                { "object": "trace.span", "id": "b" },
                { "object": "trace.span", "id": "a", "span_data": { "type": "agent", "name": "new" } }
            ]
        })
        .to_string();

        let model = TraceModel::from_text(&text).unwrap();
        assert_eq!(model.spans().len(), 3);
        assert_eq!(model.len(), 2);
        assert_eq!(model.span("a").and_then(|s| s.name()), Some("new"));

        let unique: Vec<&str> = model.unique_spans().map(|s| s.id.as_str()).collect();
        assert_eq!(unique, vec!["b", "a"]);
    }

    #[test]
    fn test_parse_failure_is_a_load_error() {
        let err = TraceModel::from_text("{\"data\": [}").unwrap_err();
        assert!(matches!(err, TraceLoadError::Parse(ParseError::InvalidJson { line: 1, .. })));
    }

    #[test]
    fn test_from_missing_path() {
        let err = TraceModel::from_path("/definitely/not/here.traj").unwrap_err();
        assert!(matches!(err, TraceLoadError::Io { .. }));
    }

    #[test]
    fn test_model_serializes_with_tree() {
        let model = TraceModel::from_text(SCENARIO).unwrap();
        let value = serde_json::to_value(&model).unwrap();
        assert_eq!(value["trace"]["workflow_name"], "demo");
        assert_eq!(value["spans"].as_array().map(Vec::len), Some(2));
        assert_eq!(value["spans_by_id"]["s2"]["parent_id"], "s1");
        assert_eq!(value["trace_tree"][0]["children"][0]["id"], "s2");
    }
}
