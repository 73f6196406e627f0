//! Line-delimited envelope decoding.
//!
//! A trajectory file holds one JSON object per line, each carrying a `data`
//! array of records. Records are tagged by their `object` field.

use serde::Deserialize;
use serde_json::Value;
use trajview_core::{Span, TraceHeader};

use crate::error::ParseError;

pub const TRACE_OBJECT: &str = "trace";
pub const SPAN_OBJECT: &str = "trace.span";

/// One entry of an envelope's `data` array.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Trace(TraceHeader),
    Span(Span),
    /// Any other `object` tag, kept so newer runtimes don't break older viewers.
    Other(Value),
}

impl Record {
    pub fn object(&self) -> Option<&str> {
        match self {
            Record::Trace(_) => Some(TRACE_OBJECT),
            Record::Span(_) => Some(SPAN_OBJECT),
            Record::Other(value) => value.get("object").and_then(Value::as_str),
        }
    }
}

/// Decodes every record in `text`, in line order then array order.
pub fn parse_records(text: &str) -> Result<Vec<Record>, ParseError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let lines: Vec<&str> = text.lines().collect();

    let first = lines
        .iter()
        .position(|l| !l.trim().is_empty())
        .ok_or(ParseError::Empty)?;
    let last = lines
        .iter()
        .rposition(|l| !l.trim().is_empty())
        .unwrap_or(first);

    let mut records = Vec::new();
    for (offset, content) in lines[first..=last].iter().enumerate() {
        let line = first + offset + 1;
        for (index, value) in parse_line(line, content)?.into_iter().enumerate() {
            records.push(decode_record(line, index, value)?);
        }
    }

    tracing::debug!(
        lines = last - first + 1,
        records = records.len(),
        "Parsed trace envelope"
    );
    Ok(records)
}

fn parse_line(line: usize, content: &str) -> Result<Vec<Value>, ParseError> {
    let value: Value =
        serde_json::from_str(content).map_err(|source| ParseError::InvalidJson { line, source })?;
    let Value::Object(mut envelope) = value else {
        return Err(ParseError::NotAnObject { line });
    };

    match envelope.remove("data") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(ParseError::DataNotArray { line }),
    }
}

fn decode_record(line: usize, index: usize, value: Value) -> Result<Record, ParseError> {
    let invalid = |object: &'static str, source: serde_json::Error| ParseError::InvalidRecord {
        line,
        index,
        object,
        source,
    };

    match value.get("object").and_then(Value::as_str) {
        Some(TRACE_OBJECT) => Ok(Record::Trace(TraceHeader::from_value(value))),
        Some(SPAN_OBJECT) => Span::deserialize(&value)
            .map(Record::Span)
            .map_err(|e| invalid(SPAN_OBJECT, e)),
        _ => Ok(Record::Other(value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn span_line(ids: &[&str]) -> String {
        let data: Vec<Value> = ids
            .iter()
            .map(|id| json!({ "object": "trace.span", "id": id, "parent_id": null, "span_data": { "type": "function" } }))
            .collect();
        json!({ "data": data }).to_string()
    }

    fn ids(records: &[Record]) -> Vec<String> {
        records
            .iter()
            .filter_map(|r| match r {
                Record::Span(span) => Some(span.id.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_records_are_flattened_in_order() {
        let text = [
            span_line(&["a", "b"]),
            r#"{"data": []}"#.to_string(),
            r#"{"other": 1}"#.to_string(),
            r#"{"data": null}"#.to_string(),
            span_line(&["c", "d", "e"]),
        ]
        .join("\n");

        let records = parse_records(&text).unwrap();
        assert_eq!(records.len(), 5);
        assert_eq!(ids(&records), vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_header_and_unknown_tags() {
        let text = json!({
            "data": [
                { "object": "trace", "id": "t1", "workflow_name": "demo" },
                { "object": "trace.event", "id": "ev1" },
                { "id": "untagged" },
                42,
                { "object": "trace.span", "id": "s1" }
            ]
        })
        .to_string();

        let records = parse_records(&text).unwrap();
        assert_eq!(records.len(), 5);
        assert!(matches!(&records[0], Record::Trace(h) if h.id.as_deref() == Some("t1")));
        assert_eq!(records[1].object(), Some("trace.event"));
        assert_eq!(records[2].object(), None);
        assert!(matches!(records[3], Record::Other(_)));
        assert_eq!(records[4].object(), Some(SPAN_OBJECT));
    }

    #[test]
    fn test_blank_edges_and_crlf_are_ignored() {
        let text = format!("\n  \r\n{}\r\n{}\r\n\n\n", span_line(&["a"]), span_line(&["b"]));
        let records = parse_records(&text).unwrap();
        assert_eq!(ids(&records), vec!["a", "b"]);
    }

    #[test]
    fn test_byte_order_mark_is_skipped() {
        let text = format!("\u{feff}{}", span_line(&["a"]));
        assert_eq!(ids(&parse_records(&text).unwrap()), vec!["a"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(parse_records(""), Err(ParseError::Empty)));
        assert!(matches!(parse_records(" \n\t\n"), Err(ParseError::Empty)));
    }

    #[test]
    fn test_invalid_json_reports_line() {
        let text = format!("\n{}\n{{\"data\": [\n", span_line(&["a"]));
        match parse_records(&text) {
            Err(ParseError::InvalidJson { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected invalid JSON error, got {other:?}"),
        }
    }

    #[test]
    fn test_interior_blank_line_is_an_error() {
        let text = format!("{}\n\n{}", span_line(&["a"]), span_line(&["b"]));
        assert!(matches!(parse_records(&text), Err(ParseError::InvalidJson { line: 2, .. })));
    }

    #[test]
    fn test_envelope_shape_errors() {
        assert!(matches!(parse_records("[1, 2]"), Err(ParseError::NotAnObject { line: 1 })));
        assert!(matches!(
            parse_records(r#"{"data": {"object": "trace"}}"#),
            Err(ParseError::DataNotArray { line: 1 })
        ));
    }

    #[test]
    fn test_span_without_id_is_rejected() {
        let text = json!({ "data": [{ "object": "trace.span", "id": "ok" }, { "object": "trace.span", "parent_id": "ok" }] })
            .to_string();
        match parse_records(&text) {
            Err(ParseError::InvalidRecord { line, index, object, .. }) => {
                assert_eq!((line, index, object), (1, 1, SPAN_OBJECT));
            }
            other => panic!("expected invalid record error, got {other:?}"),
        }
    }
}
