//! Display-ready projections of a trace: header summary, span details, timeline.

use serde::Serialize;
use serde_json::Value;
use trajview_core::format::{display_value, parse_timestamp};
use trajview_core::{
    format_timestamp, kind_color, Message, Span, SpanData, AGENT_KIND, FUNCTION_KIND, HANDOFF_KIND,
};

use crate::model::TraceModel;

/// Header line of the viewer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceSummary {
    pub name: String,
    pub id: String,
    pub span_count: usize,
    pub root_count: usize,
}

impl TraceSummary {
    pub fn of(model: &TraceModel) -> Self {
        let (name, id) = match model.header() {
            Some(header) => (header.display_name(), header.display_id()),
            None => ("Agent Trace", "Unknown"),
        };
        Self {
            name: name.to_string(),
            id: id.to_string(),
            span_count: model.len(),
            root_count: model.roots().len(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Span Details
// ─────────────────────────────────────────────────────────────────────────────

/// Everything the details panel shows for one span.
#[derive(Debug, Clone, Serialize)]
pub struct SpanDetails {
    pub id: String,
    pub parent_id: Option<String>,
    /// Agent name for agent spans, otherwise the kind.
    pub title: String,
    pub kind: String,
    pub duration: String,
    pub started: String,
    pub ended: String,
    /// Kind-specific fields; `None` for opaque payloads.
    pub section: Option<DetailSection>,
    /// The span as it appeared in the file.
    pub raw: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DetailSection {
    Agent {
        name: Option<String>,
        handoffs: Vec<String>,
        tools: Vec<String>,
        output_type: Option<String>,
    },
    Generation {
        model: Option<String>,
        input_tokens: Option<u64>,
        output_tokens: Option<u64>,
        input: Vec<MessageView>,
        output: Vec<MessageView>,
    },
    Function {
        name: Option<String>,
        input: Option<String>,
        output: Option<String>,
    },
    Handoff {
        from_agent: Option<String>,
        to_agent: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageView {
    pub role: Option<String>,
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCallView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolCallView {
    pub name: Option<String>,
    pub arguments: Option<String>,
}

impl SpanDetails {
    pub fn from_span(span: &Span) -> Self {
        Self {
            id: span.id.clone(),
            parent_id: span.parent().map(str::to_string),
            title: span.label().to_string(),
            kind: span.kind().to_string(),
            duration: span.duration(),
            started: format_timestamp(span.started_at.as_deref()),
            ended: format_timestamp(span.ended_at.as_deref()),
            section: span.span_data.as_ref().and_then(DetailSection::from_data),
            raw: serde_json::to_value(span).unwrap_or_default(),
        }
    }
}

impl DetailSection {
    fn from_data(data: &SpanData) -> Option<Self> {
        let section = match data {
            SpanData::Agent(agent) => DetailSection::Agent {
                name: agent.name.clone(),
                handoffs: agent.handoffs.clone(),
                tools: agent.tools.clone(),
                output_type: agent.output_type.clone(),
            },
            SpanData::Generation(generation) => {
                let usage = generation.usage.as_ref();
                DetailSection::Generation {
                    model: generation.model.clone(),
                    input_tokens: usage.and_then(|u| u.input_tokens),
                    output_tokens: usage.and_then(|u| u.output_tokens),
                    input: generation.input.iter().map(MessageView::from_message).collect(),
                    output: generation.output.iter().map(MessageView::from_message).collect(),
                }
            }
            SpanData::Function(function) => DetailSection::Function {
                name: function.name.clone(),
                input: shown(function.input.as_ref()),
                output: shown(function.output.as_ref()),
            },
            SpanData::Handoff(handoff) => DetailSection::Handoff {
                from_agent: handoff.from_agent.clone(),
                to_agent: handoff.to_agent.clone(),
            },
            SpanData::Other(_) => return None,
        };
        Some(section)
    }
}

impl MessageView {
    fn from_message(message: &Message) -> Self {
        Self {
            role: message.role.clone(),
            content: message.content_text(),
            tool_calls: message
                .tool_calls
                .iter()
                .map(|call| ToolCallView {
                    name: call.display_name().map(str::to_string),
                    arguments: shown(call.function.as_ref().and_then(|f| f.arguments.as_ref())),
                })
                .collect(),
        }
    }
}

/// Display text for an optional payload value; null and empty strings are hidden.
fn shown(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        other => Some(display_value(other)),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Timeline
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineEntry {
    pub id: String,
    /// Payload name when present, otherwise the kind.
    pub title: String,
    pub kind: String,
    pub color: &'static str,
    pub started: String,
    pub ended: String,
    pub duration: String,
    /// `Agent: X`, `Handoff: A → B`, `Function: f`, or empty.
    pub summary: String,
    pub selected: bool,
}

/// Spans in start-time order. Ties keep file order; spans without a
/// readable start time come last.
pub fn timeline(model: &TraceModel, selected: Option<&str>) -> Vec<TimelineEntry> {
    let mut spans: Vec<(Option<i64>, &Span)> = model
        .unique_spans()
        .map(|span| (start_millis(span), span.as_ref()))
        .collect();
    spans.sort_by_key(|(start, _)| (start.is_none(), *start));

    spans
        .into_iter()
        .map(|(_, span)| TimelineEntry {
            id: span.id.clone(),
            title: span.name().unwrap_or_else(|| span.kind()).to_string(),
            kind: span.kind().to_string(),
            color: kind_color(span.kind()),
            started: format_timestamp(span.started_at.as_deref()),
            ended: format_timestamp(span.ended_at.as_deref()),
            duration: span.duration(),
            summary: summary_line(span),
            selected: selected == Some(span.id.as_str()),
        })
        .collect()
}

fn start_millis(span: &Span) -> Option<i64> {
    span.started_at
        .as_deref()
        .and_then(parse_timestamp)
        .map(|dt| dt.timestamp_millis())
}

fn summary_line(span: &Span) -> String {
    let name = span.name().unwrap_or_default();
    match (span.kind(), &span.span_data) {
        (_, Some(SpanData::Handoff(handoff))) => format!(
            "Handoff: {} → {}",
            handoff.from_agent.as_deref().unwrap_or_default(),
            handoff.to_agent.as_deref().unwrap_or_default()
        ),
        (AGENT_KIND, _) => format!("Agent: {name}"),
        (FUNCTION_KIND, _) => format!("Function: {name}"),
        (HANDOFF_KIND, _) => "Handoff: ".to_string(),
        _ => String::new(),
    }
}
