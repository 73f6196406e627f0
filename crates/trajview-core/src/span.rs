//! Span and trace header records as they appear in trajectory files.

use serde::de::Deserializer;
use serde::ser::{self, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::format;

/// Kind reported for spans without a usable `span_data.type`.
pub const UNKNOWN_KIND: &str = "unknown";
pub const AGENT_KIND: &str = "agent";
pub const GENERATION_KIND: &str = "generation";
pub const FUNCTION_KIND: &str = "function";
pub const HANDOFF_KIND: &str = "handoff";

/// Returns the semantic kind of a span, or `"unknown"` when there is none.
pub fn classify(span: Option<&Span>) -> &str {
    span.map_or(UNKNOWN_KIND, Span::kind)
}

/// Display color for a span kind.
pub fn kind_color(kind: &str) -> &'static str {
    match kind {
        AGENT_KIND => "#3498db",
        GENERATION_KIND => "#2ecc71",
        FUNCTION_KIND => "#e74c3c",
        HANDOFF_KIND => "#9b59b6",
        _ => "#95a5a6",
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Trace Header
// ─────────────────────────────────────────────────────────────────────────────

/// The single record describing a whole agent run.
///
/// Decoding never fails. Scalar ids and names are read as text; a field of
/// any other shape stays in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TraceHeader {
    /// Trace identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Workflow name for display.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_name: Option<String>,
    /// Conversation or thread grouping, when the runtime sets one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    /// Free-form run metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    /// Every other field of the record, preserved as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TraceHeader {
    pub fn from_value(value: Value) -> Self {
        let Value::Object(mut extra) = value else {
            return Self::default();
        };
        Self {
            id: take_text(&mut extra, "id"),
            workflow_name: take_text(&mut extra, "workflow_name"),
            group_id: take_text(&mut extra, "group_id"),
            metadata: extra.remove("metadata").filter(|v| !v.is_null()),
            extra,
        }
    }

    pub fn display_name(&self) -> &str {
        non_empty(self.workflow_name.as_deref()).unwrap_or("Agent Trace")
    }

    pub fn display_id(&self) -> &str {
        non_empty(self.id.as_deref()).unwrap_or("Unknown")
    }
}

impl<'de> Deserialize<'de> for TraceHeader {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(TraceHeader::from_value)
    }
}

/// Removes `key` from `map` when it holds null or a scalar, returning the scalar as text.
fn take_text(map: &mut Map<String, Value>, key: &str) -> Option<String> {
    let text = match map.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(_) | Value::Object(_) => return None,
    };
    map.remove(key);
    text
}

// ─────────────────────────────────────────────────────────────────────────────
// Span
// ─────────────────────────────────────────────────────────────────────────────

/// One unit of recorded work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    /// Unique span identifier within the trace.
    pub id: String,
    /// Identifier of the enclosing span; absent for roots.
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    /// ISO-8601 start time.
    #[serde(default)]
    pub started_at: Option<String>,
    /// ISO-8601 end time; null while the span is in flight.
    #[serde(default)]
    pub ended_at: Option<String>,
    /// Typed payload selected by its `type` field.
    #[serde(default)]
    pub span_data: Option<SpanData>,
    /// Every other field of the record, preserved as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Span {
    /// The parent span id, treating an empty string as absent.
    pub fn parent(&self) -> Option<&str> {
        non_empty(self.parent_id.as_deref())
    }

    pub fn kind(&self) -> &str {
        self.span_data.as_ref().map_or(UNKNOWN_KIND, SpanData::kind)
    }

    /// The payload's `name`, for agent and function spans and opaque payloads carrying one.
    pub fn name(&self) -> Option<&str> {
        self.span_data.as_ref().and_then(SpanData::name)
    }

    /// Agent spans are labelled by agent name, everything else by kind.
    pub fn label(&self) -> &str {
        match &self.span_data {
            Some(SpanData::Agent(agent)) => non_empty(agent.name.as_deref()).unwrap_or(AGENT_KIND),
            _ => self.kind(),
        }
    }

    pub fn duration(&self) -> String {
        format::calculate_duration(self.started_at.as_deref(), self.ended_at.as_deref())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Span Payloads
// ─────────────────────────────────────────────────────────────────────────────

/// The polymorphic `span_data` payload.
///
/// Known kinds decode into their own variant. Unknown kinds, and known kinds
/// whose fields do not have the expected JSON types, are kept verbatim in
/// [`SpanData::Other`].
#[derive(Debug, Clone, PartialEq)]
pub enum SpanData {
    Agent(AgentData),
    Generation(GenerationData),
    Function(FunctionData),
    Handoff(HandoffData),
    Other(Value),
}

impl SpanData {
    pub fn from_value(value: Value) -> Self {
        let typed = match value.get("type").and_then(Value::as_str) {
            Some(AGENT_KIND) => AgentData::deserialize(&value).map(SpanData::Agent).ok(),
            Some(GENERATION_KIND) => GenerationData::deserialize(&value).map(SpanData::Generation).ok(),
            Some(FUNCTION_KIND) => FunctionData::deserialize(&value).map(SpanData::Function).ok(),
            Some(HANDOFF_KIND) => HandoffData::deserialize(&value).map(SpanData::Handoff).ok(),
            _ => None,
        };
        typed.unwrap_or(SpanData::Other(value))
    }

    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        let (kind, mut value) = match self {
            SpanData::Agent(data) => (AGENT_KIND, serde_json::to_value(data)?),
            SpanData::Generation(data) => (GENERATION_KIND, serde_json::to_value(data)?),
            SpanData::Function(data) => (FUNCTION_KIND, serde_json::to_value(data)?),
            SpanData::Handoff(data) => (HANDOFF_KIND, serde_json::to_value(data)?),
            SpanData::Other(value) => return Ok(value.clone()),
        };
        if let Value::Object(map) = &mut value {
            map.insert("type".to_string(), Value::String(kind.to_string()));
        }
        Ok(value)
    }

    pub fn kind(&self) -> &str {
        match self {
            SpanData::Agent(_) => AGENT_KIND,
            SpanData::Generation(_) => GENERATION_KIND,
            SpanData::Function(_) => FUNCTION_KIND,
            SpanData::Handoff(_) => HANDOFF_KIND,
            SpanData::Other(value) => {
                non_empty(value.get("type").and_then(Value::as_str)).unwrap_or(UNKNOWN_KIND)
            }
        }
    }

    pub fn name(&self) -> Option<&str> {
        let name = match self {
            SpanData::Agent(data) => data.name.as_deref(),
            SpanData::Function(data) => data.name.as_deref(),
            SpanData::Generation(data) => data.extra.get("name").and_then(Value::as_str),
            SpanData::Handoff(data) => data.extra.get("name").and_then(Value::as_str),
            SpanData::Other(value) => value.get("name").and_then(Value::as_str),
        };
        non_empty(name)
    }
}

impl<'de> Deserialize<'de> for SpanData {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(SpanData::from_value)
    }
}

impl Serialize for SpanData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().map_err(ser::Error::custom)?.serialize(serializer)
    }
}

/// Payload of an `agent` span.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Names of agents this agent may hand off to.
    #[serde(default, deserialize_with = "null_as_default")]
    pub handoffs: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tools: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_type: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Payload of a `generation` span: one model call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub input: Vec<Message>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub output: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_config: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Token counters reported for a generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_tokens: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A chat message on either side of a generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Text content, or structured content parts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Message {
    /// Content rendered for display; `None` when the message has no content.
    pub fn content_text(&self) -> Option<String> {
        match &self.content {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s.is_empty() => None,
            Some(value) => Some(format::display_value(value)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub call_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<ToolFunction>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ToolCall {
    /// The called function's name, falling back to the call type.
    pub fn display_name(&self) -> Option<&str> {
        let name = self.function.as_ref().and_then(|f| non_empty(f.name.as_deref()));
        name.or_else(|| non_empty(self.call_type.as_deref()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolFunction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Usually a JSON-encoded string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Payload of a `function` span: one tool invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Payload of a `handoff` span: control moving between agents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HandoffData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_agent: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn span(value: Value) -> Span {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_classify_without_span_data() {
        let s = span(json!({ "id": "s1" }));
        assert_eq!(classify(Some(&s)), UNKNOWN_KIND);
        assert_eq!(classify(None), UNKNOWN_KIND);

        let s = span(json!({ "id": "s1", "span_data": null }));
        assert_eq!(s.kind(), UNKNOWN_KIND);
    }

    #[test]
    fn test_classify_missing_or_odd_type() {
        assert_eq!(span(json!({ "id": "a", "span_data": {} })).kind(), UNKNOWN_KIND);
        assert_eq!(span(json!({ "id": "a", "span_data": { "type": "" } })).kind(), UNKNOWN_KIND);
        assert_eq!(span(json!({ "id": "a", "span_data": { "type": 7 } })).kind(), UNKNOWN_KIND);
    }

    #[test]
    fn test_known_variants_decode() {
        let agent = span(json!({
            "id": "a",
            "span_data": {
                "type": "agent",
                "name": "Triage",
                "handoffs": ["Billing", "Support"],
                "tools": null,
                "output_type": "str"
            }
        }));
        let Some(SpanData::Agent(data)) = &agent.span_data else {
            panic!("expected agent payload");
        };
        assert_eq!(data.handoffs, vec!["Billing", "Support"]);
        assert!(data.tools.is_empty());
        assert_eq!(agent.label(), "Triage");

        let handoff = span(json!({
            "id": "h",
            "span_data": { "type": "handoff", "from_agent": "Triage", "to_agent": "Billing" }
        }));
        assert!(matches!(handoff.span_data, Some(SpanData::Handoff(_))));
        assert_eq!(handoff.label(), "handoff");

        let generation = span(json!({
            "id": "g",
            "span_data": {
                "type": "generation",
                "model": "gpt-4o",
                "input": [{ "role": "user", "content": "hi" }],
                "output": [{
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{ "id": "c1", "type": "function", "function": { "name": "lookup", "arguments": "{}" } }]
                }],
                "usage": { "input_tokens": 12, "output_tokens": 3 }
            }
        }));
        let Some(SpanData::Generation(data)) = &generation.span_data else {
            panic!("expected generation payload");
        };
        assert_eq!(data.model.as_deref(), Some("gpt-4o"));
        assert_eq!(data.input[0].content_text().as_deref(), Some("hi"));
        assert_eq!(data.output[0].content_text(), None);
        assert_eq!(data.output[0].tool_calls[0].display_name(), Some("lookup"));
        assert_eq!(data.usage.as_ref().and_then(|u| u.input_tokens), Some(12));
    }

    #[test]
    fn test_unknown_kind_is_preserved() {
        let raw = json!({ "type": "guardrail", "name": "no_pii", "triggered": false });
        let s = span(json!({ "id": "x", "span_data": raw.clone() }));
        assert_eq!(s.kind(), "guardrail");
        assert_eq!(s.name(), Some("no_pii"));
        assert_eq!(s.span_data.as_ref().unwrap().to_value().unwrap(), raw);
    }

    #[test]
    fn test_malformed_known_kind_falls_back_to_opaque() {
        let s = span(json!({ "id": "a", "span_data": { "type": "agent", "name": 42 } }));
        assert!(matches!(s.span_data, Some(SpanData::Other(_))));
        assert_eq!(s.kind(), AGENT_KIND);
        assert_eq!(s.label(), AGENT_KIND);
    }

    #[test]
    fn test_span_round_trips_unknown_fields() {
        let raw = json!({
            "object": "trace.span",
            "id": "f",
            "trace_id": "t1",
            "parent_id": "a",
            "started_at": "2024-01-01T00:00:00Z",
            "ended_at": null,
            "span_data": { "type": "function", "name": "lookup", "input": "{\"q\":1}", "output": null, "mcp_data": null },
            "error": null
        });
        let s = span(raw.clone());
        let mut expected = raw;
        expected["span_data"].as_object_mut().unwrap().remove("output");
        assert_eq!(serde_json::to_value(&s).unwrap(), expected);
    }

    #[test]
    fn test_empty_parent_is_root() {
        let s = span(json!({ "id": "a", "parent_id": "" }));
        assert_eq!(s.parent(), None);
    }

    #[test]
    fn test_header_display_fallbacks() {
        let header: TraceHeader = serde_json::from_value(json!({ "object": "trace" })).unwrap();
        assert_eq!(header.display_name(), "Agent Trace");
        assert_eq!(header.display_id(), "Unknown");

        let header: TraceHeader =
            serde_json::from_value(json!({ "object": "trace", "id": "t1", "workflow_name": "demo" })).unwrap();
        assert_eq!(header.display_name(), "demo");
        assert_eq!(header.display_id(), "t1");
        assert_eq!(header.extra.get("object"), Some(&json!("trace")));
    }

    #[test]
    fn test_header_tolerates_odd_field_types() {
        let header: TraceHeader = serde_json::from_value(json!({
            "object": "trace",
            "id": 2,
            "workflow_name": ["not", "a", "name"],
            "group_id": null,
            "metadata": { "k": "v" },
        }))
        .unwrap();
        assert_eq!(header.display_id(), "2");
        assert_eq!(header.display_name(), "Agent Trace");
        assert_eq!(header.group_id, None);
        assert_eq!(header.metadata, Some(json!({ "k": "v" })));
        assert_eq!(header.extra.get("workflow_name"), Some(&json!(["not", "a", "name"])));
        assert!(!header.extra.contains_key("id"));

        assert_eq!(TraceHeader::from_value(json!("trace")), TraceHeader::default());
    }

    #[test]
    fn test_kind_colors() {
        assert_eq!(kind_color(AGENT_KIND), "#3498db");
        assert_eq!(kind_color(HANDOFF_KIND), "#9b59b6");
        assert_eq!(kind_color("custom"), "#95a5a6");
    }
}
