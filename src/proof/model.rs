// Data models for recorded proof sessions
//
// A proof document is written by the proving agent while it runs: the claim,
// a flat list of events (model outputs and tool results) and, once the session
// finishes, a metadata block with timing, token and cost totals.
//
// The documents originate from an LLM-driven process, so every field is decoded
// leniently: a value of the wrong shape falls back to its empty default and a
// malformed sequence element is skipped, instead of rejecting the whole document.

use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Tool name whose calls carry Python source in their `code` argument
pub const PYTHON_EXECUTE: &str = "python_execute";

/// Tool name whose calls carry a search string in their `query` argument
pub const WEB_SEARCH: &str = "web_search";

/// Verdict shown when no model output ever produced one
pub const UNKNOWN_VERDICT: &str = "UNKNOWN";

/// One recorded proof session
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProofDocument {
    #[serde(default, deserialize_with = "lenient")]
    pub claim: String,
    #[serde(default, deserialize_with = "lenient")]
    pub timestamp: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub proof_id: Option<String>,
    /// Written once the session ends; `null` while it is still running
    #[serde(default, deserialize_with = "lenient")]
    pub metadata: Option<Metadata>,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub events: Vec<Event>,
}

impl ProofDocument {
    pub fn from_slice(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }

    /// Verdict of the session: the last model output carrying a non-null verdict
    pub fn verdict(&self) -> Option<&Value> {
        self.events.iter().rev().find_map(|event| match event {
            Event::ModelOutput { content } => content.verdict.as_ref().filter(|v| !v.is_null()),
            _ => None,
        })
    }

    /// Verdict as display text, `UNKNOWN` when the session never reached one
    pub fn verdict_label(&self) -> String {
        self.verdict()
            .map(value_text)
            .unwrap_or_else(|| UNKNOWN_VERDICT.to_string())
    }

    /// Diagnostic events recorded by the producer (failed tool runs, bad model JSON)
    pub fn session_errors(&self) -> impl Iterator<Item = (&'static str, &SessionError)> {
        self.events.iter().filter_map(|event| match event {
            Event::ToolResultError(e) => Some(("Tool error", e)),
            Event::ModelOutputParseError(e) => Some(("Unparseable model output", e)),
            Event::IterationError(e) => Some(("Iteration error", e)),
            Event::EmbeddedToolError(e) => Some(("Embedded tool error", e)),
            _ => None,
        })
    }
}

/// A single record in the session trace
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// The model produced a structured turn (opens a new step)
    ModelOutput {
        #[serde(default, deserialize_with = "lenient")]
        content: StepContent,
    },

    /// A tool call answered by the harness
    ToolResult(ToolResult),

    /// A tool call that could not even be executed
    ToolResultError(SessionError),

    /// The model answered with something that was not JSON
    ModelOutputParseError(SessionError),

    /// The agent loop itself failed for one iteration
    IterationError(SessionError),

    /// A tool call embedded in the model's JSON body failed
    EmbeddedToolError(SessionError),

    /// Catch-all for event types we don't render
    #[serde(other)]
    Other,
}

/// Structured body of a `model_output` event
///
/// `derivation` and `evidence` may be emitted piecemeal across several turns;
/// see `proof::steps` for how they are accumulated onto the final step.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StepContent {
    #[serde(default, deserialize_with = "lenient")]
    pub current_step: Option<String>,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub assumptions: Vec<String>,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub tool_calls: Vec<ToolCall>,
    #[serde(default, deserialize_with = "lenient")]
    pub reasoning: Option<String>,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub derivation: Vec<Derivation>,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub evidence: Vec<Evidence>,
    #[serde(default)]
    pub verdict: Option<Value>,
    #[serde(default)]
    pub falsifiable_test: Option<Value>,

    /// Anything else the model put in its turn (e.g. `error`, `raw_content`)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StepContent {
    pub fn tool_call(&self, id: &str) -> Option<&ToolCall> {
        self.tool_calls.iter().find(|tc| tc.id == id)
    }

    /// Error recorded on the turn itself, e.g. when the reply wasn't valid JSON
    pub fn error_text(&self) -> Option<String> {
        self.extra_text("error")
    }

    /// The unparsed reply kept alongside `error`
    pub fn raw_content(&self) -> Option<String> {
        self.extra_text("raw_content")
    }

    fn extra_text(&self, key: &str) -> Option<String> {
        self.extra
            .get(key)
            .filter(|v| !v.is_null())
            .map(value_text)
            .filter(|text| !text.is_empty())
    }

    /// Falsifiable test as text; `null` and empty strings count as absent
    pub fn falsifiable_test_text(&self) -> Option<String> {
        self.falsifiable_test
            .as_ref()
            .filter(|v| !v.is_null())
            .map(value_text)
            .filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Derivation {
    #[serde(default, deserialize_with = "lenient")]
    pub principle: String,
    #[serde(default, deserialize_with = "lenient")]
    pub calculation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Evidence {
    #[serde(default, deserialize_with = "lenient")]
    pub source: String,
    #[serde(default, deserialize_with = "lenient")]
    pub content: String,
}

/// A tool invocation requested by the model (OpenAI function-call shape)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolCall {
    #[serde(default, deserialize_with = "lenient")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient")]
    pub function: FunctionCall,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FunctionCall {
    #[serde(default, deserialize_with = "lenient")]
    pub name: String,
    /// Either a JSON object or a string holding serialized JSON
    #[serde(default)]
    pub arguments: Value,
}

impl ToolCall {
    /// Decode the call's arguments
    ///
    /// String arguments are parsed on every call. A string that is not valid JSON,
    /// or any value that is not an object, yields an empty argument set.
    pub fn arguments(&self) -> Map<String, Value> {
        let parsed = match &self.function.arguments {
            Value::String(raw) => match serde_json::from_str::<Value>(raw) {
                Ok(value) => value,
                Err(e) => {
                    tracing::warn!(
                        "Failed to parse arguments of tool call {} ({}): {}",
                        self.id,
                        self.function.name,
                        e
                    );
                    return Map::new();
                }
            },
            other => other.clone(),
        };

        match parsed {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    /// String argument by key; missing or non-string arguments read as ""
    pub fn string_argument(&self, key: &str) -> String {
        self.arguments()
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }
}

/// Answer to a tool call
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolResult {
    #[serde(default, deserialize_with = "lenient")]
    pub tool_call_id: String,
    #[serde(default, deserialize_with = "lenient")]
    pub tool_name: Option<String>,
    /// Wall-clock seconds the tool took
    #[serde(default, deserialize_with = "lenient")]
    pub duration: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub result: ToolOutcome,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolOutcome {
    #[serde(default, deserialize_with = "lenient")]
    pub success: bool,
    /// Captured stdout (python_execute)
    #[serde(default, deserialize_with = "lenient")]
    pub output: Option<String>,
    /// Markdown answer (web_search)
    #[serde(default, deserialize_with = "lenient")]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub error: Option<String>,
    /// Captured stderr (python_execute)
    #[serde(default, deserialize_with = "lenient")]
    pub warnings: Option<String>,
    /// Citations (web_search)
    #[serde(default, deserialize_with = "lenient_seq")]
    pub results: Vec<Citation>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Citation {
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub url: String,
}

/// Payload shared by the producer's diagnostic events
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionError {
    #[serde(default, deserialize_with = "lenient")]
    pub tool_call_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub tool_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub error: Option<String>,
    /// Raw model text for `model_output_parse_error`
    #[serde(default, deserialize_with = "lenient")]
    pub content: Option<String>,
}

/// Session totals written when the proof finishes
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Metadata {
    #[serde(default, deserialize_with = "lenient")]
    pub time_seconds: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub tokens: Option<TokenUsage>,
    #[serde(default, deserialize_with = "lenient")]
    pub cost: Option<CostBreakdown>,
    #[serde(default, deserialize_with = "lenient")]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenUsage {
    #[serde(default, deserialize_with = "lenient")]
    pub prompt: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub completion: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub total: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CostBreakdown {
    #[serde(default, deserialize_with = "lenient")]
    pub input_usd: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub output_usd: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub total_usd: Option<f64>,
}

/// Display text for a free-form JSON value: strings verbatim, anything else compact JSON
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Decode a field, falling back to its default when the value has the wrong shape
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Decode a sequence, skipping elements that have the wrong shape
fn lenient_seq<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_document() {
        let doc = ProofDocument::from_slice(br#"{"claim": "2 + 2 = 4"}"#).unwrap();
        assert_eq!(doc.claim, "2 + 2 = 4");
        assert!(doc.events.is_empty());
        assert!(doc.metadata.is_none());
        assert_eq!(doc.verdict_label(), "UNKNOWN");
    }

    #[test]
    fn test_unknown_event_types_are_kept_as_other() {
        let json = r#"{
            "claim": "c",
            "events": [
                {"type": "model_output", "content": {"current_step": "A"}},
                {"type": "heartbeat", "at": 3},
                {"type": "tool_result", "tool_call_id": "x", "duration": 0.5,
                 "result": {"success": true, "output": "4\n"}}
            ]
        }"#;
        let doc = ProofDocument::from_slice(json.as_bytes()).unwrap();
        assert_eq!(doc.events.len(), 3);
        assert!(matches!(doc.events[1], Event::Other));
        match &doc.events[2] {
            Event::ToolResult(result) => {
                assert_eq!(result.tool_call_id, "x");
                assert_eq!(result.duration, Some(0.5));
                assert!(result.result.success);
                assert_eq!(result.result.output.as_deref(), Some("4\n"));
            }
            other => panic!("Expected ToolResult, got {:?}", other),
        }
    }

    #[test]
    fn test_null_content_becomes_empty_step() {
        let json = r#"{"events": [{"type": "model_output", "content": null}]}"#;
        let doc = ProofDocument::from_slice(json.as_bytes()).unwrap();
        match &doc.events[0] {
            Event::ModelOutput { content } => {
                assert!(content.current_step.is_none());
                assert!(content.tool_calls.is_empty());
            }
            other => panic!("Expected ModelOutput, got {:?}", other),
        }
    }

    #[test]
    fn test_wrongly_typed_fields_fall_back_to_defaults() {
        let json = r#"{
            "claim": 42,
            "metadata": {"time_seconds": "slow", "tokens": {"total": 1200}},
            "events": [{"type": "model_output", "content": {
                "current_step": ["not", "a", "string"],
                "assumptions": ["kept", 7, "also kept"],
                "evidence": [{"source": "wiki", "content": "fact"}, "stray"]
            }}]
        }"#;
        let doc = ProofDocument::from_slice(json.as_bytes()).unwrap();
        assert_eq!(doc.claim, "");
        let metadata = doc.metadata.unwrap();
        assert_eq!(metadata.time_seconds, None);
        assert_eq!(metadata.tokens.unwrap().total, Some(1200));

        let Event::ModelOutput { content } = &doc.events[0] else {
            panic!("Expected ModelOutput");
        };
        assert!(content.current_step.is_none());
        assert_eq!(content.assumptions, vec!["kept", "also kept"]);
        assert_eq!(content.evidence.len(), 1);
        assert_eq!(content.evidence[0].source, "wiki");
    }

    #[test]
    fn test_string_arguments_are_parsed() {
        let call: ToolCall = serde_json::from_str(
            r#"{"id": "c1", "function": {"name": "python_execute",
                "arguments": "{\"code\": \"print(1)\"}"}}"#,
        )
        .unwrap();
        assert_eq!(call.string_argument("code"), "print(1)");
    }

    #[test]
    fn test_object_arguments_are_used_directly() {
        let call: ToolCall = serde_json::from_str(
            r#"{"id": "c1", "function": {"name": "web_search",
                "arguments": {"query": "speed of light"}}}"#,
        )
        .unwrap();
        assert_eq!(call.string_argument("query"), "speed of light");
    }

    #[test]
    fn test_malformed_arguments_yield_empty_set() {
        let call: ToolCall = serde_json::from_str(
            r#"{"id": "c1", "function": {"name": "python_execute", "arguments": "{code: oops"}}"#,
        )
        .unwrap();
        assert!(call.arguments().is_empty());
        assert_eq!(call.string_argument("code"), "");

        let call: ToolCall =
            serde_json::from_str(r#"{"id": "c2", "function": {"name": "x", "arguments": "[1, 2]"}}"#)
                .unwrap();
        assert!(call.arguments().is_empty());
    }

    #[test]
    fn test_verdict_is_taken_from_last_model_output_that_has_one() {
        let json = r#"{"events": [
            {"type": "model_output", "content": {"verdict": "DISPROVEN"}},
            {"type": "model_output", "content": {"verdict": "PROVEN"}},
            {"type": "model_output", "content": {"verdict": null, "current_step": "wrap-up"}},
            {"type": "tool_result", "tool_call_id": "z", "result": {"success": true}}
        ]}"#;
        let doc = ProofDocument::from_slice(json.as_bytes()).unwrap();
        assert_eq!(doc.verdict_label(), "PROVEN");
    }

    #[test]
    fn test_non_string_verdict_is_rendered_as_json() {
        let json = r#"{"events": [{"type": "model_output", "content": {"verdict": {"v": 1}}}]}"#;
        let doc = ProofDocument::from_slice(json.as_bytes()).unwrap();
        assert_eq!(doc.verdict_label(), r#"{"v":1}"#);
    }

    #[test]
    fn test_session_errors_are_collected() {
        let json = r#"{"events": [
            {"type": "tool_result_error", "tool_call_id": "c9", "tool_name": "python_execute",
             "duration": 0.01, "error": "bad arguments"},
            {"type": "model_output_parse_error", "content": "not json", "error": "Failed to parse JSON response"}
        ]}"#;
        let doc = ProofDocument::from_slice(json.as_bytes()).unwrap();
        let errors: Vec<_> = doc.session_errors().collect();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].0, "Tool error");
        assert_eq!(errors[0].1.error.as_deref(), Some("bad arguments"));
        assert_eq!(errors[1].1.content.as_deref(), Some("not json"));
    }

    #[test]
    fn test_extra_content_fields_are_retained() {
        let json = r#"{"events": [{"type": "model_output",
            "content": {"error": "Invalid JSON response", "raw_content": "oops"}}]}"#;
        let doc = ProofDocument::from_slice(json.as_bytes()).unwrap();
        let Event::ModelOutput { content } = &doc.events[0] else {
            panic!("Expected ModelOutput");
        };
        assert_eq!(content.extra.get("raw_content"), Some(&Value::from("oops")));
        assert_eq!(content.error_text().as_deref(), Some("Invalid JSON response"));
        assert_eq!(content.raw_content().as_deref(), Some("oops"));
    }

    #[test]
    fn test_missing_or_null_turn_error() {
        let content: StepContent =
            serde_json::from_str(r#"{"current_step": "x", "error": null}"#).unwrap();
        assert!(content.error_text().is_none());
        assert!(content.raw_content().is_none());
    }
}
