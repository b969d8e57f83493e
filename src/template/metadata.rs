//! Workflow metadata and `%...%` token substitution.
//!
//! Two token kinds share the `%...%` syntax:
//! - `%date:PATTERN%` formats the current local time
//! - `%Node.widget%` looks up a widget value in the host's saved prompt
//!
//! Node references resolve by display name first (`"Node name for S&R"` in
//! the host workflow), then by raw node id.

use crate::core::error::MetadataError;
use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::collections::HashMap;

const NODE_NAME_PROPERTY: &str = "Node name for S&R";
const DATE_PREFIX: &str = "date:";

/// Node names, ids and widget values captured from a host workflow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowMetadata {
    /// Display name -> node id.
    node_ids: HashMap<String, String>,
    /// Node id -> widget name -> value.
    node_inputs: HashMap<String, Map<String, JsonValue>>,
}

impl WorkflowMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node display name.
    pub fn with_node(mut self, name: impl Into<String>, id: impl Into<String>) -> Self {
        self.node_ids.insert(name.into(), id.into());
        self
    }

    /// Record one widget value of node `id`.
    pub fn with_input(
        mut self,
        id: impl Into<String>,
        widget: impl Into<String>,
        value: impl Into<JsonValue>,
    ) -> Self {
        self.node_inputs
            .entry(id.into())
            .or_default()
            .insert(widget.into(), value.into());
        self
    }

    /// Build from the host's `extra_pnginfo` and `prompt` objects.
    ///
    /// `extra_pnginfo.workflow.nodes[]` supplies the display names;
    /// `prompt[id].inputs` supplies the widget values.
    pub fn from_json(extra_pnginfo: &JsonValue, prompt: &JsonValue) -> Result<Self, MetadataError> {
        let nodes = extra_pnginfo
            .get("workflow")
            .ok_or(MetadataError::MissingField("workflow"))?
            .get("nodes")
            .and_then(JsonValue::as_array)
            .ok_or(MetadataError::MissingField("workflow.nodes"))?;

        let mut metadata = Self::new();
        for node in nodes {
            let name = node
                .get("properties")
                .and_then(|p| p.get(NODE_NAME_PROPERTY))
                .and_then(JsonValue::as_str);
            let id = node.get("id").and_then(json_id);
            if let (Some(name), Some(id)) = (name, id) {
                metadata.node_ids.insert(name.to_string(), id);
            }
        }

        let prompt = prompt
            .as_object()
            .ok_or(MetadataError::MissingField("prompt"))?;
        for (id, node) in prompt {
            if let Some(inputs) = node.get("inputs").and_then(JsonValue::as_object) {
                metadata.node_inputs.insert(id.clone(), inputs.clone());
            }
        }

        log::debug!(
            "loaded workflow metadata: {} named nodes, {} prompt nodes",
            metadata.node_ids.len(),
            metadata.node_inputs.len()
        );
        Ok(metadata)
    }

    /// [`WorkflowMetadata::from_json`] over serialized JSON text.
    pub fn from_json_str(extra_pnginfo: &str, prompt: &str) -> Result<Self, MetadataError> {
        let extra: JsonValue = serde_json::from_str(extra_pnginfo)?;
        let prompt: JsonValue = serde_json::from_str(prompt)?;
        Self::from_json(&extra, &prompt)
    }

    /// Resolve a `Node.widget` reference to its text value.
    pub fn lookup(&self, reference: &str) -> Option<String> {
        let (node, widget) = reference.split_once('.')?;

        let id = match self.node_ids.get(node) {
            Some(id) => id.as_str(),
            None if self.node_inputs.contains_key(node) => node,
            None => {
                log::warn!("No node named '{}' in workflow metadata", node);
                return None;
            }
        };

        let Some(inputs) = self.node_inputs.get(id) else {
            log::warn!("No prompt data for node '{}' (id {})", node, id);
            return None;
        };

        match inputs.get(widget) {
            None | Some(JsonValue::Null) => {
                log::warn!("Node '{}' has no widget '{}'", node, widget);
                None
            }
            Some(JsonValue::String(text)) => Some(text.clone()),
            Some(other) => Some(other.to_string()),
        }
    }
}

fn json_id(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// ============================================================================
// Date patterns
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateField {
    Year,
    YearShort,
    Month,
    Day,
    Hour,
    Minute,
    Second,
}

/// One piece of a date pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateToken {
    Field { field: DateField, padded: bool },
    Literal(char),
}

// Longest codes first so `yyyy` wins over `yy` and `MM` over `M`.
const DATE_CODES: [(&str, DateField, bool); 12] = [
    ("yyyy", DateField::Year, true),
    ("yy", DateField::YearShort, true),
    ("MM", DateField::Month, true),
    ("dd", DateField::Day, true),
    ("hh", DateField::Hour, true),
    ("mm", DateField::Minute, true),
    ("ss", DateField::Second, true),
    ("M", DateField::Month, false),
    ("d", DateField::Day, false),
    ("h", DateField::Hour, false),
    ("m", DateField::Minute, false),
    ("s", DateField::Second, false),
];

/// Split a pattern like `yyyy-MM-dd` into fields and literal characters.
pub fn tokenize_date_pattern(pattern: &str) -> Vec<DateToken> {
    let mut tokens = Vec::new();
    let mut rest = pattern;

    while let Some(c) = rest.chars().next() {
        match DATE_CODES.iter().find(|(code, _, _)| rest.starts_with(code)) {
            Some((code, field, padded)) => {
                tokens.push(DateToken::Field {
                    field: *field,
                    padded: *padded,
                });
                rest = &rest[code.len()..];
            }
            None => {
                tokens.push(DateToken::Literal(c));
                rest = &rest[c.len_utf8()..];
            }
        }
    }
    tokens
}

/// Render a date pattern. Hours are 24-hour.
///
/// Unpadded `h`, `m` and `s` print `0` when the field is zero, never an
/// empty string.
pub fn format_date_pattern(pattern: &str, now: &NaiveDateTime) -> String {
    let mut out = String::new();
    for token in tokenize_date_pattern(pattern) {
        match token {
            DateToken::Literal(c) => out.push(c),
            DateToken::Field { field, padded } => {
                let value = match field {
                    DateField::Year => {
                        out.push_str(&now.year().to_string());
                        continue;
                    }
                    DateField::YearShort => now.year().rem_euclid(100) as u32,
                    DateField::Month => now.month(),
                    DateField::Day => now.day(),
                    DateField::Hour => now.hour(),
                    DateField::Minute => now.minute(),
                    DateField::Second => now.second(),
                };
                if padded {
                    out.push_str(&format!("{:02}", value));
                } else {
                    out.push_str(&value.to_string());
                }
            }
        }
    }
    out
}

// ============================================================================
// Substitution pass
// ============================================================================

/// Replace `%date:...%` and `%Node.widget%` tokens.
///
/// With no metadata the text is returned untouched, dates included.
/// Unresolvable references stay in the text as written.
pub fn substitute_metadata(
    text: &str,
    metadata: Option<&WorkflowMetadata>,
    now: &NaiveDateTime,
) -> String {
    let Some(metadata) = metadata else {
        return text.to_string();
    };

    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find('%') {
        let after_open = &rest[open + 1..];
        let Some(len) = after_open.find('%') else {
            break;
        };

        if len == 0 {
            // `%%` is not a token; the second `%` may open one.
            out.push_str(&rest[..=open]);
            rest = after_open;
            continue;
        }

        let token = &after_open[..len];
        let replacement = match token.strip_prefix(DATE_PREFIX) {
            Some(pattern) => Some(format_date_pattern(pattern, now)),
            None => metadata.lookup(token),
        };

        out.push_str(&rest[..open]);
        match replacement {
            Some(value) => out.push_str(&value),
            None => out.push_str(&rest[open..open + len + 2]),
        }
        rest = &after_open[len + 1..];
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn fixed_now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 7)
            .unwrap()
            .and_hms_opt(9, 5, 0)
            .unwrap()
    }

    fn sample_metadata() -> WorkflowMetadata {
        WorkflowMetadata::new()
            .with_node("Sampler", "3")
            .with_input("3", "seed", 42)
            .with_input("3", "sampler_name", "euler")
    }

    #[test]
    fn test_date_codes() {
        let now = fixed_now();
        assert_eq!(format_date_pattern("yyyy-MM-dd", &now), "2024-03-07");
        assert_eq!(format_date_pattern("yy/M/d", &now), "24/3/7");
        assert_eq!(format_date_pattern("hh:mm:ss", &now), "09:05:00");
        assert_eq!(format_date_pattern("h.m.s", &now), "9.5.0");
        assert_eq!(format_date_pattern("take_01", &now), "take_01");
    }

    #[test]
    fn test_unpadded_zero_fields_print_zero() {
        let midnight = NaiveDate::from_ymd_opt(2024, 3, 7)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(format_date_pattern("h:m:s", &midnight), "0:0:0");
    }

    #[test]
    fn test_tokenizer_prefers_longest_code() {
        let tokens = tokenize_date_pattern("yyyyM");
        assert_eq!(tokens.len(), 2);
        assert_eq!(
            tokens[0],
            DateToken::Field {
                field: DateField::Year,
                padded: true
            }
        );
    }

    #[test]
    fn test_no_metadata_is_noop() {
        let text = "%date:yyyy% %Sampler.seed%";
        assert_eq!(substitute_metadata(text, None, &fixed_now()), text);
    }

    #[test]
    fn test_widget_lookup() {
        let metadata = sample_metadata();
        let out = substitute_metadata(
            "seed %Sampler.seed% with %Sampler.sampler_name% on %date:yyyyMMdd%",
            Some(&metadata),
            &fixed_now(),
        );
        assert_eq!(out, "seed 42 with euler on 20240307");
    }

    #[test]
    fn test_lookup_by_raw_id() {
        let metadata = sample_metadata();
        assert_eq!(metadata.lookup("3.seed").as_deref(), Some("42"));
    }

    #[test]
    fn test_unknown_references_stay() {
        let metadata = sample_metadata();
        let text = "%Missing.seed% %Sampler.cfg% %noperiod% 100%";
        assert_eq!(substitute_metadata(text, Some(&metadata), &fixed_now()), text);
    }

    #[test]
    fn test_double_percent_is_not_a_token() {
        let metadata = sample_metadata();
        let out = substitute_metadata("50%%Sampler.seed%", Some(&metadata), &fixed_now());
        assert_eq!(out, "50%42");
    }

    #[test]
    fn test_from_host_json() {
        let extra = json!({
            "workflow": {
                "nodes": [
                    { "id": 7, "properties": { "Node name for S&R": "KSampler" } },
                    { "id": 8, "properties": {} }
                ]
            }
        });
        let prompt = json!({
            "7": { "inputs": { "steps": 30, "scheduler": "karras" } },
            "8": { "class_type": "Note" }
        });

        let metadata = WorkflowMetadata::from_json(&extra, &prompt).unwrap();
        assert_eq!(metadata.lookup("KSampler.steps").as_deref(), Some("30"));
        assert_eq!(metadata.lookup("KSampler.scheduler").as_deref(), Some("karras"));
        assert_eq!(metadata.lookup("8.steps"), None);
    }

    #[test]
    fn test_from_json_rejects_missing_workflow() {
        let err = WorkflowMetadata::from_json(&json!({}), &json!({})).unwrap_err();
        assert!(matches!(err, MetadataError::MissingField("workflow")));
        assert!(matches!(
            WorkflowMetadata::from_json_str("{", "{}"),
            Err(MetadataError::Json(_))
        ));
    }
}
