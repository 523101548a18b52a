//! Intent data model and schema validation.
//!
//! The active-intents spec is parsed permissively and then validated field
//! by field so every failure carries a precise message. Only the current
//! schema generation is accepted: `owned_scope` (alias `scope`) must be a
//! flat glob array and `constraints` must be plain strings. The earlier
//! `scope: {include, exclude}` map with typed constraint objects is a
//! legacy format and is rejected by name.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_yaml_ng::Value;

use crate::error::{OrchestratorError, Result};

/// Lifecycle status of an intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntentStatus {
    InProgress,
    Completed,
    Pending,
}

impl IntentStatus {
    fn parse(raw: &str) -> Option<Self> {
        match raw.to_uppercase().replace('-', "_").as_str() {
            "IN_PROGRESS" => Some(IntentStatus::InProgress),
            "COMPLETED" => Some(IntentStatus::Completed),
            "PENDING" => Some(IntentStatus::Pending),
            _ => None,
        }
    }
}

impl std::fmt::Display for IntentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            IntentStatus::InProgress => "IN_PROGRESS",
            IntentStatus::Completed => "COMPLETED",
            IntentStatus::Pending => "PENDING",
        };
        f.write_str(s)
    }
}

/// A declared unit of work with an owned file scope and constraints.
/// Immutable for the lifetime of a session except for `status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentDefinition {
    pub id: String,
    pub name: String,
    pub status: IntentStatus,
    pub owned_scope: Vec<String>,
    pub constraints: Vec<String>,
    pub acceptance_criteria: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Parsed, validated root document of `active_intents.yaml`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ActiveIntentsSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub active_intents: Vec<IntentDefinition>,
}

fn validation(msg: impl Into<String>) -> OrchestratorError {
    OrchestratorError::Validation(msg.into())
}

fn string_field(intent: &Value, key: &str, alias: Option<&str>, idx: usize) -> Result<String> {
    let raw = intent
        .get(key)
        .or_else(|| alias.and_then(|a| intent.get(a)));

    match raw {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        Some(_) => Err(validation(format!(
            "intent #{}: field '{}' must be a non-empty string",
            idx, key
        ))),
        None => Err(validation(format!(
            "intent #{}: missing required field '{}'{}",
            idx,
            key,
            alias.map(|a| format!(" (or '{}')", a)).unwrap_or_default()
        ))),
    }
}

fn string_array(value: &Value, field: &str, id: &str) -> Result<Vec<String>> {
    let Value::Sequence(seq) = value else {
        if matches!(value, Value::Mapping(_)) {
            return Err(validation(format!(
                "intent '{}': '{}' is a mapping; the legacy include/exclude and typed-constraint \
                 formats are unsupported, use a flat list of strings",
                id, field
            )));
        }
        return Err(validation(format!(
            "intent '{}': '{}' must be an array of strings",
            id, field
        )));
    };

    seq.iter()
        .map(|item| match item {
            Value::String(s) => Ok(s.clone()),
            Value::Mapping(_) => Err(validation(format!(
                "intent '{}': '{}' contains a typed object; the legacy typed-constraint format \
                 is unsupported, use plain strings",
                id, field
            ))),
            _ => Err(validation(format!(
                "intent '{}': '{}' entries must be strings",
                id, field
            ))),
        })
        .collect()
}

fn timestamp_field(intent: &Value, key: &str) -> Option<DateTime<Utc>> {
    intent
        .get(key)
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse::<DateTime<Utc>>().ok())
}

fn parse_intent(raw: &Value, idx: usize) -> Result<IntentDefinition> {
    if !matches!(raw, Value::Mapping(_)) {
        return Err(validation(format!("intent #{} must be a mapping", idx)));
    }

    let id = string_field(raw, "id", None, idx)?;
    let name = string_field(raw, "name", Some("title"), idx)?;

    let status_raw = string_field(raw, "status", None, idx)?;
    let status = IntentStatus::parse(&status_raw).ok_or_else(|| {
        validation(format!(
            "intent '{}': invalid status '{}', expected IN_PROGRESS, COMPLETED or PENDING",
            id, status_raw
        ))
    })?;

    let scope_value = raw
        .get("owned_scope")
        .or_else(|| raw.get("scope"))
        .ok_or_else(|| {
            validation(format!(
                "intent '{}': missing required field 'owned_scope' (or 'scope')",
                id
            ))
        })?;
    let owned_scope = string_array(scope_value, "owned_scope", &id)?;

    let constraints_value = raw
        .get("constraints")
        .ok_or_else(|| validation(format!("intent '{}': missing required field 'constraints'", id)))?;
    let constraints = string_array(constraints_value, "constraints", &id)?;

    let criteria_value = raw.get("acceptance_criteria").ok_or_else(|| {
        validation(format!(
            "intent '{}': missing required field 'acceptance_criteria'",
            id
        ))
    })?;
    let acceptance_criteria = string_array(criteria_value, "acceptance_criteria", &id)?;

    Ok(IntentDefinition {
        id,
        name,
        status,
        owned_scope,
        constraints,
        acceptance_criteria,
        created_at: timestamp_field(raw, "created_at"),
        updated_at: timestamp_field(raw, "updated_at"),
    })
}

/// Parse and validate the raw YAML content of an active-intents spec
pub fn parse_spec(content: &str) -> Result<ActiveIntentsSpec> {
    // Syntax errors surface as Yaml, everything past parsing as Validation
    let root: Value = serde_yaml_ng::from_str(content)?;

    if !matches!(root, Value::Mapping(_)) {
        return Err(validation("spec root must be a mapping".to_string()));
    }

    let version = root
        .get("version")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string());

    let intents_value = root
        .get("active_intents")
        .ok_or_else(|| validation("spec is missing the 'active_intents' key"))?;

    let Value::Sequence(raw_intents) = intents_value else {
        return Err(validation("'active_intents' must be an array"));
    };

    let mut active_intents = Vec::with_capacity(raw_intents.len());
    for (idx, raw) in raw_intents.iter().enumerate() {
        active_intents.push(parse_intent(raw, idx)?);
    }

    let mut seen = std::collections::HashSet::new();
    for intent in &active_intents {
        if !seen.insert(intent.id.as_str()) {
            return Err(validation(format!(
                "duplicate intent id '{}' in spec",
                intent.id
            )));
        }
    }

    Ok(ActiveIntentsSpec {
        version,
        active_intents,
    })
}
