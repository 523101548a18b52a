//! Tool-call context types shared by every hook.
//!
//! Tool arguments arrive as free-form JSON. They are parsed exactly once
//! at the hook boundary into a typed `ToolInput` union instead of being
//! string-indexed ad hoc by each consumer.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Argument keys recognized as a file path, in priority order
const PATH_KEYS: &[&str] = &["path", "file_path", "filePath"];

/// Tool-name vocabulary the engine reacts to. Configurable; the defaults
/// cover the common agent toolsets.
#[derive(Debug, Clone)]
pub struct ToolVocabulary {
    pub mutation_tools: HashSet<String>,
    pub select_tool: String,
    pub terminal_tool: String,
}

impl Default for ToolVocabulary {
    fn default() -> Self {
        let mutation_tools = [
            "write_to_file",
            "edit_file",
            "edit",
            "search_replace",
            "apply_patch",
            "apply_diff",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        Self {
            mutation_tools,
            select_tool: "select_active_intent".to_string(),
            terminal_tool: "attempt_completion".to_string(),
        }
    }
}

impl ToolVocabulary {
    pub fn is_mutation(&self, tool_name: &str) -> bool {
        self.mutation_tools.contains(tool_name)
    }

    pub fn is_select(&self, tool_name: &str) -> bool {
        tool_name == self.select_tool
    }

    pub fn is_terminal(&self, tool_name: &str) -> bool {
        tool_name == self.terminal_tool
    }
}

/// Typed view of a tool's argument bag, resolved once per call
#[derive(Debug, Clone, PartialEq)]
pub enum ToolInput {
    /// A file-scoped tool: carries a target path and optional line bounds
    File {
        path: String,
        start_line: Option<usize>,
        end_line: Option<usize>,
    },
    /// The intent-selection control tool
    SelectIntent { intent_id: String },
    /// A shell-command tool
    Command { command: String },
    /// Anything else; scope and constraint path checks do not apply
    Opaque,
}

impl ToolInput {
    /// Classify raw JSON arguments into the typed union
    pub fn from_args(tool_name: &str, args: &Value, vocab: &ToolVocabulary) -> Self {
        if vocab.is_select(tool_name) {
            if let Some(intent_id) = args.get("intent_id").and_then(|v| v.as_str()) {
                return ToolInput::SelectIntent {
                    intent_id: intent_id.to_string(),
                };
            }
        }

        if let Some(path) = PATH_KEYS
            .iter()
            .find_map(|k| args.get(*k).and_then(|v| v.as_str()))
        {
            let as_line = |key: &str| {
                args.get(key)
                    .and_then(|v| v.as_u64())
                    .map(|n| n as usize)
            };
            return ToolInput::File {
                path: path.to_string(),
                start_line: as_line("start_line"),
                end_line: as_line("end_line"),
            };
        }

        if let Some(command) = args.get("command").and_then(|v| v.as_str()) {
            return ToolInput::Command {
                command: command.to_string(),
            };
        }

        ToolInput::Opaque
    }

    /// Target file path, when this is a file-scoped call
    pub fn path(&self) -> Option<&str> {
        match self {
            ToolInput::File { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// One tool invocation as seen by the engine
#[derive(Debug, Clone)]
pub struct ToolCall {
    pub name: String,
    pub args: Value,
    pub timestamp: DateTime<Utc>,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, args: Value) -> Self {
        Self {
            name: name.into(),
            args,
            timestamp: Utc::now(),
        }
    }
}

/// Per-call context handed to every hook
#[derive(Debug, Clone)]
pub struct HookContext {
    pub tool_name: String,
    pub input: ToolInput,
    pub args: Value,
    pub intent_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub session_id: Option<String>,
    pub model_id: Option<String>,
}

/// Outcome of one hook. `Block` is the only non-proceeding variant, so the
/// "must not proceed implies not allow" invariant holds by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum HookVerdict {
    Allow,
    /// Proceed and feed `context` back to the agent. `args` carries
    /// interceptor-rewritten arguments when the call was also modified.
    Inject {
        context: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        args: Option<Value>,
    },
    Modify { args: Value },
    Block { reason: String },
}

impl HookVerdict {
    pub fn should_proceed(&self) -> bool {
        !matches!(self, HookVerdict::Block { .. })
    }

    pub fn block_reason(&self) -> Option<&str> {
        match self {
            HookVerdict::Block { reason } => Some(reason),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_path_key_priority() {
        let vocab = ToolVocabulary::default();
        for key in ["path", "file_path", "filePath"] {
            let input =
                ToolInput::from_args("write_to_file", &json!({ key: "src/a.ts" }), &vocab);
            assert_eq!(input.path(), Some("src/a.ts"));
        }
    }

    #[test]
    fn test_range_args_parsed() {
        let vocab = ToolVocabulary::default();
        let input = ToolInput::from_args(
            "edit_file",
            &json!({"file_path": "src/a.ts", "start_line": 3, "end_line": 9}),
            &vocab,
        );
        assert_eq!(
            input,
            ToolInput::File {
                path: "src/a.ts".to_string(),
                start_line: Some(3),
                end_line: Some(9),
            }
        );
    }

    #[test]
    fn test_select_intent_args() {
        let vocab = ToolVocabulary::default();
        let input = ToolInput::from_args(
            "select_active_intent",
            &json!({"intent_id": "auth-1"}),
            &vocab,
        );
        assert_eq!(
            input,
            ToolInput::SelectIntent {
                intent_id: "auth-1".to_string()
            }
        );
    }

    #[test]
    fn test_command_and_opaque_args() {
        let vocab = ToolVocabulary::default();
        let input = ToolInput::from_args("execute_command", &json!({"command": "ls"}), &vocab);
        assert_eq!(
            input,
            ToolInput::Command {
                command: "ls".to_string()
            }
        );

        let input = ToolInput::from_args("list_intents", &json!({}), &vocab);
        assert_eq!(input, ToolInput::Opaque);
        assert_eq!(input.path(), None);
    }

    #[test]
    fn test_verdict_proceed_invariant() {
        assert!(HookVerdict::Allow.should_proceed());
        assert!(HookVerdict::Inject {
            context: "ctx".to_string(),
            args: None
        }
        .should_proceed());
        assert!(HookVerdict::Modify {
            args: json!({})
        }
        .should_proceed());
        assert!(!HookVerdict::Block {
            reason: "nope".to_string()
        }
        .should_proceed());
    }

    #[test]
    fn test_verdict_wire_format() {
        let v = HookVerdict::Block {
            reason: "out of scope".to_string(),
        };
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["action"], "block");
        assert_eq!(json["reason"], "out of scope");
    }

    #[test]
    fn test_default_vocabulary() {
        let vocab = ToolVocabulary::default();
        assert!(vocab.is_mutation("write_to_file"));
        assert!(vocab.is_mutation("apply_diff"));
        assert!(!vocab.is_mutation("read_file"));
        assert!(vocab.is_select("select_active_intent"));
        assert!(vocab.is_terminal("attempt_completion"));
    }
}
