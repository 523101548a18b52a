//! Natural-language constraint evaluation.
//!
//! Constraints arrive as free-text strings on an intent ("must not modify
//! tests"). A small fixed rule table maps recognized phrasings to checks
//! against the tool call. Unrecognized phrasings are ignored: a false
//! negative is acceptable, a false positive on an unrelated constraint is
//! not.

use regex::Regex;
use serde::Serialize;

/// Result of evaluating a tool call against an intent's constraints
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstraintVerdict {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ConstraintVerdict {
    fn ok() -> Self {
        Self {
            valid: true,
            reason: None,
        }
    }

    fn violation(reason: String) -> Self {
        Self {
            valid: false,
            reason: Some(reason),
        }
    }
}

/// Config filenames recognized by the config-protection rule
const CONFIG_FILES: &[&str] = &["package.json", "tsconfig.json", "webpack.config"];

/// Evaluates tool calls against free-text constraint strings
#[derive(Debug)]
pub struct ConstraintValidator {
    forbid_tests: Regex,
    forbid_config: Regex,
    only_directory: Regex,
    forbid_shell: Regex,
}

impl ConstraintValidator {
    pub fn new() -> Self {
        // Compiled once; the literals are fixed so construction cannot fail
        Self {
            forbid_tests: Regex::new(
                r"(?i)(must not|do not|don't|never|no)\s+(modify|edit|change|touch).{0,20}\btests?\b",
            )
            .unwrap(),
            forbid_config: Regex::new(
                r"(?i)(must not|do not|don't|never|no)\s+(modify|edit|change|touch).{0,20}\bconfig",
            )
            .unwrap(),
            only_directory: Regex::new(r"(?i)only\s+(modify|edit|touch)\s+(?:files\s+in\s+)?`?([\w./\-]+)`?")
                .unwrap(),
            forbid_shell: Regex::new(
                r"(?i)(must not|do not|don't|never|no)\s+(run|execute|use).{0,20}\b(shell|commands?)\b",
            )
            .unwrap(),
        }
    }

    /// Evaluate one tool call. The first matching violation wins; absence
    /// of any match is valid.
    pub fn validate(
        &self,
        tool_name: &str,
        target_path: Option<&str>,
        constraints: &[String],
    ) -> ConstraintVerdict {
        for constraint in constraints {
            if let Some(path) = target_path {
                let lower = path.to_lowercase();

                if self.forbid_tests.is_match(constraint)
                    && (lower.contains("test") || lower.contains("spec"))
                {
                    return ConstraintVerdict::violation(format!(
                        "constraint '{}' forbids test modification, but '{}' is a test file",
                        constraint, path
                    ));
                }

                if self.forbid_config.is_match(constraint)
                    && CONFIG_FILES.iter().any(|cfg| lower.contains(cfg))
                {
                    return ConstraintVerdict::violation(format!(
                        "constraint '{}' forbids config modification, but '{}' is a config file",
                        constraint, path
                    ));
                }

                if let Some(caps) = self.only_directory.captures(constraint) {
                    let dir = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
                    if !dir.is_empty() && !path.contains(dir) {
                        return ConstraintVerdict::violation(format!(
                            "constraint '{}' restricts edits to '{}', but '{}' is outside it",
                            constraint, dir, path
                        ));
                    }
                }
            }

            if tool_name == "execute_command" && self.forbid_shell.is_match(constraint) {
                return ConstraintVerdict::violation(format!(
                    "constraint '{}' bans shell execution, but tool '{}' was requested",
                    constraint, tool_name
                ));
            }
        }

        ConstraintVerdict::ok()
    }
}

impl Default for ConstraintValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constraints(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_no_constraints_is_valid() {
        let v = ConstraintValidator::new();
        let verdict = v.validate("write_to_file", Some("src/auth/login.ts"), &[]);
        assert!(verdict.valid);
        assert!(verdict.reason.is_none());
    }

    #[test]
    fn test_forbid_test_edits() {
        let v = ConstraintValidator::new();
        let cs = constraints(&["must not modify tests"]);

        let verdict = v.validate("write_to_file", Some("src/auth/login.spec.ts"), &cs);
        assert!(!verdict.valid);
        let reason = verdict.reason.unwrap();
        assert!(reason.contains("must not modify tests"));
        assert!(reason.contains("login.spec.ts"));

        let verdict = v.validate("write_to_file", Some("src/auth/login.ts"), &cs);
        assert!(verdict.valid);
    }

    #[test]
    fn test_forbid_config_edits() {
        let v = ConstraintValidator::new();
        let cs = constraints(&["do not edit config files"]);

        assert!(!v.validate("edit_file", Some("package.json"), &cs).valid);
        assert!(!v.validate("edit_file", Some("tsconfig.json"), &cs).valid);
        assert!(
            !v.validate("edit_file", Some("webpack.config.js"), &cs).valid
        );
        assert!(v.validate("edit_file", Some("src/index.ts"), &cs).valid);
    }

    #[test]
    fn test_only_directory_constraint() {
        let v = ConstraintValidator::new();
        let cs = constraints(&["only modify src/auth"]);

        assert!(v.validate("edit_file", Some("src/auth/login.ts"), &cs).valid);
        let verdict = v.validate("edit_file", Some("src/payments/charge.ts"), &cs);
        assert!(!verdict.valid);
        assert!(verdict.reason.unwrap().contains("src/auth"));
    }

    #[test]
    fn test_forbid_shell_execution() {
        let v = ConstraintValidator::new();
        let cs = constraints(&["must not run shell commands"]);

        assert!(!v.validate("execute_command", None, &cs).valid);
        assert!(v.validate("write_to_file", Some("src/a.ts"), &cs).valid);
    }

    #[test]
    fn test_first_violation_wins() {
        let v = ConstraintValidator::new();
        let cs = constraints(&["must not modify tests", "only modify src/auth"]);

        let verdict = v.validate("edit_file", Some("src/payments/charge.test.ts"), &cs);
        assert!(!verdict.valid);
        // The test rule is checked first for the first constraint string
        assert!(verdict.reason.unwrap().contains("test"));
    }

    #[test]
    fn test_unrelated_constraint_never_false_positives() {
        let v = ConstraintValidator::new();
        let cs = constraints(&[
            "keep functions under 50 lines",
            "prefer async APIs",
            "write thorough tests for every change",
        ]);

        assert!(v.validate("write_to_file", Some("src/a.spec.ts"), &cs).valid);
        assert!(v.validate("execute_command", None, &cs).valid);
        assert!(v.validate("edit_file", Some("package.json"), &cs).valid);
    }
}
